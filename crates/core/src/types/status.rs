//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the commerce backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    PendingPayment,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::Paid => write!(f, "paid"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Result status of a payment attempt.
///
/// The payment provider vocabulary grows over time; statuses this crate
/// does not know deserialize as [`PaymentStatus::Unknown`] instead of
/// failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment captured or authorized.
    Approved,
    /// Awaiting out-of-band settlement (voucher, bank transfer).
    Pending,
    /// Provider declined the payment.
    Rejected,
    /// A status this version does not recognize.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Whether this status completes checkout successfully.
    ///
    /// `Pending` counts: voucher and instant-transfer payments settle
    /// out-of-band and the order stands while they do.
    #[must_use]
    pub const fn counts_as_success(&self) -> bool {
        matches!(self, Self::Approved | Self::Pending)
    }

    /// Whether the provider has given a final answer.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Pending => write!(f, "pending"),
            Self::Rejected => write!(f, "rejected"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_wire_names() {
        let status: PaymentStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, PaymentStatus::Approved);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"approved\"");
    }

    #[test]
    fn test_unrecognized_payment_status_maps_to_unknown() {
        let status: PaymentStatus = serde_json::from_str("\"in_mediation\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
        assert!(!status.counts_as_success());
    }

    #[test]
    fn test_pending_counts_as_success() {
        assert!(PaymentStatus::Pending.counts_as_success());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(PaymentStatus::Approved.counts_as_success());
        assert!(!PaymentStatus::Rejected.counts_as_success());
    }

    #[test]
    fn test_order_status_roundtrip() {
        let status: OrderStatus = "pending_payment".parse().unwrap();
        assert_eq!(status, OrderStatus::PendingPayment);
        assert_eq!(status.to_string(), "pending_payment");
        assert!("sideways".parse::<OrderStatus>().is_err());
    }
}

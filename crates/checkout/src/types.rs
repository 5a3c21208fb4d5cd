//! Domain types shared across the checkout workflow.

use chrono::{DateTime, Utc};
use jacaranda_core::{Money, OrderId, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Buyer contact details collected on the shipping step.
///
/// Fields hold raw form input; format checks run during step validation so
/// the draft can carry half-typed values between keystrokes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    /// Full name.
    pub name: String,
    /// Email address (validated via `jacaranda_core::Email` on advance).
    pub email: String,
    /// Phone number (validated via `jacaranda_core::Phone` on advance).
    pub phone: String,
}

/// A delivery or billing address.
///
/// Brazilian postal shape: street + number are separate fields, `region` is
/// the two-letter state (UF), and `postal_code` is a CEP. All fields hold
/// raw form input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Street name.
    pub street: String,
    /// Street number.
    pub number: String,
    /// Apartment, suite, etc.
    pub complement: Option<String>,
    /// Neighborhood (bairro).
    pub neighborhood: String,
    /// City.
    pub city: String,
    /// State code (e.g., "SP").
    pub region: String,
    /// Postal code (CEP), with or without hyphen.
    pub postal_code: String,
    /// Country code.
    pub country: String,
}

impl Address {
    /// Check if every required field is filled. Complement stays optional.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of required fields that are still blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("street", self.street.as_str()),
            ("number", self.number.as_str()),
            ("neighborhood", self.neighborhood.as_str()),
            ("city", self.city.as_str()),
            ("region", self.region.as_str()),
            ("postal_code", self.postal_code.as_str()),
            ("country", self.country.as_str()),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Format as a single line for review display.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![format!("{}, {}", self.street, self.number)];
        if let Some(complement) = &self.complement
            && !complement.trim().is_empty()
        {
            parts.push(complement.clone());
        }
        parts.push(self.neighborhood.clone());
        parts.push(format!("{} - {}", self.city, self.region));
        parts.push(self.postal_code.clone());
        parts.join(", ")
    }
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: String::new(),
            number: String::new(),
            complement: None,
            neighborhood: String::new(),
            city: String::new(),
            region: String::new(),
            postal_code: String::new(),
            country: "BR".to_string(),
        }
    }
}

/// A shipping option offered for the destination postal code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingOption {
    /// Backend identifier (opaque string).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description shown under the name.
    pub description: String,
    /// Shipping price.
    pub price: Money,
    /// Delivery estimate in business days.
    pub estimated_days: u32,
    /// Carrier name, when the backend knows it.
    pub carrier: Option<String>,
}

impl ShippingOption {
    /// Delivery estimate string for display.
    #[must_use]
    pub fn delivery_estimate(&self) -> String {
        if self.estimated_days == 1 {
            "1 business day".to_string()
        } else {
            format!("up to {} business days", self.estimated_days)
        }
    }
}

/// The order created by the backend, recorded at most once per checkout.
///
/// Once set it never changes: a payment retry reuses the same order instead
/// of creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderResult {
    /// Backend order ID.
    pub order_id: OrderId,
    /// Human-facing order number (e.g., "JC-10023").
    pub order_number: String,
    /// Order status at creation time.
    pub status: OrderStatus,
    /// Server-issued creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a payment attempt against the created order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentResult {
    /// Provider status.
    pub status: PaymentStatus,
    /// Provider transaction ID, when one was issued.
    pub transaction_id: Option<String>,
    /// Authorization code for approved card payments.
    pub authorization_code: Option<String>,
    /// Copy-paste payable line for pending out-of-band payments
    /// (voucher barcode digits or transfer code).
    pub payable_line: Option<String>,
}

/// A validation problem tied to a specific form field.
///
/// `field` uses dotted paths for nested values (e.g.,
/// `shipping_address.postal_code`) so the UI can highlight the right input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted field path.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jacaranda_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;

    fn filled_address() -> Address {
        Address {
            street: "Avenida Paulista".to_string(),
            number: "1000".to_string(),
            complement: None,
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            region: "SP".to_string(),
            postal_code: "01310-100".to_string(),
            country: "BR".to_string(),
        }
    }

    #[test]
    fn test_address_completeness() {
        let address = filled_address();
        assert!(address.is_complete());
        assert!(address.missing_fields().is_empty());
    }

    #[test]
    fn test_address_missing_fields() {
        let mut address = filled_address();
        address.number = String::new();
        address.city = "   ".to_string();

        assert!(!address.is_complete());
        assert_eq!(address.missing_fields(), vec!["number", "city"]);
    }

    #[test]
    fn test_address_complement_is_optional() {
        let mut address = filled_address();
        address.complement = None;
        assert!(address.is_complete());
    }

    #[test]
    fn test_address_default_country() {
        let address = Address::default();
        assert_eq!(address.country, "BR");
        assert!(!address.is_complete());
    }

    #[test]
    fn test_address_one_line() {
        let address = filled_address();
        assert_eq!(
            address.one_line(),
            "Avenida Paulista, 1000, Bela Vista, São Paulo - SP, 01310-100"
        );
    }

    #[test]
    fn test_delivery_estimate() {
        let option = ShippingOption {
            id: "express".to_string(),
            name: "Express".to_string(),
            description: String::new(),
            price: Money::new(Decimal::new(2990, 2), CurrencyCode::BRL),
            estimated_days: 2,
            carrier: None,
        };
        assert_eq!(option.delivery_estimate(), "up to 2 business days");

        let overnight = ShippingOption {
            estimated_days: 1,
            ..option
        };
        assert_eq!(overnight.delivery_estimate(), "1 business day");
    }
}

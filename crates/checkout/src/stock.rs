//! Stock conflict reporting.
//!
//! The backend rejects validation or order creation when cart lines can no
//! longer be fulfilled. Its payload lists the affected products; this module
//! turns that into a report the UI can show and the remediation actions can
//! act on.

use jacaranda_core::ProductId;
use serde::{Deserialize, Serialize};

use crate::cart::CartSnapshot;

/// Why a product cannot be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    OutOfStock,
    InsufficientQuantity,
    Discontinued,
    /// Any reason this version does not recognize, and the default for
    /// message-only payload entries.
    #[default]
    #[serde(other)]
    Unavailable,
}

impl StockReason {
    /// Display phrase completing "<title> ...".
    #[must_use]
    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::OutOfStock => "is out of stock",
            Self::InsufficientQuantity => "does not have enough stock for the requested quantity",
            Self::Discontinued => "has been discontinued",
            Self::Unavailable => "is unavailable",
        }
    }
}

/// One unavailable product from the backend payload.
///
/// Structured entries carry the product ID and a machine reason. Older
/// message-only entries land here with the whole message as `title` and no
/// product ID; they stay displayable but line matching falls back to title
/// containment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockConflictItem {
    /// Backend product ID, absent for message-only entries.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Product title, or the raw message for message-only entries.
    pub title: String,
    /// Machine-readable reason.
    #[serde(default)]
    pub reason: StockReason,
}

impl StockConflictItem {
    /// Wrap a bare message from a legacy payload entry.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            product_id: None,
            title: message.into(),
            reason: StockReason::Unavailable,
        }
    }
}

/// Everything the UI needs about one stock conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockConflictReport {
    items: Vec<StockConflictItem>,
}

impl StockConflictReport {
    /// Build a report from payload items, one report line per entry.
    #[must_use]
    pub const fn new(items: Vec<StockConflictItem>) -> Self {
        Self { items }
    }

    /// The affected items.
    #[must_use]
    pub fn items(&self) -> &[StockConflictItem] {
        &self.items
    }

    /// Number of affected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the report carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One display line per item.
    ///
    /// Message-only entries are shown verbatim; no attempt is made to parse
    /// product names out of prose.
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| {
                if item.product_id.is_none() && item.reason == StockReason::Unavailable {
                    item.title.clone()
                } else {
                    format!("{} {}", item.title, item.reason.phrase())
                }
            })
            .collect()
    }

    /// Cart lines affected by this conflict, for the remove-unavailable
    /// action.
    ///
    /// Lines match by product ID when the payload carries one. Message-only
    /// entries match lines whose title appears inside the message, which is
    /// best-effort: a renamed product will not match and stays in the cart.
    #[must_use]
    pub fn affected_line_ids(&self, cart: &CartSnapshot) -> Vec<String> {
        let mut line_ids = Vec::new();

        for line in &cart.lines {
            let affected = self.items.iter().any(|item| match item.product_id {
                Some(product_id) => product_id == line.product_id,
                None => {
                    !line.title.is_empty()
                        && item
                            .title
                            .to_lowercase()
                            .contains(&line.title.to_lowercase())
                }
            });

            if affected {
                line_ids.push(line.line_id.clone());
            }
        }

        line_ids
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jacaranda_core::{CurrencyCode, Money};
    use rust_decimal::Decimal;

    use crate::cart::CartLine;

    use super::*;

    fn cart_with(titles: &[(&str, i64)]) -> CartSnapshot {
        let lines = titles
            .iter()
            .enumerate()
            .map(|(i, (title, product_id))| CartLine {
                line_id: format!("line-{i}"),
                product_id: ProductId::new(*product_id),
                variant_id: None,
                title: (*title).to_string(),
                variant_title: None,
                quantity: 1,
                unit_price: Money::new(Decimal::new(9999, 2), CurrencyCode::BRL),
                line_total: Money::new(Decimal::new(9999, 2), CurrencyCode::BRL),
            })
            .collect();

        CartSnapshot {
            lines,
            subtotal: Money::new(Decimal::new(9999, 2), CurrencyCode::BRL),
            discount_total: Money::zero(CurrencyCode::BRL),
            tax_total: Money::zero(CurrencyCode::BRL),
        }
    }

    #[test]
    fn test_one_line_per_item() {
        let report = StockConflictReport::new(vec![
            StockConflictItem {
                product_id: Some(ProductId::new(1)),
                title: "Ceramic Mug".to_string(),
                reason: StockReason::OutOfStock,
            },
            StockConflictItem {
                product_id: Some(ProductId::new(2)),
                title: "Linen Apron".to_string(),
                reason: StockReason::InsufficientQuantity,
            },
        ]);

        let lines = report.display_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap(), "Ceramic Mug is out of stock");
        assert_eq!(
            lines.get(1).unwrap(),
            "Linen Apron does not have enough stock for the requested quantity"
        );
    }

    #[test]
    fn test_message_only_entry_displays_verbatim() {
        let report = StockConflictReport::new(vec![StockConflictItem::from_message(
            "Ceramic Mug is no longer available",
        )]);

        assert_eq!(
            report.display_lines(),
            vec!["Ceramic Mug is no longer available".to_string()]
        );
    }

    #[test]
    fn test_affected_lines_by_product_id() {
        let cart = cart_with(&[("Ceramic Mug", 1), ("Linen Apron", 2)]);
        let report = StockConflictReport::new(vec![StockConflictItem {
            product_id: Some(ProductId::new(2)),
            title: "Linen Apron".to_string(),
            reason: StockReason::OutOfStock,
        }]);

        assert_eq!(report.affected_line_ids(&cart), vec!["line-1".to_string()]);
    }

    #[test]
    fn test_affected_lines_by_title_containment() {
        let cart = cart_with(&[("Ceramic Mug", 1), ("Linen Apron", 2)]);
        let report = StockConflictReport::new(vec![StockConflictItem::from_message(
            "Sorry, Ceramic Mug just sold out",
        )]);

        assert_eq!(report.affected_line_ids(&cart), vec!["line-0".to_string()]);
    }

    #[test]
    fn test_renamed_product_does_not_match_by_title() {
        let cart = cart_with(&[("Ceramic Mug (2024)", 1)]);
        let report =
            StockConflictReport::new(vec![StockConflictItem::from_message("Ceramic Mug sold out")]);

        assert!(report.affected_line_ids(&cart).is_empty());
    }

    #[test]
    fn test_deserialize_structured_entry() {
        let item: StockConflictItem = serde_json::from_str(
            r#"{"product_id": 42, "title": "Ceramic Mug", "reason": "out_of_stock"}"#,
        )
        .unwrap();

        assert_eq!(item.product_id, Some(ProductId::new(42)));
        assert_eq!(item.reason, StockReason::OutOfStock);
    }

    #[test]
    fn test_deserialize_unknown_reason() {
        let item: StockConflictItem = serde_json::from_str(
            r#"{"title": "Ceramic Mug", "reason": "vendor_recalled"}"#,
        )
        .unwrap();

        assert_eq!(item.reason, StockReason::Unavailable);
        assert!(item.product_id.is_none());
    }
}

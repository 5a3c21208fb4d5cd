//! Cart snapshot types and the provider seam.
//!
//! The checkout engine never owns the cart. It works against a
//! [`CartSnapshotProvider`] handed in at construction, so the same engine
//! runs against the real cart service in production and a scripted fake in
//! tests.

use async_trait::async_trait;
use jacaranda_core::{CurrencyCode, Money, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the cart provider.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart service could not be reached or answered abnormally.
    #[error("cart unavailable: {0}")]
    Unavailable(String),
    /// A referenced cart line does not exist (anymore).
    #[error("cart line not found: {0}")]
    LineNotFound(String),
}

/// One line of the cart at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Cart line identifier (opaque string from the cart service).
    pub line_id: String,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Variant, when the product has them.
    pub variant_id: Option<VariantId>,
    /// Product title for display and conflict matching.
    pub title: String,
    /// Variant title (e.g., "Size M").
    pub variant_title: Option<String>,
    /// Quantity.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Money,
    /// Line total (unit price times quantity, minus line discounts).
    pub line_total: Money,
}

/// Point-in-time view of the cart used to build totals and order requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    /// Cart lines.
    pub lines: Vec<CartLine>,
    /// Sum of line totals before discounts.
    pub subtotal: Money,
    /// Cart-level discount.
    pub discount_total: Money,
    /// Tax included in the order total.
    pub tax_total: Money,
}

impl CartSnapshot {
    /// An empty cart in the given currency.
    #[must_use]
    pub const fn empty(currency: CurrencyCode) -> Self {
        Self {
            lines: Vec::new(),
            subtotal: Money::zero(currency),
            discount_total: Money::zero(currency),
            tax_total: Money::zero(currency),
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Source of cart state for the checkout engine.
#[async_trait]
pub trait CartSnapshotProvider: Send + Sync {
    /// Fetch the current cart.
    async fn snapshot(&self) -> Result<CartSnapshot, CartError>;

    /// Remove the given lines and return the updated cart.
    async fn remove_lines(&self, line_ids: &[String]) -> Result<CartSnapshot, CartError>;
}

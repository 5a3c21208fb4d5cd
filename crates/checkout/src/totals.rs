//! Order totals derived from the cart snapshot and shipping selection.

use jacaranda_core::Money;
use serde::{Deserialize, Serialize};

use crate::cart::CartSnapshot;
use crate::types::ShippingOption;

/// The totals block shown beside every checkout step.
///
/// Derived, never stored: recompute whenever the snapshot or the shipping
/// selection changes and the figures can never drift from their inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutTotals {
    /// Sum of cart line totals.
    pub subtotal: Money,
    /// Cart-level discount.
    pub discount: Money,
    /// Price of the selected shipping option, zero while none is selected.
    pub shipping: Money,
    /// Tax on the order.
    pub tax: Money,
    /// `subtotal - discount + shipping + tax`.
    pub total: Money,
}

impl CheckoutTotals {
    /// Compute totals from the snapshot and the current shipping selection.
    #[must_use]
    pub fn compute(cart: &CartSnapshot, shipping: Option<&ShippingOption>) -> Self {
        let currency = cart.subtotal.currency;
        let shipping_amount = shipping.map_or(Money::zero(currency), |option| option.price);

        let total = cart.subtotal.amount - cart.discount_total.amount
            + shipping_amount.amount
            + cart.tax_total.amount;

        Self {
            subtotal: cart.subtotal,
            discount: cart.discount_total,
            shipping: shipping_amount,
            tax: cart.tax_total,
            total: Money::new(total, currency),
        }
    }
}

//! Shipping option resolution.
//!
//! Options come from the backend per destination postal code. When that
//! call fails or returns nothing, two hardcoded options take its place so
//! the buyer can always keep filling the form; the failure is logged, never
//! surfaced as an error.

use jacaranda_core::{CurrencyCode, Money};
use rust_decimal::Decimal;
use tracing::warn;

use crate::api::ApiError;
use crate::types::ShippingOption;

/// Hardcoded options used when the backend cannot provide any.
#[must_use]
pub fn fallback_options() -> Vec<ShippingOption> {
    vec![
        ShippingOption {
            id: "fallback-standard".to_string(),
            name: "Standard shipping".to_string(),
            description: "Delivered by the postal service".to_string(),
            price: Money::new(Decimal::new(1500, 2), CurrencyCode::BRL),
            estimated_days: 8,
            carrier: None,
        },
        ShippingOption {
            id: "fallback-express".to_string(),
            name: "Express shipping".to_string(),
            description: "Courier delivery".to_string(),
            price: Money::new(Decimal::new(2990, 2), CurrencyCode::BRL),
            estimated_days: 2,
            carrier: None,
        },
    ]
}

/// Turn a backend fetch result into a usable option list.
///
/// An error or an empty list both degrade to [`fallback_options`].
#[must_use]
pub fn with_fallback(fetched: Result<Vec<ShippingOption>, ApiError>) -> Vec<ShippingOption> {
    match fetched {
        Ok(options) if !options.is_empty() => options,
        Ok(_) => {
            warn!("backend returned no shipping options, using fallbacks");
            fallback_options()
        }
        Err(error) => {
            warn!(%error, "shipping option fetch failed, using fallbacks");
            fallback_options()
        }
    }
}

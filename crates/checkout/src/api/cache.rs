//! Cache types for backend API responses.

use crate::payment::PaymentMethod;
use crate::types::ShippingOption;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    ShippingOptions(Vec<ShippingOption>),
    PaymentMethods(Vec<PaymentMethod>),
}

//! Request and response types for the commerce backend REST API.
//!
//! These mirror the JSON bodies the backend exchanges. Domain types from
//! [`crate::types`] are embedded directly where the wire shape matches;
//! everything else gets a dedicated struct here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payment::{PaymentMethod, PaymentMethodKind};
use crate::stock::StockConflictItem;
use crate::types::{Address, ContactInfo, FieldError, OrderResult, PaymentResult, ShippingOption};
use jacaranda_core::OrderId;

// =============================================================================
// Step validation
// =============================================================================

/// Body for `POST /checkout/validate`.
///
/// Carries the full draft so the backend can cross-check fields the client
/// has no visibility into (address serviceability, installment limits).
#[derive(Debug, Clone, Serialize)]
pub struct ValidateStepRequest {
    pub session_id: Uuid,
    /// Step being validated, as its wire name (`"shipping"`, `"payment"`).
    pub step: String,
    pub contact: ContactInfo,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_option_id: Option<String>,
    pub payment_method: Option<PaymentMethodKind>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// Body of a successful `POST /checkout/validate` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateStepResponse {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

// =============================================================================
// Order creation
// =============================================================================

/// Body for `POST /checkout/create-order`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub session_id: Uuid,
    pub contact: ContactInfo,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_option_id: String,
    pub payment_method: PaymentMethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of a successful `POST /checkout/create-order` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub order: OrderResult,
}

// =============================================================================
// Payment
// =============================================================================

/// Card details for `POST /payments/process`. Only present for card methods.
#[derive(Debug, Clone, Serialize)]
pub struct CardPayload {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvv: String,
    pub installments: u32,
}

/// Body for `POST /payments/process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessPaymentRequest {
    pub order_id: OrderId,
    pub payment_method: PaymentMethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardPayload>,
}

/// Body of a successful `POST /payments/process` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessPaymentResponse {
    pub payment: PaymentResult,
}

// =============================================================================
// Catalog lookups
// =============================================================================

/// Body of `GET /checkout/shipping-options`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingOptionsResponse {
    #[serde(default)]
    pub options: Vec<ShippingOption>,
}

/// Body of `GET /checkout/payment-methods`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodsResponse {
    #[serde(default)]
    pub methods: Vec<PaymentMethod>,
}

// =============================================================================
// Error envelope
// =============================================================================

/// Envelope the backend wraps every non-2xx JSON response in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

/// Machine-readable error detail inside [`ApiErrorBody`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Stable error code (`"validation_failed"`, `"out_of_stock"`, ...).
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Per-field errors, populated for validation failures.
    #[serde(default)]
    pub fields: Vec<FieldError>,
    /// Affected items, populated for stock conflicts.
    #[serde(default)]
    pub items: Vec<StockEntry>,
}

/// One entry in a stock conflict payload.
///
/// Newer backend releases send structured objects; older ones send bare
/// display strings. Both deserialize here and normalize via [`Self::into_item`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StockEntry {
    Structured(StockConflictItem),
    Message(String),
}

impl StockEntry {
    /// Normalize into a [`StockConflictItem`], wrapping legacy messages.
    pub fn into_item(self) -> StockConflictItem {
        match self {
            Self::Structured(item) => item,
            Self::Message(message) => StockConflictItem::from_message(message),
        }
    }
}

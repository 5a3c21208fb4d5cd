//! Commerce backend REST API client.
//!
//! The checkout flow talks to the backend through the [`CheckoutBackend`]
//! trait so tests can substitute fakes. [`CheckoutApi`] is the production
//! implementation: a thin `reqwest` client that authenticates with the
//! service token, tags every request with the checkout session, and caches
//! catalog lookups (shipping options, payment methods) for the configured
//! TTL.
//!
//! Backend failures arrive as a JSON envelope with a stable `code`; those
//! codes are mapped onto [`ApiError`] variants the orchestrator can act on
//! (validation errors, stock conflicts, payment rejections) instead of
//! leaking raw HTTP statuses upward.

mod cache;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CheckoutApiConfig;
use crate::payment::PaymentMethod;
use crate::session::ApiCredentials;
use crate::stock::StockConflictItem;
use crate::types::{FieldError, OrderResult, PaymentResult, ShippingOption};
use jacaranda_core::PostalCode;

use cache::CacheValue;
use types::{
    ApiErrorBody, CreateOrderRequest, CreateOrderResponse, PaymentMethodsResponse,
    ProcessPaymentRequest, ProcessPaymentResponse, ShippingOptionsResponse, StockEntry,
    ValidateStepRequest, ValidateStepResponse,
};

/// Header carrying the checkout session ID on every request.
const SESSION_HEADER: &str = "X-Checkout-Session";

/// Header carrying the signed-in customer's bearer token, when present.
const CUSTOMER_TOKEN_HEADER: &str = "X-Customer-Token";

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response with no more specific meaning.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured credential cannot be sent as an HTTP header.
    #[error("Invalid API credential: {0}")]
    InvalidCredential(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend rejected the submitted fields.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// One or more cart items can no longer be fulfilled.
    #[error("{} cart item(s) unavailable", .0.len())]
    OutOfStock(Vec<StockConflictItem>),

    /// The cart emptied out from under the checkout.
    #[error("Cart is empty")]
    EmptyCart,

    /// The payment provider declined the payment.
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),
}

// =============================================================================
// CheckoutBackend
// =============================================================================

/// Operations the checkout flow needs from the commerce backend.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// Ask the backend to validate the draft for one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; field-level rejections come
    /// back in the response rather than as an error.
    async fn validate_step(
        &self,
        request: &ValidateStepRequest,
    ) -> Result<ValidateStepResponse, ApiError>;

    /// Create the order from the current cart and draft.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::OutOfStock`] when cart items can no longer be
    /// fulfilled and [`ApiError::EmptyCart`] when there is nothing to order.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderResult, ApiError>;

    /// Charge the selected payment method against a created order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PaymentRejected`] when the provider declines
    /// synchronously; softer declines come back as a rejected
    /// [`PaymentResult`].
    async fn process_payment(
        &self,
        request: &ProcessPaymentRequest,
    ) -> Result<PaymentResult, ApiError>;

    /// List shipping options for a destination postal code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    async fn shipping_options(
        &self,
        postal_code: &PostalCode,
    ) -> Result<Vec<ShippingOption>, ApiError>;

    /// List the payment methods the backend currently accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError>;
}

// =============================================================================
// CheckoutApi
// =============================================================================

/// Client for the commerce backend checkout API.
///
/// Shipping options and payment methods are cached for the configured TTL;
/// everything else hits the network on every call.
#[derive(Clone)]
pub struct CheckoutApi {
    inner: Arc<CheckoutApiInner>,
}

struct CheckoutApiInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CheckoutApi {
    /// Create a new backend client for one checkout session.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential cannot be encoded as an HTTP header
    /// or the HTTP client fails to build.
    pub fn new(
        config: &CheckoutApiConfig,
        credentials: &ApiCredentials,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        // Service token authenticates the storefront itself
        let auth_value = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ApiError::InvalidCredential(format!("API token: {e}")))?,
        );

        headers.insert(
            SESSION_HEADER,
            HeaderValue::from_str(&credentials.session_id.to_string())
                .map_err(|e| ApiError::InvalidCredential(format!("session ID: {e}")))?,
        );

        // Customer bearer token rides a separate header so the backend can
        // attach the order to the signed-in account
        if let Some(token) = &credentials.bearer_token {
            headers.insert(
                CUSTOMER_TOKEN_HEADER,
                HeaderValue::from_str(token.expose_secret())
                    .map_err(|e| ApiError::InvalidCredential(format!("customer token: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CheckoutApiInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// POST a JSON body and decode the JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::read_response(response).await
    }

    /// GET a path (with query string) and decode the JSON response.
    async fn get_json<T>(&self, path_and_query: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path_and_query}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        Self::read_response(response).await
    }

    /// Shared response handling: rate limits, error classification, parsing.
    async fn read_response<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &response_text));
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }
}

/// Map a non-2xx response onto the matching [`ApiError`] variant.
///
/// The backend wraps failures in a JSON envelope with a stable `code`; when
/// the body is not that envelope (proxies, hard crashes) the raw text is
/// carried through truncated.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        let detail = parsed.error;
        debug!(code = %detail.code, status = %status, "Backend returned error envelope");

        return match detail.code.as_str() {
            "validation_failed" => ApiError::Validation(detail.fields),
            "out_of_stock" | "insufficient_stock" => ApiError::OutOfStock(
                detail.items.into_iter().map(StockEntry::into_item).collect(),
            ),
            "cart_empty" => ApiError::EmptyCart,
            "payment_rejected" | "payment_failed" => {
                let message = if detail.message.is_empty() {
                    "Payment was declined".to_string()
                } else {
                    detail.message
                };
                ApiError::PaymentRejected(message)
            }
            _ => ApiError::Api {
                status: status.as_u16(),
                message: format!("{}: {}", detail.code, detail.message),
            },
        };
    }

    tracing::error!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Backend returned non-success status"
    );

    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(body.chars().take(200).collect());
    }

    ApiError::Api {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    }
}

#[async_trait]
impl CheckoutBackend for CheckoutApi {
    #[instrument(skip(self, request), fields(step = %request.step))]
    async fn validate_step(
        &self,
        request: &ValidateStepRequest,
    ) -> Result<ValidateStepResponse, ApiError> {
        self.post_json("/checkout/validate", request).await
    }

    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderResult, ApiError> {
        let response: CreateOrderResponse = self.post_json("/checkout/create-order", request).await?;
        Ok(response.order)
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn process_payment(
        &self,
        request: &ProcessPaymentRequest,
    ) -> Result<PaymentResult, ApiError> {
        let response: ProcessPaymentResponse =
            self.post_json("/payments/process", request).await?;
        Ok(response.payment)
    }

    #[instrument(skip(self), fields(postal_code = %postal_code))]
    async fn shipping_options(
        &self,
        postal_code: &PostalCode,
    ) -> Result<Vec<ShippingOption>, ApiError> {
        let cache_key = format!("shipping:{}", postal_code.digits());

        // Check cache
        if let Some(CacheValue::ShippingOptions(options)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for shipping options");
            return Ok(options);
        }

        let response: ShippingOptionsResponse = self
            .get_json(&format!(
                "/checkout/shipping-options?postal_code={}",
                postal_code.digits()
            ))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::ShippingOptions(response.options.clone()))
            .await;

        Ok(response.options)
    }

    #[instrument(skip(self))]
    async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
        let cache_key = "payment-methods".to_string();

        // Check cache
        if let Some(CacheValue::PaymentMethods(methods)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for payment methods");
            return Ok(methods);
        }

        let response: PaymentMethodsResponse =
            self.get_json("/checkout/payment-methods").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::PaymentMethods(response.methods.clone()))
            .await;

        Ok(response.methods)
    }
}

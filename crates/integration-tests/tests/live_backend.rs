//! Integration tests against live services.
//!
//! These tests require:
//! - A running commerce backend reachable at `CHECKOUT_API_BASE_URL`
//! - A valid `CHECKOUT_API_TOKEN` in the environment (or `.env`)
//! - Network access to the postal code directory for the lookup test
//!
//! Run with: cargo test -p jacaranda-integration-tests -- --ignored

use jacaranda_checkout::api::{CheckoutApi, CheckoutBackend};
use jacaranda_checkout::config::CheckoutConfig;
use jacaranda_checkout::services::{AddressDirectory, AddressLookupClient};
use jacaranda_checkout::session::{AnonymousSession, AuthSession};
use jacaranda_core::PostalCode;

/// Build a backend client for a fresh anonymous session.
fn live_backend() -> CheckoutApi {
    let config = CheckoutConfig::from_env().expect("checkout configuration in environment");
    let credentials = AnonymousSession::new().credentials();
    CheckoutApi::new(&config.api, &credentials).expect("backend client")
}

// ============================================================================
// Catalog endpoints
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running commerce backend and credentials"]
async fn live_payment_method_catalog() {
    let backend = live_backend();

    let methods = backend
        .payment_methods()
        .await
        .expect("payment methods from the backend");

    assert!(
        !methods.is_empty(),
        "backend should offer at least one payment method"
    );
}

#[tokio::test]
#[ignore = "Requires a running commerce backend and credentials"]
async fn live_shipping_options_for_a_known_postal_code() {
    let backend = live_backend();
    let postal_code = PostalCode::parse("01310-100").expect("valid postal code");

    let options = backend
        .shipping_options(&postal_code)
        .await
        .expect("shipping options from the backend");

    assert!(!options.is_empty(), "central São Paulo should be serviceable");
    for option in &options {
        assert!(!option.id.is_empty());
        assert!(option.price.amount.is_sign_positive());
    }
}

// ============================================================================
// Address directory
// ============================================================================

#[tokio::test]
#[ignore = "Requires network access to the postal code directory"]
async fn live_postal_code_lookup() {
    let config = CheckoutConfig::from_env().expect("checkout configuration in environment");
    let directory = AddressLookupClient::new(&config.address_lookup).expect("directory client");

    let postal_code = PostalCode::parse("01310-100").expect("valid postal code");
    let result = directory.lookup(&postal_code).await.expect("known postal code");

    assert_eq!(result.street, "Avenida Paulista");
    assert_eq!(result.city, "São Paulo");
    assert_eq!(result.region, "SP");
}

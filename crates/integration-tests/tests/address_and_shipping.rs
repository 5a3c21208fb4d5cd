//! Postal code lookups and shipping option loading.
//!
//! The address directory prefills the form but never owns it: buyer-typed
//! fields like the house number survive every lookup. Shipping options
//! degrade to the built-in pair whenever the backend cannot quote, so the
//! form never dead-ends on a carrier outage.

use jacaranda_checkout::api::ApiError;
use jacaranda_checkout::orchestrator::AddressScope;
use jacaranda_checkout::services::AddressLookupError;
use jacaranda_checkout::types::ShippingOption;
use jacaranda_integration_tests::{TestContext, brl, fill_shipping_form};
use rust_decimal::Decimal;

// ============================================================================
// Postal code lookup
// ============================================================================

#[tokio::test]
async fn lookup_prefills_the_form_and_keeps_typed_fields() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;

    let draft = checkout.draft_mut();
    draft.shipping_address.postal_code = "01310-100".to_string();
    draft.shipping_address.number = "1578".to_string();
    draft.shipping_address.complement = Some("Apto 42".to_string());

    let errors = checkout.lookup_address(AddressScope::Shipping).await;
    assert!(errors.is_empty());

    let address = &checkout.draft().shipping_address;
    assert_eq!(address.street, "Avenida Paulista");
    assert_eq!(address.neighborhood, "Bela Vista");
    assert_eq!(address.city, "São Paulo");
    assert_eq!(address.region, "SP");
    assert_eq!(address.number, "1578");
    assert_eq!(address.complement.as_deref(), Some("Apto 42"));
}

#[tokio::test]
async fn unknown_postal_code_reports_a_field_error() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    checkout.draft_mut().shipping_address.postal_code = "99999-999".to_string();

    let errors = checkout.lookup_address(AddressScope::Shipping).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "shipping_address.postal_code");
    assert_eq!(errors[0].message, "postal code not found");
}

#[tokio::test]
async fn malformed_postal_code_is_rejected_locally() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    checkout.draft_mut().shipping_address.postal_code = "12".to_string();

    let errors = checkout.lookup_address(AddressScope::Shipping).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "shipping_address.postal_code");
}

#[tokio::test]
async fn directory_outage_asks_for_manual_entry() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    checkout.draft_mut().shipping_address.postal_code = "01310-100".to_string();

    ctx.directory.fail_next_lookup(AddressLookupError::Api {
        status: 503,
        message: "directory down".to_string(),
    });

    let errors = checkout.lookup_address(AddressScope::Shipping).await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("fill in the address manually"));

    // The form keeps whatever was typed
    assert!(checkout.draft().shipping_address.street.is_empty());
}

#[tokio::test]
async fn billing_lookup_needs_the_mirror_off() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    fill_shipping_form(checkout.draft_mut());

    let errors = checkout.lookup_address(AddressScope::Billing).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "billing_address.postal_code");

    checkout.draft_mut().set_billing_same_as_shipping(false);
    checkout
        .draft_mut()
        .billing_address_mut()
        .expect("billing form")
        .postal_code = "01310-100".to_string();

    let errors = checkout.lookup_address(AddressScope::Billing).await;
    assert!(errors.is_empty());
    assert_eq!(
        checkout.draft().billing_address().expect("billing").street,
        "Avenida Paulista"
    );
    // Shipping form untouched by a billing lookup
    assert_eq!(checkout.draft().shipping_address.number, "1578");
}

// ============================================================================
// Shipping options
// ============================================================================

#[tokio::test]
async fn carrier_outage_degrades_to_the_builtin_options() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    fill_shipping_form(checkout.draft_mut());

    ctx.backend.push_shipping(Err(ApiError::Api {
        status: 500,
        message: "quote service down".to_string(),
    }));

    let errors = checkout.load_shipping_options().await;
    assert!(errors.is_empty());

    let options = checkout.shipping_options();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].id, "fallback-standard");
    assert_eq!(options[1].id, "fallback-express");

    // First fallback auto-selected: 199.98 + 15.00 shipping
    let totals = checkout.totals();
    assert_eq!(totals.shipping.amount, Decimal::new(1500, 2));
    assert_eq!(totals.total.amount, Decimal::new(21498, 2));
    assert_eq!(totals.total.display(), "R$214.98");
}

#[tokio::test]
async fn empty_quote_response_also_degrades() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    fill_shipping_form(checkout.draft_mut());

    ctx.backend.push_shipping(Ok(Vec::new()));

    checkout.load_shipping_options().await;
    assert_eq!(checkout.shipping_options().len(), 2);
    assert_eq!(
        checkout.draft().shipping_option.as_ref().expect("selected").id,
        "fallback-standard"
    );
}

#[tokio::test]
async fn vanished_selection_falls_back_to_the_first_option() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    fill_shipping_form(checkout.draft_mut());

    checkout.load_shipping_options().await;
    checkout.select_shipping_option("pac").expect("offered option");

    // The carrier stops quoting PAC for this destination
    ctx.backend.push_shipping(Ok(vec![ShippingOption {
        id: "sedex".to_string(),
        name: "Sedex".to_string(),
        description: "Express courier".to_string(),
        price: brl(2490),
        estimated_days: 2,
        carrier: Some("Correios".to_string()),
    }]));
    checkout.load_shipping_options().await;

    assert_eq!(
        checkout.draft().shipping_option.as_ref().expect("selected").id,
        "sedex"
    );
}

#[tokio::test]
async fn reload_refreshes_the_selected_options_price() {
    let ctx = TestContext::new();
    let mut checkout = ctx.begin().await;
    fill_shipping_form(checkout.draft_mut());

    checkout.load_shipping_options().await;
    assert_eq!(checkout.totals().shipping.amount, Decimal::new(2490, 2));

    ctx.backend.push_shipping(Ok(vec![ShippingOption {
        id: "sedex".to_string(),
        name: "Sedex".to_string(),
        description: "Express courier".to_string(),
        price: brl(2790),
        estimated_days: 2,
        carrier: Some("Correios".to_string()),
    }]));
    checkout.load_shipping_options().await;

    let selected = checkout.draft().shipping_option.as_ref().expect("selected");
    assert_eq!(selected.id, "sedex");
    assert_eq!(selected.price.amount, Decimal::new(2790, 2));
    assert_eq!(checkout.totals().shipping.amount, Decimal::new(2790, 2));
}

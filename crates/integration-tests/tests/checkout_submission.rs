//! Order submission from the review step.
//!
//! Covers the create-then-charge sequence, payment declines and retries
//! against the same order, the anomaly flag for payments that fail after
//! the order exists, and the shape of the order request on the wire.

use jacaranda_checkout::api::ApiError;
use jacaranda_checkout::cart::{CartError, CartSnapshot};
use jacaranda_checkout::orchestrator::{CheckoutStep, SubmitOutcome};
use jacaranda_checkout::payment::PaymentMethodKind;
use jacaranda_checkout::types::{Address, PaymentResult};
use jacaranda_core::{CurrencyCode, PaymentStatus};
use jacaranda_integration_tests::{
    TestContext, approved_payment, fill_credit_card, pending_voucher_payment,
};

// ============================================================================
// Happy paths
// ============================================================================

#[tokio::test]
async fn submission_creates_the_order_then_charges_it() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;

    let outcome = checkout.submit_order().await.expect("submit from review");
    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected Completed, got {outcome:?}");
    };
    assert_eq!(confirmation.order.order_number, "JC-77001");
    assert!(!confirmation.payment_anomaly);
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);

    let calls = ctx.backend.calls();
    let create_at = calls
        .iter()
        .position(|c| c == "create_order")
        .expect("order was created");
    let charge_at = calls
        .iter()
        .position(|c| c == "process_payment")
        .expect("payment was processed");
    assert!(create_at < charge_at, "order must exist before charging");
    assert_eq!(ctx.backend.create_requests().len(), 1);
}

#[tokio::test]
async fn pending_voucher_payment_completes_with_the_payable_line() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_payment(Ok(pending_voucher_payment()));
    // The store clears the cart once the order lands
    ctx.cart.set_snapshot(CartSnapshot::empty(CurrencyCode::BRL));

    let outcome = checkout.submit_order().await.expect("submit");
    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected Completed, got {outcome:?}");
    };
    assert_eq!(confirmation.order.order_number, "JC-77001");

    let payment = confirmation.payment.expect("payment result");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.payable_line.is_some());
    assert!(!confirmation.payment_anomaly);
    assert!(checkout.cart().is_empty(), "cart refreshed after completion");
}

// ============================================================================
// Card payload
// ============================================================================

#[tokio::test]
async fn card_payments_carry_the_card_payload() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_payment().await;
    fill_credit_card(checkout.draft_mut());

    checkout.advance().await.expect("advance to review");
    checkout.submit_order().await.expect("submit");

    let requests = ctx.backend.payment_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].payment_method, PaymentMethodKind::CardCredit);

    let card = requests[0].card.as_ref().expect("card payload");
    assert_eq!(card.number, "4111111111111111");
    assert_eq!(card.holder, "ANA C SOUZA");
    assert_eq!(card.installments, 3);
}

#[tokio::test]
async fn non_card_payments_send_no_card_payload() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;

    checkout.submit_order().await.expect("submit");

    let requests = ctx.backend.payment_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].payment_method, PaymentMethodKind::VoucherBoleto);
    assert!(requests[0].card.is_none());
}

// ============================================================================
// Declines and retries
// ============================================================================

#[tokio::test]
async fn declined_payment_returns_to_payment_and_reuses_the_order() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_payment(Ok(PaymentResult {
        status: PaymentStatus::Rejected,
        transaction_id: Some("tx-declined".to_string()),
        authorization_code: None,
        payable_line: None,
    }));

    let outcome = checkout.submit_order().await.expect("first submit");
    assert!(matches!(outcome, SubmitOutcome::PaymentRejected(_)));
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert!(checkout.order_result().is_some(), "order survives the decline");
    assert!(checkout.confirmation().is_none());

    // Retry with another method; the order is not created again
    checkout
        .select_payment_method(PaymentMethodKind::InstantTransfer)
        .expect("switch method");
    checkout.advance().await.expect("back to review");
    ctx.backend.push_payment(Ok(approved_payment()));

    let outcome = checkout.submit_order().await.expect("second submit");
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(ctx.backend.create_requests().len(), 1);
    assert_eq!(ctx.backend.payment_requests().len(), 2);
}

#[tokio::test]
async fn provider_decline_error_carries_its_message() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_payment(Err(ApiError::PaymentRejected(
        "Card limit exceeded".to_string(),
    )));

    let outcome = checkout.submit_order().await.expect("submit");
    assert_eq!(
        outcome,
        SubmitOutcome::PaymentRejected("Card limit exceeded".to_string())
    );
    assert_eq!(checkout.step(), CheckoutStep::Payment);
}

#[tokio::test]
async fn declined_creation_returns_to_payment_without_an_order() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_create(Err(ApiError::PaymentRejected(
        "Card refused by issuer".to_string(),
    )));

    let outcome = checkout.submit_order().await.expect("first submit");
    assert_eq!(
        outcome,
        SubmitOutcome::PaymentRejected("Card refused by issuer".to_string())
    );
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert!(checkout.order_result().is_none(), "no order to reuse");
    assert!(ctx.backend.payment_requests().is_empty());

    // With no order on file, the retry creates one fresh
    checkout.advance().await.expect("back to review");
    let outcome = checkout.submit_order().await.expect("retry");
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(ctx.backend.create_requests().len(), 2);
    assert_eq!(ctx.backend.payment_requests().len(), 1);
}

// ============================================================================
// Payment anomalies
// ============================================================================

#[tokio::test]
async fn payment_outage_after_creation_still_confirms_the_order() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_payment(Err(ApiError::Api {
        status: 500,
        message: "gateway exploded".to_string(),
    }));

    let outcome = checkout.submit_order().await.expect("submit");
    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected Completed, got {outcome:?}");
    };
    assert!(confirmation.payment_anomaly);
    assert!(confirmation.payment.is_none());
    assert_eq!(confirmation.order.order_number, "JC-77001");
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);
}

#[tokio::test]
async fn unrecognized_payment_status_is_flagged_not_fatal() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_payment(Ok(PaymentResult {
        status: PaymentStatus::Unknown,
        transaction_id: Some("tx-weird".to_string()),
        authorization_code: None,
        payable_line: None,
    }));

    let outcome = checkout.submit_order().await.expect("submit");
    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected Completed, got {outcome:?}");
    };
    assert!(confirmation.payment_anomaly);
    assert_eq!(
        confirmation.payment.expect("payment kept").status,
        PaymentStatus::Unknown
    );
}

// ============================================================================
// Creation failures
// ============================================================================

#[tokio::test]
async fn creation_outage_returns_to_review_for_retry() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.backend.push_create(Err(ApiError::Api {
        status: 502,
        message: "bad gateway".to_string(),
    }));

    let outcome = checkout.submit_order().await.expect("first submit");
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(checkout.step(), CheckoutStep::Review);
    assert!(checkout.order_result().is_none());
    assert!(ctx.backend.payment_requests().is_empty());

    let outcome = checkout.submit_order().await.expect("retry");
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
}

#[tokio::test]
async fn emptied_cart_on_creation_returns_to_review() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;

    ctx.backend.push_create(Err(ApiError::EmptyCart));
    ctx.cart.set_snapshot(CartSnapshot::empty(CurrencyCode::BRL));

    let outcome = checkout.submit_order().await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::CartEmptied);
    assert_eq!(checkout.step(), CheckoutStep::Review);
    assert!(checkout.cart().is_empty(), "refreshed cart shows empty");
}

#[tokio::test]
async fn cart_refresh_failure_never_masks_a_placed_order() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    ctx.cart
        .fail_next_snapshot(CartError::Unavailable("cart service down".to_string()));

    let outcome = checkout.submit_order().await.expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);

    // The stale snapshot stays in place
    assert_eq!(checkout.cart().line_count(), 2);
}

// ============================================================================
// Order request shape
// ============================================================================

#[tokio::test]
async fn mirrored_billing_rides_the_order_request_as_shipping() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_review().await;
    assert!(checkout.draft().billing_same_as_shipping());

    checkout.submit_order().await.expect("submit");

    let request = &ctx.backend.create_requests()[0];
    let json = serde_json::to_value(request).expect("serialize request");
    assert_eq!(json["billing_address"], json["shipping_address"]);
    assert_eq!(json["shipping_address"]["street"], "Avenida Paulista");
}

#[tokio::test]
async fn separate_billing_address_is_sent_when_unmirrored() {
    let ctx = TestContext::new();
    let mut checkout = ctx.checkout_at_payment().await;
    checkout
        .select_payment_method(PaymentMethodKind::VoucherBoleto)
        .expect("select voucher");

    let draft = checkout.draft_mut();
    draft.set_billing_same_as_shipping(false);
    *draft.billing_address_mut().expect("billing form") = Address {
        street: "Rua Augusta".to_string(),
        number: "500".to_string(),
        complement: None,
        neighborhood: "Consolação".to_string(),
        city: "São Paulo".to_string(),
        region: "SP".to_string(),
        postal_code: "01305-000".to_string(),
        country: "BR".to_string(),
    };

    checkout.advance().await.expect("advance to review");
    checkout.submit_order().await.expect("submit");

    let request = &ctx.backend.create_requests()[0];
    assert_eq!(request.billing_address.street, "Rua Augusta");
    assert_eq!(request.shipping_address.street, "Avenida Paulista");
}

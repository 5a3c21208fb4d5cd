//! Test support for exercising the checkout engine end to end.
//!
//! The engine takes its backend, cart, and address directory as trait
//! objects, so these tests run the real orchestration code against
//! scripted fakes instead of live services:
//!
//! - [`ScriptedBackend`] - answers each backend call from a per-endpoint
//!   queue (falling back to happy-path defaults) and records every call
//!   and request body for ordering and wire-shape assertions
//! - [`ScriptedCart`] - an in-memory cart with injectable snapshot failures
//! - [`ScriptedDirectory`] - a postal code table
//!
//! [`TestContext`] wires the three together and knows how to walk a
//! checkout to any step. The `tests/` files cover one scenario group each;
//! `live_backend.rs` holds the ignored tests that need real services.

// Test support code; panicking on a bad fixture is the point.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]
#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use uuid::Uuid;

use jacaranda_checkout::api::types::{
    CreateOrderRequest, ProcessPaymentRequest, ValidateStepRequest, ValidateStepResponse,
};
use jacaranda_checkout::api::{ApiError, CheckoutBackend};
use jacaranda_checkout::cart::{CartError, CartLine, CartSnapshot, CartSnapshotProvider};
use jacaranda_checkout::draft::CheckoutDraft;
use jacaranda_checkout::orchestrator::{AdvanceOutcome, CheckoutOrchestrator, CheckoutStep};
use jacaranda_checkout::payment::{PaymentMethod, PaymentMethodKind};
use jacaranda_checkout::services::{AddressDirectory, AddressLookupError, AddressLookupResult};
use jacaranda_checkout::session::{AnonymousSession, ApiCredentials, AuthSession, CustomerProfile};
use jacaranda_checkout::types::{Address, ContactInfo, OrderResult, PaymentResult, ShippingOption};
use jacaranda_core::{CurrencyCode, Money, OrderId, OrderStatus, PaymentStatus, PostalCode, ProductId};

// =============================================================================
// ScriptedBackend
// =============================================================================

/// Fake commerce backend with per-endpoint answer queues.
///
/// Every endpoint pops its queue first and falls back to a happy-path
/// default when the queue is empty, so tests only script the calls they
/// care about. Calls are recorded in order, and order/payment request
/// bodies are kept for inspection.
#[derive(Default)]
pub struct ScriptedBackend {
    validate: Mutex<VecDeque<Result<ValidateStepResponse, ApiError>>>,
    create: Mutex<VecDeque<Result<OrderResult, ApiError>>>,
    payment: Mutex<VecDeque<Result<PaymentResult, ApiError>>>,
    shipping: Mutex<VecDeque<Result<Vec<ShippingOption>, ApiError>>>,
    methods: Mutex<VecDeque<Result<Vec<PaymentMethod>, ApiError>>>,
    calls: Mutex<Vec<String>>,
    create_requests: Mutex<Vec<CreateOrderRequest>>,
    payment_requests: Mutex<Vec<ProcessPaymentRequest>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_validate(&self, result: Result<ValidateStepResponse, ApiError>) {
        self.validate.lock().unwrap().push_back(result);
    }

    pub fn push_create(&self, result: Result<OrderResult, ApiError>) {
        self.create.lock().unwrap().push_back(result);
    }

    pub fn push_payment(&self, result: Result<PaymentResult, ApiError>) {
        self.payment.lock().unwrap().push_back(result);
    }

    pub fn push_shipping(&self, result: Result<Vec<ShippingOption>, ApiError>) {
        self.shipping.lock().unwrap().push_back(result);
    }

    pub fn push_methods(&self, result: Result<Vec<PaymentMethod>, ApiError>) {
        self.methods.lock().unwrap().push_back(result);
    }

    /// Endpoint names in call order (`"validate:shipping"`, `"create_order"`,
    /// `"process_payment"`, ...).
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Bodies of every `create_order` call, in order.
    #[must_use]
    pub fn create_requests(&self) -> Vec<CreateOrderRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    /// Bodies of every `process_payment` call, in order.
    #[must_use]
    pub fn payment_requests(&self) -> Vec<ProcessPaymentRequest> {
        self.payment_requests.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl CheckoutBackend for ScriptedBackend {
    async fn validate_step(
        &self,
        request: &ValidateStepRequest,
    ) -> Result<ValidateStepResponse, ApiError> {
        self.record(format!("validate:{}", request.step));
        self.validate
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ValidateStepResponse {
                    valid: true,
                    errors: Vec::new(),
                })
            })
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderResult, ApiError> {
        self.record("create_order");
        self.create_requests.lock().unwrap().push(request.clone());
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(placed_order()))
    }

    async fn process_payment(
        &self,
        request: &ProcessPaymentRequest,
    ) -> Result<PaymentResult, ApiError> {
        self.record("process_payment");
        self.payment_requests.lock().unwrap().push(request.clone());
        self.payment
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(approved_payment()))
    }

    async fn shipping_options(
        &self,
        _postal_code: &PostalCode,
    ) -> Result<Vec<ShippingOption>, ApiError> {
        self.record("shipping_options");
        self.shipping
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(carrier_options()))
    }

    async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
        self.record("payment_methods");
        self.methods
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PaymentMethod::fallback_catalog()))
    }
}

// =============================================================================
// ScriptedCart
// =============================================================================

/// In-memory cart provider.
///
/// `remove_lines` actually removes and recomputes the subtotal, so tests
/// observe the same cart the production provider would return.
pub struct ScriptedCart {
    snapshot: Mutex<CartSnapshot>,
    snapshot_errors: Mutex<VecDeque<CartError>>,
    remove_errors: Mutex<VecDeque<CartError>>,
}

impl ScriptedCart {
    #[must_use]
    pub fn new(snapshot: CartSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            snapshot_errors: Mutex::new(VecDeque::new()),
            remove_errors: Mutex::new(VecDeque::new()),
        }
    }

    /// Replace the cart contents (e.g. the backend emptied it).
    pub fn set_snapshot(&self, snapshot: CartSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    /// Make the next `snapshot` call fail with the given error.
    pub fn fail_next_snapshot(&self, error: CartError) {
        self.snapshot_errors.lock().unwrap().push_back(error);
    }

    /// Make the next `remove_lines` call fail with the given error.
    pub fn fail_next_remove(&self, error: CartError) {
        self.remove_errors.lock().unwrap().push_back(error);
    }

    /// Current cart contents.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        self.snapshot.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartSnapshotProvider for ScriptedCart {
    async fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        if let Some(error) = self.snapshot_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn remove_lines(&self, line_ids: &[String]) -> Result<CartSnapshot, CartError> {
        if let Some(error) = self.remove_errors.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot
            .lines
            .retain(|line| !line_ids.contains(&line.line_id));

        let currency = snapshot.subtotal.currency;
        let subtotal = snapshot
            .lines
            .iter()
            .map(|line| line.line_total.amount)
            .sum::<Decimal>();
        snapshot.subtotal = Money::new(subtotal, currency);

        Ok(snapshot.clone())
    }
}

// =============================================================================
// ScriptedDirectory
// =============================================================================

/// Postal code table standing in for the address directory.
#[derive(Default)]
pub struct ScriptedDirectory {
    entries: Mutex<HashMap<String, AddressLookupResult>>,
    errors: Mutex<VecDeque<AddressLookupError>>,
}

impl ScriptedDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lookup result under the postal code's bare digits.
    pub fn insert(&self, digits: impl Into<String>, result: AddressLookupResult) {
        self.entries.lock().unwrap().insert(digits.into(), result);
    }

    /// Make the next lookup fail with the given error, entries or not.
    pub fn fail_next_lookup(&self, error: AddressLookupError) {
        self.errors.lock().unwrap().push_back(error);
    }
}

#[async_trait]
impl AddressDirectory for ScriptedDirectory {
    async fn lookup(
        &self,
        postal_code: &PostalCode,
    ) -> Result<AddressLookupResult, AddressLookupError> {
        if let Some(error) = self.errors.lock().unwrap().pop_front() {
            return Err(error);
        }

        self.entries
            .lock()
            .unwrap()
            .get(postal_code.digits())
            .cloned()
            .ok_or_else(|| AddressLookupError::NotFound(postal_code.to_string()))
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Session for a signed-in buyer, with a fixed profile.
pub struct SignedInSession {
    session_id: Uuid,
    token: SecretString,
    profile: CustomerProfile,
}

impl SignedInSession {
    #[must_use]
    pub fn new(profile: CustomerProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            token: SecretString::from("test-customer-token"),
            profile,
        }
    }
}

impl AuthSession for SignedInSession {
    fn credentials(&self) -> ApiCredentials {
        ApiCredentials {
            session_id: self.session_id,
            bearer_token: Some(self.token.clone()),
        }
    }

    fn profile(&self) -> Option<CustomerProfile> {
        Some(self.profile.clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Money in BRL from cents.
#[must_use]
pub fn brl(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2), CurrencyCode::BRL)
}

/// The order every unscripted `create_order` call returns.
#[must_use]
pub fn placed_order() -> OrderResult {
    OrderResult {
        order_id: OrderId::new(77001),
        order_number: "JC-77001".to_string(),
        status: OrderStatus::PendingPayment,
        created_at: Utc::now(),
    }
}

/// The payment every unscripted `process_payment` call returns.
#[must_use]
pub fn approved_payment() -> PaymentResult {
    PaymentResult {
        status: PaymentStatus::Approved,
        transaction_id: Some("tx-0001".to_string()),
        authorization_code: Some("AUTH-0001".to_string()),
        payable_line: None,
    }
}

/// A pending out-of-band payment (voucher style).
#[must_use]
pub fn pending_voucher_payment() -> PaymentResult {
    PaymentResult {
        status: PaymentStatus::Pending,
        transaction_id: Some("tx-0002".to_string()),
        authorization_code: None,
        payable_line: Some("34191.09008 63571.277302 91234.560005 8 99990000019998".to_string()),
    }
}

/// Carrier-quoted shipping options the unscripted backend offers.
#[must_use]
pub fn carrier_options() -> Vec<ShippingOption> {
    vec![
        ShippingOption {
            id: "sedex".to_string(),
            name: "Sedex".to_string(),
            description: "Express courier".to_string(),
            price: brl(2490),
            estimated_days: 2,
            carrier: Some("Correios".to_string()),
        },
        ShippingOption {
            id: "pac".to_string(),
            name: "PAC".to_string(),
            description: "Economy ground".to_string(),
            price: brl(1450),
            estimated_days: 8,
            carrier: Some("Correios".to_string()),
        },
    ]
}

/// Two-line cart: 2x Ceramic Mug at 49.99 plus one Oak Cutting Board at
/// 100.00, subtotal 199.98, no discount or tax.
#[must_use]
pub fn two_line_cart() -> CartSnapshot {
    CartSnapshot {
        lines: vec![
            CartLine {
                line_id: "line-mug".to_string(),
                product_id: ProductId::new(11),
                variant_id: None,
                title: "Ceramic Mug".to_string(),
                variant_title: None,
                quantity: 2,
                unit_price: brl(4999),
                line_total: brl(9998),
            },
            CartLine {
                line_id: "line-board".to_string(),
                product_id: ProductId::new(12),
                variant_id: None,
                title: "Oak Cutting Board".to_string(),
                variant_title: None,
                quantity: 1,
                unit_price: brl(10000),
                line_total: brl(10000),
            },
        ],
        subtotal: brl(19998),
        discount_total: brl(0),
        tax_total: brl(0),
    }
}

/// The Avenida Paulista entry, as the real directory returns it.
#[must_use]
pub fn paulista_lookup() -> AddressLookupResult {
    AddressLookupResult {
        cep: "01310-100".to_string(),
        street: "Avenida Paulista".to_string(),
        complement: "de 612 a 1510 - lado par".to_string(),
        neighborhood: "Bela Vista".to_string(),
        city: "São Paulo".to_string(),
        region: "SP".to_string(),
    }
}

/// A contact block that passes local validation.
#[must_use]
pub fn valid_contact() -> ContactInfo {
    ContactInfo {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        phone: "+55 11 91234-5678".to_string(),
    }
}

/// A complete delivery address on Avenida Paulista.
#[must_use]
pub fn paulista_address() -> Address {
    Address {
        street: "Avenida Paulista".to_string(),
        number: "1578".to_string(),
        complement: None,
        neighborhood: "Bela Vista".to_string(),
        city: "São Paulo".to_string(),
        region: "SP".to_string(),
        postal_code: "01310-100".to_string(),
        country: "BR".to_string(),
    }
}

/// Fill contact and delivery address with valid data.
pub fn fill_shipping_form(draft: &mut CheckoutDraft) {
    draft.contact = valid_contact();
    draft.shipping_address = paulista_address();
}

/// Select the credit card method and fill valid card fields.
pub fn fill_credit_card(draft: &mut CheckoutDraft) {
    draft.payment.select(PaymentMethodKind::CardCredit);
    let fields = draft.payment.fields_mut();
    fields.card_number = "4111 1111 1111 1111".to_string();
    fields.card_holder = "ANA C SOUZA".to_string();
    fields.expiry = "12/30".to_string();
    fields.cvv = "123".to_string();
    fields.installments = 3;
}

// =============================================================================
// TestContext
// =============================================================================

/// The scripted services plus helpers to walk a checkout forward.
pub struct TestContext {
    pub backend: Arc<ScriptedBackend>,
    pub cart: Arc<ScriptedCart>,
    pub directory: Arc<ScriptedDirectory>,
}

impl TestContext {
    /// Context over the standard two-line cart.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cart(two_line_cart())
    }

    /// Context over a specific cart.
    #[must_use]
    pub fn with_cart(snapshot: CartSnapshot) -> Self {
        let directory = ScriptedDirectory::new();
        directory.insert("01310100", paulista_lookup());

        Self {
            backend: Arc::new(ScriptedBackend::new()),
            cart: Arc::new(ScriptedCart::new(snapshot)),
            directory: Arc::new(directory),
        }
    }

    /// Start an anonymous checkout.
    pub async fn begin(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::begin(
            self.backend.clone(),
            self.cart.clone(),
            self.directory.clone(),
            &AnonymousSession::new(),
        )
        .await
        .unwrap()
    }

    /// Start a checkout for a signed-in buyer.
    pub async fn begin_signed_in(&self, profile: CustomerProfile) -> CheckoutOrchestrator {
        CheckoutOrchestrator::begin(
            self.backend.clone(),
            self.cart.clone(),
            self.directory.clone(),
            &SignedInSession::new(profile),
        )
        .await
        .unwrap()
    }

    /// Walk a fresh checkout to the payment step with a valid shipping
    /// slice and the first offered option selected.
    pub async fn checkout_at_payment(&self) -> CheckoutOrchestrator {
        let mut orchestrator = self.begin().await;
        fill_shipping_form(orchestrator.draft_mut());
        orchestrator.load_shipping_options().await;

        let outcome = orchestrator.advance().await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Advanced(CheckoutStep::Payment));
        orchestrator
    }

    /// Walk a fresh checkout to the review step paying by voucher.
    pub async fn checkout_at_review(&self) -> CheckoutOrchestrator {
        let mut orchestrator = self.checkout_at_payment().await;
        orchestrator
            .select_payment_method(PaymentMethodKind::VoucherBoleto)
            .unwrap();

        let outcome = orchestrator.advance().await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Advanced(CheckoutStep::Review));
        orchestrator
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

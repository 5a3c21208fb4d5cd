//! Checkout flow orchestration.
//!
//! [`CheckoutOrchestrator`] drives one checkout from the shipping form to
//! the confirmation screen. It owns the draft and the step position, talks
//! to the backend through [`CheckoutBackend`], reads the cart through
//! [`CartSnapshotProvider`], and prefills addresses through
//! [`AddressDirectory`]; all three arrive as trait objects so the same
//! engine runs against production services and scripted fakes.
//!
//! Navigation misuse (advancing from the wrong step, submitting twice)
//! comes back as [`FlowError`]. Everything that can happen during a
//! legitimate advance or submission is data, not an error:
//! [`AdvanceOutcome`] and [`SubmitOutcome`] enumerate the ways each call
//! can land so the UI can match on them directly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::types::{
    CardPayload, CreateOrderRequest, ProcessPaymentRequest, ValidateStepRequest,
};
use crate::api::{ApiError, CheckoutBackend};
use crate::cart::{CartError, CartSnapshot, CartSnapshotProvider};
use crate::draft::CheckoutDraft;
use crate::payment::{PaymentMethod, PaymentMethodKind};
use crate::services::{AddressDirectory, AddressLookupError};
use crate::session::AuthSession;
use crate::shipping;
use crate::stock::StockConflictReport;
use crate::totals::CheckoutTotals;
use crate::types::{FieldError, OrderResult, PaymentResult, ShippingOption};
use jacaranda_core::{PaymentStatus, PostalCode};

/// Message shown when the backend fails for a reason the buyer cannot fix.
const SERVICE_ERROR_MESSAGE: &str =
    "We could not process your request right now. Please try again.";

// =============================================================================
// Steps
// =============================================================================

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Contact details, delivery address, shipping option.
    Shipping,
    /// Payment method and its fields.
    Payment,
    /// Read-only summary before submission.
    Review,
    /// Order creation and payment in flight.
    Processing,
    /// Order placed.
    Confirmation,
}

impl CheckoutStep {
    /// Wire name, as sent to the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
            Self::Processing => "processing",
            Self::Confirmation => "confirmation",
        }
    }

    /// Display name for the progress header.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
            Self::Processing => "Processing",
            Self::Confirmation => "Confirmation",
        }
    }

    /// Step number (1-indexed).
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
            Self::Processing => 4,
            Self::Confirmation => 5,
        }
    }

    /// Whether the buyer edits a form on this step.
    #[must_use]
    pub const fn is_form_step(&self) -> bool {
        matches!(self, Self::Shipping | Self::Payment)
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Errors and outcomes
// =============================================================================

/// Navigation misuse. These indicate a caller bug, not a buyer problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// The current step has no forward transition via [`CheckoutOrchestrator::advance`].
    #[error("cannot advance from the {0} step")]
    CannotAdvance(CheckoutStep),

    /// The current step has no backward transition.
    #[error("cannot go back from the {0} step")]
    CannotGoBack(CheckoutStep),

    /// Submission attempted off the review step.
    #[error("orders are submitted from the review step, not {0}")]
    NotOnReview(CheckoutStep),

    /// The checkout already produced a confirmation.
    #[error("checkout is already completed")]
    AlreadyCompleted,

    /// The given ID matches none of the offered shipping options.
    #[error("unknown shipping option: {0}")]
    UnknownShippingOption(String),

    /// The given method is not in the offered catalog.
    #[error("payment method {0} is not offered")]
    UnknownPaymentMethod(PaymentMethodKind),
}

/// Which address of the draft a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScope {
    Shipping,
    Billing,
}

impl AddressScope {
    const fn field_prefix(self) -> &'static str {
        match self {
            Self::Shipping => "shipping_address",
            Self::Billing => "billing_address",
        }
    }
}

/// Result of one [`CheckoutOrchestrator::advance`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved to the next step.
    Advanced(CheckoutStep),
    /// Stayed put; the listed fields need fixing.
    FieldErrors(Vec<FieldError>),
    /// Stayed put; cart items became unavailable during validation.
    StockConflict(StockConflictReport),
    /// The cart emptied out from under the checkout.
    CartEmptied,
    /// Backend failure the buyer cannot fix; safe to retry.
    Failed(String),
}

/// Result of one [`CheckoutOrchestrator::submit_order`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Order placed. The flow is finished.
    Completed(CheckoutConfirmation),
    /// Back on review; the listed fields need fixing.
    FieldErrors(Vec<FieldError>),
    /// Back on review; cart items became unavailable.
    StockConflict(StockConflictReport),
    /// Back on the payment step; the provider declined the payment. Any
    /// created order is kept and reused on retry.
    PaymentRejected(String),
    /// The cart emptied out from under the checkout.
    CartEmptied,
    /// Back on review; backend failure the buyer cannot fix.
    Failed(String),
}

/// Terminal state of a finished checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfirmation {
    /// The created order.
    pub order: OrderResult,
    /// Payment outcome, when the payment call returned one.
    pub payment: Option<PaymentResult>,
    /// Set when the order exists but its payment did not settle cleanly
    /// (errored call or unrecognized status). Support follows these up;
    /// the buyer still sees their order.
    pub payment_anomaly: bool,
}

// =============================================================================
// CheckoutOrchestrator
// =============================================================================

/// Drives one checkout session across the five steps.
pub struct CheckoutOrchestrator {
    backend: Arc<dyn CheckoutBackend>,
    cart: Arc<dyn CartSnapshotProvider>,
    directory: Arc<dyn AddressDirectory>,
    session_id: Uuid,
    step: CheckoutStep,
    draft: CheckoutDraft,
    cart_snapshot: CartSnapshot,
    shipping_options: Vec<ShippingOption>,
    payment_methods: Vec<PaymentMethod>,
    order_result: Option<OrderResult>,
    stock_conflict: Option<StockConflictReport>,
    confirmation: Option<CheckoutConfirmation>,
}

impl CheckoutOrchestrator {
    /// Start a checkout: snapshot the cart and seed the draft from the
    /// session's profile, when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error when the initial cart snapshot cannot be taken.
    pub async fn begin(
        backend: Arc<dyn CheckoutBackend>,
        cart: Arc<dyn CartSnapshotProvider>,
        directory: Arc<dyn AddressDirectory>,
        session: &dyn AuthSession,
    ) -> Result<Self, CartError> {
        let cart_snapshot = cart.snapshot().await?;
        let credentials = session.credentials();
        let profile = session.profile();
        let draft = CheckoutDraft::seeded(profile.as_ref());

        debug!(
            session_id = %credentials.session_id,
            lines = cart_snapshot.line_count(),
            signed_in = profile.is_some(),
            "Checkout started"
        );

        Ok(Self {
            backend,
            cart,
            directory,
            session_id: credentials.session_id,
            step: CheckoutStep::Shipping,
            draft,
            cart_snapshot,
            shipping_options: Vec::new(),
            payment_methods: PaymentMethod::fallback_catalog(),
            order_result: None,
            stock_conflict: None,
            confirmation: None,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Validate the current step and move forward.
    ///
    /// The draft is checked locally first; only a locally clean slice is
    /// sent to the backend for cross-checks. The step only changes when the
    /// backend agrees.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] when the current step has no forward
    /// transition. Validation failures are an [`AdvanceOutcome`], not an
    /// error.
    #[instrument(skip(self), fields(step = %self.step))]
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, FlowError> {
        if self.confirmation.is_some() {
            return Err(FlowError::AlreadyCompleted);
        }

        let (next, local_errors) = match self.step {
            CheckoutStep::Shipping => (CheckoutStep::Payment, self.draft.validate_shipping()),
            CheckoutStep::Payment => (CheckoutStep::Review, self.draft.validate_payment()),
            current => return Err(FlowError::CannotAdvance(current)),
        };

        if !local_errors.is_empty() {
            return Ok(AdvanceOutcome::FieldErrors(local_errors));
        }

        let request = self.validate_request(self.step);
        match self.backend.validate_step(&request).await {
            Ok(response) if response.valid => {
                self.step = next;
                debug!(step = %next, "Advanced checkout");
                Ok(AdvanceOutcome::Advanced(next))
            }
            Ok(response) => {
                let errors = if response.errors.is_empty() {
                    vec![FieldError::new(
                        "form",
                        "Validation failed. Check the form and try again.",
                    )]
                } else {
                    response.errors
                };
                Ok(AdvanceOutcome::FieldErrors(errors))
            }
            Err(ApiError::Validation(errors)) => Ok(AdvanceOutcome::FieldErrors(errors)),
            Err(ApiError::OutOfStock(items)) => {
                let report = StockConflictReport::new(items);
                self.stock_conflict = Some(report.clone());
                Ok(AdvanceOutcome::StockConflict(report))
            }
            Err(ApiError::EmptyCart) => {
                self.handle_emptied_cart().await;
                Ok(AdvanceOutcome::CartEmptied)
            }
            Err(e) => {
                warn!(error = %e, step = %self.step, "Step validation call failed");
                Ok(AdvanceOutcome::Failed(SERVICE_ERROR_MESSAGE.to_string()))
            }
        }
    }

    /// Move back one step. Draft contents survive.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] from the first step, during processing, or
    /// after completion.
    pub fn go_back(&mut self) -> Result<CheckoutStep, FlowError> {
        if self.confirmation.is_some() {
            return Err(FlowError::AlreadyCompleted);
        }

        let prev = match self.step {
            CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
            current => return Err(FlowError::CannotGoBack(current)),
        };

        self.step = prev;
        Ok(prev)
    }

    // =========================================================================
    // Address lookup
    // =========================================================================

    /// Prefill an address from its postal code.
    ///
    /// Returns field errors on a bad or unknown code and an "unavailable,
    /// fill in manually" error when the directory is down. An empty vec
    /// means the form was filled.
    #[instrument(skip(self), fields(scope = ?scope))]
    pub async fn lookup_address(&mut self, scope: AddressScope) -> Vec<FieldError> {
        let prefix = scope.field_prefix();

        let raw = match scope {
            AddressScope::Shipping => self.draft.shipping_address.postal_code.clone(),
            AddressScope::Billing => {
                let Some(billing) = self.draft.billing_address() else {
                    return vec![FieldError::new(
                        format!("{prefix}.postal_code"),
                        "billing address mirrors the shipping address",
                    )];
                };
                billing.postal_code.clone()
            }
        };

        let postal_code = match PostalCode::parse(&raw) {
            Ok(code) => code,
            Err(e) => {
                return vec![FieldError::new(
                    format!("{prefix}.postal_code"),
                    e.to_string(),
                )];
            }
        };

        let result = match self.directory.lookup(&postal_code).await {
            Ok(result) => result,
            Err(AddressLookupError::NotFound(_)) => {
                return vec![FieldError::new(
                    format!("{prefix}.postal_code"),
                    "postal code not found",
                )];
            }
            Err(e) => {
                warn!(error = %e, "Address lookup failed");
                return vec![FieldError::new(
                    format!("{prefix}.postal_code"),
                    "address lookup is unavailable, fill in the address manually",
                )];
            }
        };

        match scope {
            AddressScope::Shipping => result.apply_to(&mut self.draft.shipping_address),
            AddressScope::Billing => {
                if let Some(billing) = self.draft.billing_address_mut() {
                    result.apply_to(billing);
                }
            }
        }

        Vec::new()
    }

    // =========================================================================
    // Shipping options
    // =========================================================================

    /// Fetch shipping options for the draft's postal code.
    ///
    /// The stored list is never left empty: when the backend fails or
    /// returns nothing, the built-in fallback options take its place. The
    /// current selection is refreshed against the new list, and the first
    /// option is auto-selected when nothing (valid) is selected.
    #[instrument(skip(self))]
    pub async fn load_shipping_options(&mut self) -> Vec<FieldError> {
        let postal_code = match PostalCode::parse(&self.draft.shipping_address.postal_code) {
            Ok(code) => code,
            Err(e) => {
                return vec![FieldError::new(
                    "shipping_address.postal_code",
                    e.to_string(),
                )];
            }
        };

        let fetched = self.backend.shipping_options(&postal_code).await;
        self.shipping_options = shipping::with_fallback(fetched);

        // Reconcile the selection: same ID gets the refreshed option (price
        // may have moved), a vanished or missing selection falls back to
        // the first offer
        let refreshed = self.draft.shipping_option.as_ref().and_then(|selected| {
            self.shipping_options
                .iter()
                .find(|option| option.id == selected.id)
                .cloned()
        });
        self.draft.shipping_option = refreshed.or_else(|| self.shipping_options.first().cloned());

        Vec::new()
    }

    /// Select a shipping option from the loaded list by ID.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownShippingOption`] when the ID is not in
    /// the loaded list.
    pub fn select_shipping_option(&mut self, id: &str) -> Result<(), FlowError> {
        let option = self
            .shipping_options
            .iter()
            .find(|option| option.id == id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownShippingOption(id.to_string()))?;

        self.draft.shipping_option = Some(option);
        Ok(())
    }

    // =========================================================================
    // Payment methods
    // =========================================================================

    /// Fetch the payment method catalog from the backend.
    ///
    /// Falls back to the built-in catalog when the call fails or comes back
    /// empty, so the payment step always has methods to offer.
    #[instrument(skip(self))]
    pub async fn load_payment_methods(&mut self) -> &[PaymentMethod] {
        match self.backend.payment_methods().await {
            Ok(methods) if !methods.is_empty() => self.payment_methods = methods,
            Ok(_) => {
                warn!("Backend returned no payment methods, using the built-in catalog");
                self.payment_methods = PaymentMethod::fallback_catalog();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load payment methods, using the built-in catalog");
                self.payment_methods = PaymentMethod::fallback_catalog();
            }
        }

        &self.payment_methods
    }

    /// Select a payment method. Switching methods clears the payment
    /// fields; re-selecting the current one keeps them.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownPaymentMethod`] when the method is not
    /// in the offered catalog.
    pub fn select_payment_method(&mut self, kind: PaymentMethodKind) -> Result<(), FlowError> {
        if !self.payment_methods.iter().any(|method| method.id == kind) {
            return Err(FlowError::UnknownPaymentMethod(kind));
        }

        self.draft.payment.select(kind);
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submit the order from the review step.
    ///
    /// Creation happens at most once per checkout: a payment retry after a
    /// rejection reuses the already-created order. A payment failure after
    /// the order exists still completes the checkout, with
    /// [`CheckoutConfirmation::payment_anomaly`] set, because the order is
    /// real regardless of what the payment call said.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] off the review step or after completion.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn submit_order(&mut self) -> Result<SubmitOutcome, FlowError> {
        if self.confirmation.is_some() {
            return Err(FlowError::AlreadyCompleted);
        }
        if self.step != CheckoutStep::Review {
            return Err(FlowError::NotOnReview(self.step));
        }

        let errors = self.draft.validate_review();
        if !errors.is_empty() {
            return Ok(SubmitOutcome::FieldErrors(errors));
        }

        self.step = CheckoutStep::Processing;

        if self.order_result.is_none() {
            let Some(request) = self.create_order_request() else {
                self.step = CheckoutStep::Review;
                return Ok(SubmitOutcome::FieldErrors(vec![FieldError::new(
                    "form",
                    "checkout is missing required selections",
                )]));
            };

            match self.backend.create_order(&request).await {
                Ok(order) => {
                    debug!(order_number = %order.order_number, "Order created");
                    self.order_result = Some(order);
                }
                Err(ApiError::OutOfStock(items)) => {
                    let report = StockConflictReport::new(items);
                    self.stock_conflict = Some(report.clone());
                    self.step = CheckoutStep::Review;
                    return Ok(SubmitOutcome::StockConflict(report));
                }
                Err(ApiError::EmptyCart) => {
                    self.handle_emptied_cart().await;
                    self.step = CheckoutStep::Review;
                    return Ok(SubmitOutcome::CartEmptied);
                }
                Err(ApiError::Validation(errors)) => {
                    self.step = CheckoutStep::Review;
                    return Ok(SubmitOutcome::FieldErrors(errors));
                }
                Err(ApiError::PaymentRejected(message)) => {
                    // No order was created; the next submit starts over
                    debug!("Order creation rejected by the payment provider");
                    self.step = CheckoutStep::Payment;
                    return Ok(SubmitOutcome::PaymentRejected(message));
                }
                Err(e) => {
                    warn!(error = %e, "Order creation failed");
                    self.step = CheckoutStep::Review;
                    return Ok(SubmitOutcome::Failed(SERVICE_ERROR_MESSAGE.to_string()));
                }
            }
        }

        Ok(self.process_payment_phase().await)
    }

    /// Charge the order created in this checkout.
    async fn process_payment_phase(&mut self) -> SubmitOutcome {
        let Some(order) = self.order_result.clone() else {
            self.step = CheckoutStep::Review;
            return SubmitOutcome::Failed(SERVICE_ERROR_MESSAGE.to_string());
        };

        let Some(payment_method) = self.draft.payment.method() else {
            self.step = CheckoutStep::Payment;
            return SubmitOutcome::FieldErrors(vec![FieldError::new(
                "payment_method",
                "select a payment method",
            )]);
        };

        let request = ProcessPaymentRequest {
            order_id: order.order_id,
            payment_method,
            card: self.card_payload(),
        };

        match self.backend.process_payment(&request).await {
            Ok(payment) if payment.status.counts_as_success() => {
                self.complete(order, Some(payment), false).await
            }
            Ok(payment) if payment.status == PaymentStatus::Rejected => {
                debug!(order_number = %order.order_number, "Payment rejected");
                self.step = CheckoutStep::Payment;
                SubmitOutcome::PaymentRejected("Payment was declined".to_string())
            }
            Ok(payment) => {
                // Unrecognized status on a created order: the order stands,
                // the payment gets flagged for follow-up
                warn!(
                    order_number = %order.order_number,
                    status = %payment.status,
                    "Payment finished in an unrecognized status"
                );
                self.complete(order, Some(payment), true).await
            }
            Err(ApiError::PaymentRejected(message)) => {
                debug!(order_number = %order.order_number, "Payment rejected");
                self.step = CheckoutStep::Payment;
                SubmitOutcome::PaymentRejected(message)
            }
            Err(e) => {
                // The order is already on file. Completing with the anomaly
                // flagged beats stranding a placed order behind an error
                // screen; support reconciles flagged payments
                warn!(
                    error = %e,
                    order_number = %order.order_number,
                    "Payment call failed after order creation"
                );
                self.complete(order, None, true).await
            }
        }
    }

    /// Finish the checkout: refresh the cart, record the confirmation.
    async fn complete(
        &mut self,
        order: OrderResult,
        payment: Option<PaymentResult>,
        payment_anomaly: bool,
    ) -> SubmitOutcome {
        // Cart refresh is best effort; the order is already placed
        if let Err(e) = self.refresh_cart().await {
            warn!(error = %e, "Cart refresh after completion failed");
        }

        let confirmation = CheckoutConfirmation {
            order,
            payment,
            payment_anomaly,
        };
        self.confirmation = Some(confirmation.clone());
        self.step = CheckoutStep::Confirmation;

        debug!(
            order_number = %confirmation.order.order_number,
            payment_anomaly = confirmation.payment_anomaly,
            "Checkout completed"
        );

        SubmitOutcome::Completed(confirmation)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Re-read the cart from the provider.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart service is unavailable; the previous
    /// snapshot stays in place.
    pub async fn refresh_cart(&mut self) -> Result<(), CartError> {
        self.cart_snapshot = self.cart.snapshot().await?;
        Ok(())
    }

    /// Remove the cart lines named by the active stock conflict.
    ///
    /// Clears the conflict and returns how many lines were removed. With no
    /// active conflict this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart service rejects the removal; the
    /// conflict stays active so the buyer can retry.
    #[instrument(skip(self))]
    pub async fn remove_unavailable_items(&mut self) -> Result<usize, CartError> {
        let Some(report) = &self.stock_conflict else {
            return Ok(0);
        };

        let line_ids = report.affected_line_ids(&self.cart_snapshot);
        if line_ids.is_empty() {
            // Nothing in the cart matches the report (anymore)
            self.stock_conflict = None;
            return Ok(0);
        }

        self.cart_snapshot = self.cart.remove_lines(&line_ids).await?;
        self.stock_conflict = None;

        debug!(removed = line_ids.len(), "Removed unavailable cart lines");
        Ok(line_ids.len())
    }

    /// Drop the active stock conflict without touching the cart.
    pub fn dismiss_stock_conflict(&mut self) {
        self.stock_conflict = None;
    }

    async fn handle_emptied_cart(&mut self) {
        if let Err(e) = self.refresh_cart().await {
            warn!(error = %e, "Cart refresh after empty-cart response failed");
            self.cart_snapshot = CartSnapshot::empty(self.cart_snapshot.subtotal.currency);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The draft under construction.
    #[must_use]
    pub const fn draft(&self) -> &CheckoutDraft {
        &self.draft
    }

    /// Mutable draft for form binding.
    pub const fn draft_mut(&mut self) -> &mut CheckoutDraft {
        &mut self.draft
    }

    /// The cart as of the last snapshot or refresh.
    #[must_use]
    pub const fn cart(&self) -> &CartSnapshot {
        &self.cart_snapshot
    }

    /// Order totals for the current cart and shipping selection.
    #[must_use]
    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::compute(&self.cart_snapshot, self.draft.shipping_option.as_ref())
    }

    /// Shipping options from the last load, empty before the first.
    #[must_use]
    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.shipping_options
    }

    /// Offered payment methods.
    #[must_use]
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// The created order, once there is one. Never unset afterwards.
    #[must_use]
    pub const fn order_result(&self) -> Option<&OrderResult> {
        self.order_result.as_ref()
    }

    /// The active stock conflict, if any.
    #[must_use]
    pub const fn stock_conflict(&self) -> Option<&StockConflictReport> {
        self.stock_conflict.as_ref()
    }

    /// The confirmation, once the checkout completed.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&CheckoutConfirmation> {
        self.confirmation.as_ref()
    }

    // =========================================================================
    // Request builders
    // =========================================================================

    fn validate_request(&self, step: CheckoutStep) -> ValidateStepRequest {
        ValidateStepRequest {
            session_id: self.session_id,
            step: step.as_str().to_string(),
            contact: self.draft.contact.clone(),
            shipping_address: self.draft.shipping_address.clone(),
            billing_address: self.draft.effective_billing_address().clone(),
            shipping_option_id: self
                .draft
                .shipping_option
                .as_ref()
                .map(|option| option.id.clone()),
            payment_method: self.draft.payment.method(),
            notes: self.draft.notes.clone(),
        }
    }

    fn create_order_request(&self) -> Option<CreateOrderRequest> {
        let shipping_option = self.draft.shipping_option.as_ref()?;
        let payment_method = self.draft.payment.method()?;
        let notes = self.draft.notes.trim();

        Some(CreateOrderRequest {
            session_id: self.session_id,
            contact: self.draft.contact.clone(),
            shipping_address: self.draft.shipping_address.clone(),
            billing_address: self.draft.effective_billing_address().clone(),
            shipping_option_id: shipping_option.id.clone(),
            payment_method,
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            },
        })
    }

    fn card_payload(&self) -> Option<CardPayload> {
        let method = self.draft.payment.method()?;
        if !method.is_card() {
            return None;
        }

        let fields = self.draft.payment.fields();
        Some(CardPayload {
            number: fields.card_number_digits(),
            holder: fields.card_holder.trim().to_string(),
            expiry: fields.expiry.trim().to_string(),
            cvv: fields.cvv.trim().to_string(),
            installments: fields.installments,
        })
    }
}

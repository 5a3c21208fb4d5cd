//! The in-progress checkout form.
//!
//! [`CheckoutDraft`] holds raw buyer input across steps. Validation runs per
//! step slice and reports [`FieldError`]s instead of failing fast, so the UI
//! can mark every offending input at once.

use jacaranda_core::{Email, Phone, PostalCode};
use serde::{Deserialize, Serialize};

use crate::payment::PaymentSelector;
use crate::session::CustomerProfile;
use crate::types::{Address, ContactInfo, FieldError, ShippingOption};

/// Upper bound for the order notes field.
pub const NOTES_MAX_LENGTH: usize = 500;

/// Everything the buyer has entered so far.
///
/// The billing fields are private to protect their invariant: a billing
/// address exists exactly when `billing_same_as_shipping` is off. Flipping
/// the flag on drops the address, flipping it off creates a blank one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutDraft {
    /// Buyer contact details.
    pub contact: ContactInfo,
    /// Delivery address.
    pub shipping_address: Address,
    /// Selected shipping option.
    pub shipping_option: Option<ShippingOption>,
    /// Payment method and fields.
    pub payment: PaymentSelector,
    /// Free-form order notes.
    pub notes: String,
    billing_same_as_shipping: bool,
    billing_address: Option<Address>,
}

impl Default for CheckoutDraft {
    fn default() -> Self {
        Self {
            contact: ContactInfo::default(),
            shipping_address: Address::default(),
            shipping_option: None,
            payment: PaymentSelector::default(),
            notes: String::new(),
            billing_same_as_shipping: true,
            billing_address: None,
        }
    }
}

impl CheckoutDraft {
    /// A blank draft, billing mirrored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft prefilled from a signed-in buyer's profile.
    #[must_use]
    pub fn seeded(profile: Option<&CustomerProfile>) -> Self {
        let Some(profile) = profile else {
            return Self::new();
        };

        Self {
            contact: ContactInfo {
                name: profile.name.clone(),
                email: profile.email.clone(),
                phone: profile.phone.clone().unwrap_or_default(),
            },
            shipping_address: profile.default_address.clone().unwrap_or_default(),
            ..Self::new()
        }
    }

    /// Whether billing mirrors the shipping address.
    #[must_use]
    pub const fn billing_same_as_shipping(&self) -> bool {
        self.billing_same_as_shipping
    }

    /// Toggle the billing mirror.
    ///
    /// Turning the mirror on discards any separate billing address; turning
    /// it off starts a blank one for the buyer to fill in.
    pub fn set_billing_same_as_shipping(&mut self, same: bool) {
        self.billing_same_as_shipping = same;
        if same {
            self.billing_address = None;
        } else if self.billing_address.is_none() {
            self.billing_address = Some(Address::default());
        }
    }

    /// The separate billing address, when the mirror is off.
    #[must_use]
    pub const fn billing_address(&self) -> Option<&Address> {
        self.billing_address.as_ref()
    }

    /// Mutable billing address for form binding, when the mirror is off.
    pub const fn billing_address_mut(&mut self) -> Option<&mut Address> {
        self.billing_address.as_mut()
    }

    /// The address to bill: the separate one, or shipping when mirrored.
    #[must_use]
    pub fn effective_billing_address(&self) -> &Address {
        self.billing_address
            .as_ref()
            .unwrap_or(&self.shipping_address)
    }

    /// Validate the shipping step slice: contact, delivery address,
    /// shipping option.
    #[must_use]
    pub fn validate_shipping(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.contact.name.trim().is_empty() {
            errors.push(FieldError::new("contact.name", "enter your full name"));
        }

        if let Err(e) = Email::parse(&self.contact.email) {
            errors.push(FieldError::new("contact.email", e.to_string()));
        }

        if let Err(e) = Phone::parse(&self.contact.phone) {
            errors.push(FieldError::new("contact.phone", e.to_string()));
        }

        errors.extend(address_errors(&self.shipping_address, "shipping_address"));

        if self.shipping_option.is_none() {
            errors.push(FieldError::new("shipping_option", "select a shipping option"));
        }

        errors
    }

    /// Validate the payment step slice: method fields plus the billing
    /// address when it is not mirrored.
    #[must_use]
    pub fn validate_payment(&self) -> Vec<FieldError> {
        let mut errors = self.payment.validate();

        if !self.billing_same_as_shipping
            && let Some(billing) = &self.billing_address
        {
            errors.extend(address_errors(billing, "billing_address"));
        }

        errors
    }

    /// Validate everything shown on the review step: both prior slices and
    /// the notes bound.
    #[must_use]
    pub fn validate_review(&self) -> Vec<FieldError> {
        let mut errors = self.validate_shipping();
        errors.extend(self.validate_payment());

        if self.notes.chars().count() > NOTES_MAX_LENGTH {
            errors.push(FieldError::new(
                "notes",
                format!("notes must be at most {NOTES_MAX_LENGTH} characters"),
            ));
        }

        errors
    }
}

/// Completeness and postal code checks for one address block.
fn address_errors(address: &Address, prefix: &str) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = address
        .missing_fields()
        .into_iter()
        .map(|field| FieldError::new(format!("{prefix}.{field}"), format!("{field} is required")))
        .collect();

    let postal = address.postal_code.trim();
    if !postal.is_empty()
        && let Err(e) = PostalCode::parse(postal)
    {
        errors.push(FieldError::new(
            format!("{prefix}.postal_code"),
            e.to_string(),
        ));
    }

    errors
}

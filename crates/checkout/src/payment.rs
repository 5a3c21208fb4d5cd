//! Payment method selection and card field validation.
//!
//! Selecting a different method clears every previously entered field so
//! values never leak between methods (a card number typed under credit must
//! not ride along into a voucher payment).

use serde::{Deserialize, Serialize};

use crate::types::FieldError;

/// Payment methods the checkout understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethodKind {
    CardCredit,
    CardDebit,
    InstantTransfer,
    VoucherBoleto,
}

impl PaymentMethodKind {
    /// All kinds, in display order. Used when the catalog fetch fails.
    pub const ALL: [Self; 4] = [
        Self::CardCredit,
        Self::CardDebit,
        Self::InstantTransfer,
        Self::VoucherBoleto,
    ];

    /// Whether this method collects card fields.
    #[must_use]
    pub const fn is_card(&self) -> bool {
        matches!(self, Self::CardCredit | Self::CardDebit)
    }

    /// Default display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::CardCredit => "Credit card",
            Self::CardDebit => "Debit card",
            Self::InstantTransfer => "Instant transfer",
            Self::VoucherBoleto => "Payment voucher",
        }
    }
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardCredit => write!(f, "card-credit"),
            Self::CardDebit => write!(f, "card-debit"),
            Self::InstantTransfer => write!(f, "instant-transfer"),
            Self::VoucherBoleto => write!(f, "voucher-boleto"),
        }
    }
}

impl std::str::FromStr for PaymentMethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card-credit" => Ok(Self::CardCredit),
            "card-debit" => Ok(Self::CardDebit),
            "instant-transfer" => Ok(Self::InstantTransfer),
            "voucher-boleto" => Ok(Self::VoucherBoleto),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Catalog entry from `GET /checkout/payment-methods`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethod {
    /// Method kind.
    pub id: PaymentMethodKind,
    /// Display name from the backend.
    pub name: String,
    /// Icon identifier, when the backend sets one.
    pub icon: Option<String>,
}

impl PaymentMethod {
    /// Built-in catalog used when the backend list is unavailable.
    #[must_use]
    pub fn fallback_catalog() -> Vec<Self> {
        PaymentMethodKind::ALL
            .into_iter()
            .map(|kind| Self {
                id: kind,
                name: kind.display_name().to_string(),
                icon: None,
            })
            .collect()
    }
}

/// Raw form input for the selected payment method.
///
/// Card fields stay empty for non-card methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentFields {
    /// Card number, separators allowed.
    pub card_number: String,
    /// Name on the card.
    pub card_holder: String,
    /// Expiry in MM/YY form.
    pub expiry: String,
    /// Security code.
    pub cvv: String,
    /// Installment count for credit payments.
    pub installments: u32,
}

impl Default for PaymentFields {
    fn default() -> Self {
        Self {
            card_number: String::new(),
            card_holder: String::new(),
            expiry: String::new(),
            cvv: String::new(),
            installments: 1,
        }
    }
}

impl PaymentFields {
    /// Card number with separators stripped.
    #[must_use]
    pub fn card_number_digits(&self) -> String {
        self.card_number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }
}

/// Holds the selected method and its fields, with switch-clears semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSelector {
    method: Option<PaymentMethodKind>,
    fields: PaymentFields,
}

impl PaymentSelector {
    /// The currently selected method.
    #[must_use]
    pub const fn method(&self) -> Option<PaymentMethodKind> {
        self.method
    }

    /// Select a method. Switching away from another method resets the
    /// fields; re-selecting the same method keeps them.
    pub fn select(&mut self, kind: PaymentMethodKind) {
        if self.method != Some(kind) {
            self.fields = PaymentFields::default();
        }
        self.method = Some(kind);
    }

    /// Current field values.
    #[must_use]
    pub const fn fields(&self) -> &PaymentFields {
        &self.fields
    }

    /// Mutable field values, for form binding.
    pub const fn fields_mut(&mut self) -> &mut PaymentFields {
        &mut self.fields
    }

    /// Validate the selection and its fields.
    ///
    /// Card methods require a 13-19 digit number, MM/YY expiry with a real
    /// month, a 3-4 digit security code, a non-empty holder name, and 1-12
    /// installments. Transfer and voucher methods need nothing beyond the
    /// selection itself.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let Some(method) = self.method else {
            return vec![FieldError::new("payment_method", "select a payment method")];
        };

        if !method.is_card() {
            return Vec::new();
        }

        let mut errors = Vec::new();

        let digits = self.fields.card_number_digits();
        if digits.is_empty() {
            errors.push(FieldError::new("card_number", "enter the card number"));
        } else if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(FieldError::new(
                "card_number",
                "card number must be 13 to 19 digits",
            ));
        }

        if self.fields.card_holder.trim().is_empty() {
            errors.push(FieldError::new("card_holder", "enter the name on the card"));
        }

        if !expiry_is_valid(&self.fields.expiry) {
            errors.push(FieldError::new("expiry", "expiry must be in MM/YY form"));
        }

        let cvv = &self.fields.cvv;
        if !(cvv.len() == 3 || cvv.len() == 4) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("cvv", "security code must be 3 or 4 digits"));
        }

        if !(1..=12).contains(&self.fields.installments) {
            errors.push(FieldError::new(
                "installments",
                "installments must be between 1 and 12",
            ));
        }

        errors
    }
}

/// Shape check for MM/YY: two-digit month 01-12, two-digit year.
fn expiry_is_valid(expiry: &str) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return false;
    };

    if month.len() != 2 || year.len() != 2 {
        return false;
    }

    if !year.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    month
        .parse::<u32>()
        .is_ok_and(|m| (1..=12).contains(&m))
}

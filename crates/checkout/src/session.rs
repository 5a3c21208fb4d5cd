//! Buyer session injected into the checkout engine.
//!
//! The engine never inspects cookies or global state. Whoever hosts it
//! (an HTTP handler, a test) implements [`AuthSession`] and hands it in,
//! which is also where draft prefill data comes from for signed-in buyers.

use jacaranda_core::CustomerId;
use secrecy::SecretString;
use uuid::Uuid;

use crate::types::Address;

/// Credentials the backend client sends with every request.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    /// Checkout session identifier, also the idempotency scope for order
    /// creation on the backend.
    pub session_id: Uuid,
    /// Bearer token for signed-in buyers. Anonymous checkouts have none.
    pub bearer_token: Option<SecretString>,
}

/// Profile data used to prefill the draft for signed-in buyers.
#[derive(Debug, Clone, Default)]
pub struct CustomerProfile {
    /// Backend customer ID, when known.
    pub customer_id: Option<CustomerId>,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Default shipping address.
    pub default_address: Option<Address>,
}

/// Identity of the buyer going through checkout.
pub trait AuthSession: Send + Sync {
    /// Credentials for backend API calls.
    fn credentials(&self) -> ApiCredentials;

    /// Profile for draft prefill. `None` for anonymous buyers.
    fn profile(&self) -> Option<CustomerProfile>;
}

/// Session for a buyer who has not signed in.
#[derive(Debug, Clone)]
pub struct AnonymousSession {
    session_id: Uuid,
}

impl AnonymousSession {
    /// Create a session with a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
        }
    }
}

impl Default for AnonymousSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession for AnonymousSession {
    fn credentials(&self) -> ApiCredentials {
        ApiCredentials {
            session_id: self.session_id,
            bearer_token: None,
        }
    }

    fn profile(&self) -> Option<CustomerProfile> {
        None
    }
}

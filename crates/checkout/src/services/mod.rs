//! External service integrations for checkout.
//!
//! # Services
//!
//! - `address` - Postal code to address lookup (`ViaCEP`-compatible)

pub mod address;

pub use address::{AddressDirectory, AddressLookupClient, AddressLookupError, AddressLookupResult};

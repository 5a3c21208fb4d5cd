//! Jacaranda checkout workflow engine.
//!
//! This crate drives a storefront checkout from the shipping form to the
//! confirmation screen as a library, independent of any UI layer. The host
//! supplies the cart, the buyer session, and (in tests) fake backends; the
//! [`orchestrator::CheckoutOrchestrator`] does the rest.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod draft;
pub mod orchestrator;
pub mod payment;
pub mod services;
pub mod session;
pub mod shipping;
pub mod stock;
pub mod totals;
pub mod types;

pub use orchestrator::{
    AddressScope, AdvanceOutcome, CheckoutConfirmation, CheckoutOrchestrator, CheckoutStep,
    FlowError, SubmitOutcome,
};

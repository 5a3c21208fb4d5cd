//! Jacaranda Core - Shared types library.
//!
//! This crate provides common types used across all Jacaranda components:
//! - `checkout` - Checkout workflow engine
//! - `integration-tests` - End-to-end checkout scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, phones,
//!   postal codes, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

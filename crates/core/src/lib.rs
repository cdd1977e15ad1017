//! Saffron Lane Core - Shared types library.
//!
//! This crate provides common types used across all Saffron Lane components:
//! - `storefront` - JSON API service consumed by the web storefront
//! - `integration-tests` - Cross-crate test flows
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no store access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money and amount derivation, order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

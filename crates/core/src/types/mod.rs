//! Core types for Saffron Lane.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{CurrencyCode, LinePrice, OrderAmount, PricingPolicy, ShippingPolicy};
pub use status::{IllegalTransition, OrderStatus};

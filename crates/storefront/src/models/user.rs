//! User domain types.
//!
//! A user document carries three sub-document collections (addresses,
//! wishlist, order references) persisted as serialized text fields - see
//! [`crate::subdoc`]. These types only ever hold the decoded form; field
//! names on the wire and inside the blobs are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saffron_lane_core::{AddressId, OrderId, ProductId, UserId};

/// A user record with its sub-document collections decoded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Store-minted document id.
    pub id: UserId,
    /// Saved shipping addresses.
    pub addresses: Vec<Address>,
    /// Wishlisted products, insertion order preserved for display.
    pub wishlist: Vec<ProductId>,
    /// References to orders this user placed.
    pub order_refs: Vec<OrderId>,
    /// Rewritten by the store on every mutation.
    pub updated_at: DateTime<Utc>,
}

/// A shipping address owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique within the owning user's list; generated at creation, never reused.
    pub id: AddressId,
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    /// At most one address per user carries this flag (see `subdoc::addresses`).
    #[serde(default)]
    pub is_default: bool,
    /// Set once at insertion, never mutated.
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing an address.
///
/// No cross-field validation beyond presence; `id` and `created_at` are
/// never caller-supplied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

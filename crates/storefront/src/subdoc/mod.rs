//! Sub-document collections stored as serialized text fields.
//!
//! The backing store cannot hold nested arrays of objects in these schemas,
//! so a user's addresses, wishlist and order references live inside single
//! text fields on the parent user document. This module owns that encoding:
//! callers operate on decoded types only and never see the blob.
//!
//! The field representation changed over the product's history - early
//! records hold a native JSON array, later ones hold a JSON text encoding of
//! the same array - and both forms must stay readable indefinitely, so the
//! decoder is tolerant (see [`decode_list`]).
//!
//! # Concurrency
//!
//! Mutations follow a read-modify-write cycle against the parent document
//! with no optimistic-concurrency guard: two concurrent writers to the same
//! user's collections can lose one another's update. The window is accepted
//! at this contention level (one user editing their own data). A
//! compare-and-set on the document revision, or a per-user writer queue,
//! would close it if contention ever grows.

pub mod addresses;
pub mod order_refs;
pub mod wishlist;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a sub-document collection from whatever the field holds.
///
/// Accepts a native JSON array (legacy representation), a JSON text encoding
/// of an array (current representation), `null`, or a missing field. Any
/// unparseable input degrades to an empty collection - the caller never
/// handles a decode failure - but the failure is not silent: a warning is
/// emitted so dropped data shows up in the logs.
#[must_use]
pub fn decode_list<T: DeserializeOwned>(field: &str, raw: Option<&Value>) -> Vec<T> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            match serde_json::from_value(Value::Array(items.clone())) {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!(field, error = %err, "discarding undecodable sub-document array");
                    Vec::new()
                }
            }
        }
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Vec::new();
            }
            match serde_json::from_str(text) {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!(field, error = %err, "discarding undecodable sub-document blob");
                    Vec::new()
                }
            }
        }
        Some(_) => {
            tracing::warn!(field, "unexpected sub-document representation");
            Vec::new()
        }
    }
}

/// Encode a sub-document collection into the current representation.
///
/// # Errors
///
/// Returns a `serde_json::Error` if the items cannot be serialized; with
/// the plain data types stored here that indicates a programming error, not
/// bad data.
pub fn encode<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

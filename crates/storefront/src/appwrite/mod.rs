//! Appwrite document store client.
//!
//! # Architecture
//!
//! - Appwrite is the source of truth - NO local database, direct REST calls
//! - All access goes through one [`DocumentStore`] interface, constructed
//!   once and injected into repositories (no shared mutable singleton)
//! - Read-mostly catalog collections are cached in memory via `moka`
//!   (5 minute TTL); the cache is informational only, never part of
//!   correctness
//!
//! # Example
//!
//! ```rust,ignore
//! use saffron_lane_storefront::appwrite::{AppwriteClient, DocumentStore};
//!
//! let client = AppwriteClient::new(&config.appwrite);
//!
//! // Fetch a user document
//! let doc = client.get_document("users", "64f1c2d9a7b3").await?;
//! let addresses = doc.field("addresses");
//! ```

mod documents;
#[cfg(any(test, feature = "memory-store"))]
mod memory;

pub use documents::{AppwriteClient, Document, DocumentList, DocumentStore, Query};
#[cfg(any(test, feature = "memory-store"))]
pub use memory::InMemoryStore;

use thiserror::Error;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum AppwriteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the lookup targeted.
        collection: String,
        /// Document id that was not found.
        id: String,
    },

    /// The store rejected the request.
    #[error("store error ({status} {kind}): {message}")]
    Api {
        /// HTTP status returned by the store.
        status: u16,
        /// Appwrite error type string (e.g., `document_invalid_structure`).
        kind: String,
        /// Human-readable message from the store.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

//! Repositories over the document store.
//!
//! Repositories own the mapping between domain types and stored documents.
//! User sub-document fields go through [`crate::subdoc`] (tolerant decode);
//! first-class blob fields on orders decode strictly and surface corruption
//! instead of papering over it.

pub mod orders;
pub mod users;

pub use orders::{OrderDraft, OrderRepository};
pub use users::UserRepository;

use thiserror::Error;

use saffron_lane_core::IllegalTransition;

use crate::appwrite::AppwriteError;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store call failed.
    #[error("store error: {0}")]
    Store(#[from] AppwriteError),

    /// A stored document held data we could not decode.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The requested document (or child record) does not exist.
    #[error("not found")]
    NotFound,

    /// A status change the transition table forbids.
    #[error(transparent)]
    Transition(#[from] IllegalTransition),

    /// Encoding a field for storage failed.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Map a store error, folding the store's not-found into the repository's.
pub(crate) fn map_store_error(err: AppwriteError) -> RepositoryError {
    match err {
        AppwriteError::NotFound { .. } => RepositoryError::NotFound,
        other => RepositoryError::Store(other),
    }
}

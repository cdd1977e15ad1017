//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`;
//! every error response carries a JSON body of the shape `{"error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::appwrite::AppwriteError;
use crate::db::RepositoryError;
use crate::razorpay::RazorpayError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] AppwriteError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Payment provider operation failed.
    #[error("Payment provider error: {0}")]
    Razorpay(#[from] RazorpayError),

    /// Checkout flow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Missing or invalid required input.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not allowed to perform the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn store_status(err: &AppwriteError) -> StatusCode {
    match err {
        AppwriteError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppwriteError::Http(_) | AppwriteError::Api { .. } | AppwriteError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Store(inner) => store_status(inner),
        RepositoryError::Transition(_) => StatusCode::CONFLICT,
        RepositoryError::DataCorruption(_) | RepositoryError::Encode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn razorpay_status(err: &RazorpayError) -> StatusCode {
    match err {
        RazorpayError::SignatureMismatch | RazorpayError::MalformedSignature(_) => {
            StatusCode::BAD_REQUEST
        }
        RazorpayError::Http(_) | RazorpayError::Api { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => store_status(err),
            Self::Repository(err) => repository_status(err),
            Self::Razorpay(err) => razorpay_status(err),
            Self::Checkout(CheckoutError::Verification(_)) => StatusCode::BAD_REQUEST,
            Self::Checkout(CheckoutError::Recording(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-safe message. Internal details are never exposed.
    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Store(AppwriteError::NotFound { .. })
            | Self::Repository(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Repository(RepositoryError::Transition(err)) => err.to_string(),
            Self::Razorpay(
                RazorpayError::SignatureMismatch | RazorpayError::MalformedSignature(_),
            )
            | Self::Checkout(CheckoutError::Verification(_)) => {
                "Invalid payment signature".to_owned()
            }
            // The provider's own description is actionable for the caller
            // (declined, amount too low, ...) and carries no secrets.
            Self::Razorpay(RazorpayError::Api { description, .. }) => description.clone(),
            Self::Razorpay(RazorpayError::Http(_)) => "Payment provider unavailable".to_owned(),
            Self::Checkout(CheckoutError::Recording(_)) => {
                "Payment verified but the order could not be recorded; please retry".to_owned()
            }
            Self::Store(_) => "Storage service error".to_owned(),
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Signature failures are security-relevant: they may indicate
        // tampering, so they are logged even though the response is a 400.
        if matches!(
            self,
            Self::Razorpay(RazorpayError::SignatureMismatch)
                | Self::Checkout(CheckoutError::Verification(_))
        ) {
            tracing::warn!(error = %self, "payment signature rejected");
        }

        let body = json!({ "error": self.client_message() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order o-123".to_owned());
        assert_eq!(err.to_string(), "Not found: order o-123");

        let err = AppError::Validation("amount is required".to_owned());
        assert_eq!(err.to_string(), "Bad request: amount is required");
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(AppError::Validation("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_signature_mismatch_maps_to_400() {
        assert_eq!(
            status_of(AppError::Razorpay(RazorpayError::SignatureMismatch)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::Verification(
                RazorpayError::SignatureMismatch
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_illegal_transition_maps_to_409() {
        use saffron_lane_core::{IllegalTransition, OrderStatus};
        let err = AppError::Repository(RepositoryError::Transition(IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Shipped,
        }));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_provider_failure_maps_to_5xx() {
        let err = AppError::Razorpay(RazorpayError::Api {
            status: 400,
            code: "BAD_REQUEST_ERROR".to_owned(),
            description: "amount too low".to_owned(),
        });
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_corruption_is_not_exposed() {
        let err = AppError::Repository(RepositoryError::DataCorruption(
            "order o1: unreadable items".to_owned(),
        ));
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        assert_eq!(
            status_of(AppError::Unauthorized("no key".to_owned())),
            StatusCode::UNAUTHORIZED
        );
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use crate::appwrite::AppwriteClient;
use crate::config::{CollectionIds, ServiceConfig};
use crate::razorpay::RazorpayClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the two external-service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServiceConfig,
    appwrite: AppwriteClient,
    razorpay: RazorpayClient,
}

impl AppState {
    /// Create a new application state, constructing both clients once.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let appwrite = AppwriteClient::new(&config.appwrite);
        let razorpay = RazorpayClient::new(&config.razorpay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                appwrite,
                razorpay,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// Get a reference to the document store client.
    #[must_use]
    pub fn appwrite(&self) -> &AppwriteClient {
        &self.inner.appwrite
    }

    /// Get a reference to the payment provider client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Shorthand for the configured collection ids.
    #[must_use]
    pub fn collections(&self) -> &CollectionIds {
        &self.inner.config.appwrite.collections
    }
}

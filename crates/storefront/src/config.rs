//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APPWRITE_ENDPOINT` - Appwrite REST endpoint (e.g., <https://cloud.appwrite.io/v1>)
//! - `APPWRITE_PROJECT_ID` - Appwrite project id
//! - `APPWRITE_API_KEY` - Server API key (high entropy; validated at startup)
//! - `APPWRITE_DATABASE_ID` - Database holding the storefront collections
//! - `RAZORPAY_KEY_ID` - Razorpay public key id (safe to hand to the widget)
//! - `RAZORPAY_KEY_SECRET` - Razorpay key secret (server-side only)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `APPWRITE_USERS_COLLECTION_ID` etc. - Collection ids (default: the collection name)
//! - `CHECKOUT_TAX_RATE` - Tax rate as a decimal fraction (default: 0.18)
//! - `CHECKOUT_SHIPPING_FLAT` - Flat shipping charge (default: 0)
//! - `CHECKOUT_FREE_SHIPPING_OVER` - Subtotal above which shipping is free
//! - `ADMIN_API_KEY` - Key required for order status mutation (disabled if unset)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use saffron_lane_core::{PricingPolicy, ShippingPolicy};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Appwrite document store configuration
    pub appwrite: AppwriteConfig,
    /// Razorpay payment provider configuration
    pub razorpay: RazorpayConfig,
    /// Pricing rules applied when an order is placed
    pub pricing: PricingPolicy,
    /// Key required (as `x-admin-key`) for order status mutation
    pub admin_api_key: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Appwrite REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppwriteConfig {
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    /// Project id sent as `X-Appwrite-Project`
    pub project_id: String,
    /// Server API key sent as `X-Appwrite-Key` (never logged)
    pub api_key: SecretString,
    /// Database holding the storefront collections
    pub database_id: String,
    /// Collection ids, overridable per environment
    pub collections: CollectionIds,
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("collections", &self.collections)
            .finish()
    }
}

/// Collection ids for the storefront database.
///
/// Defaults to the collection names; override per environment when the ids
/// differ (Appwrite lets a collection id diverge from its display name).
#[derive(Debug, Clone)]
pub struct CollectionIds {
    pub users: String,
    pub products: String,
    pub categories: String,
    pub orders: String,
    pub banners: String,
    pub announcements: String,
}

impl CollectionIds {
    /// The read-mostly catalog collections whose reads may be cached.
    #[must_use]
    pub fn cached(&self) -> HashSet<String> {
        [
            &self.products,
            &self.categories,
            &self.banners,
            &self.announcements,
        ]
        .into_iter()
        .cloned()
        .collect()
    }
}

/// Razorpay API credentials.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id; the only credential the checkout widget may see
    pub key_id: String,
    /// Key secret, used for order-create auth and HMAC verification only
    pub key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = var_or("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_owned(), e.to_string()))?;
        let port = var_or("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_owned(), e.to_string()))?;

        let appwrite = AppwriteConfig::from_env()?;
        let razorpay = RazorpayConfig::from_env()?;
        let pricing = pricing_from_env()?;

        let admin_api_key = match optional_var("ADMIN_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "ADMIN_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            host,
            port,
            appwrite,
            razorpay,
            pricing,
            admin_api_key,
            sentry_dsn: optional_var("SENTRY_DSN"),
            sentry_environment: optional_var("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AppwriteConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = required_var("APPWRITE_ENDPOINT")?;
        // Fail at startup on an unusable endpoint rather than on the first request
        Url::parse(&endpoint)
            .map_err(|e| ConfigError::InvalidEnvVar("APPWRITE_ENDPOINT".to_owned(), e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            project_id: required_var("APPWRITE_PROJECT_ID")?,
            api_key: validated_secret("APPWRITE_API_KEY")?,
            database_id: required_var("APPWRITE_DATABASE_ID")?,
            collections: CollectionIds::from_env(),
        })
    }
}

impl CollectionIds {
    fn from_env() -> Self {
        Self {
            users: var_or("APPWRITE_USERS_COLLECTION_ID", "users"),
            products: var_or("APPWRITE_PRODUCTS_COLLECTION_ID", "products"),
            categories: var_or("APPWRITE_CATEGORIES_COLLECTION_ID", "categories"),
            orders: var_or("APPWRITE_ORDERS_COLLECTION_ID", "orders"),
            banners: var_or("APPWRITE_BANNERS_COLLECTION_ID", "banners"),
            announcements: var_or("APPWRITE_ANNOUNCEMENTS_COLLECTION_ID", "announcements"),
        }
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: required_var("RAZORPAY_KEY_ID")?,
            key_secret: validated_secret("RAZORPAY_KEY_SECRET")?,
        })
    }
}

fn pricing_from_env() -> Result<PricingPolicy, ConfigError> {
    let tax_rate = decimal_var("CHECKOUT_TAX_RATE", "0.18")?;
    let flat = decimal_var("CHECKOUT_SHIPPING_FLAT", "0")?;

    let shipping = match optional_var("CHECKOUT_FREE_SHIPPING_OVER") {
        Some(raw) => {
            let threshold = raw.parse::<Decimal>().map_err(|e| {
                ConfigError::InvalidEnvVar("CHECKOUT_FREE_SHIPPING_OVER".to_owned(), e.to_string())
            })?;
            ShippingPolicy::FreeOver {
                threshold,
                rate: flat,
            }
        }
        None => ShippingPolicy::Flat(flat),
    };

    Ok(PricingPolicy { tax_rate, shipping })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn required_var(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get an environment variable parsed as a `Decimal`.
fn decimal_var(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    var_or(key, default)
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Load and validate a secret from the environment.
fn validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = required_var(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_appwrite_config() -> AppwriteConfig {
        AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1".to_owned(),
            project_id: "storefront".to_owned(),
            api_key: SecretString::from("k9Qw3!rT8@zX5#vB1$nM7^cL4&pJ0*dF"),
            database_id: "main".to_owned(),
            collections: CollectionIds::from_env(),
        }
    }

    #[test]
    fn test_shannon_entropy_degenerate_inputs() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        // All same character = 0 entropy
        assert!((shannon_entropy("zzzzzzz") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_symbols() {
        // 50/50 split over two symbols = 1 bit per char
        let entropy = shannon_entropy("abab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_random_looking() {
        assert!(shannon_entropy("k9Qw3!rT8@zX5#vB") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-razorpay-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("k9Qw3!rT8@zX5#vB1$nM7^cL4&pJ0*dF", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServiceConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            appwrite: sample_appwrite_config(),
            razorpay: RazorpayConfig {
                key_id: "rzp_test_k9Qw3rT8zX5vB1nM".to_owned(),
                key_secret: SecretString::from("k9Qw3!rT8@zX5#vB1$nM7^cL4&pJ0*dF"),
            },
            pricing: PricingPolicy::default(),
            admin_api_key: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let appwrite = sample_appwrite_config();
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_k9Qw3rT8zX5vB1nM".to_owned(),
            key_secret: SecretString::from("super_secret_key_value"),
        };

        let appwrite_debug = format!("{appwrite:?}");
        let razorpay_debug = format!("{razorpay:?}");

        assert!(appwrite_debug.contains("cloud.appwrite.io"));
        assert!(appwrite_debug.contains("[REDACTED]"));
        assert!(!appwrite_debug.contains("k9Qw3!rT8"));

        assert!(razorpay_debug.contains("rzp_test_k9Qw3rT8zX5vB1nM"));
        assert!(razorpay_debug.contains("[REDACTED]"));
        assert!(!razorpay_debug.contains("super_secret_key_value"));
    }

    #[test]
    fn test_cached_collections() {
        let ids = CollectionIds::from_env();
        let cached = ids.cached();
        assert!(cached.contains("products"));
        assert!(cached.contains("banners"));
        assert!(!cached.contains("users"));
        assert!(!cached.contains("orders"));
    }
}

//! Razorpay payment provider client.
//!
//! Two server-side responsibilities:
//!
//! - **Order creation**: mint a provider-side order before the client
//!   collects payment. Amounts cross this boundary in integer minor units
//!   (paise); everywhere else the service works in major units.
//! - **Signature verification**: a collected payment is trusted only after
//!   the HMAC-SHA256 of `"{order_id}|{payment_id}"` under the key secret
//!   matches the signature the checkout widget handed back. The comparison
//!   is constant-time via the MAC's own verification.
//!
//! The key secret never leaves this module: it is not logged, not
//! serialized, and the client widget only ever receives the public key id.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.razorpay.com/v1";

/// Errors that can occur when interacting with the payment provider.
#[derive(Debug, Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("provider error ({status} {code}): {description}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error code (e.g., `BAD_REQUEST_ERROR`).
        code: String,
        /// Human-readable description from the provider.
        description: String,
    },

    /// The submitted signature did not match the recomputed one.
    #[error("payment signature mismatch")]
    SignatureMismatch,

    /// The submitted signature was not valid hex.
    #[error("malformed payment signature: {0}")]
    MalformedSignature(#[from] hex::FromHexError),
}

/// Request body for creating a provider order.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Caller-supplied receipt id, echoed back by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// Free-form key/value notes attached to the provider order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Map<String, Value>>,
}

/// A provider-side order, distinct from this system's own orders.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOrder {
    /// Provider order id (`order_...`).
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Receipt id echoed back, when one was supplied.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Provider-side order status (`created`, `attempted`, `paid`).
    #[serde(default)]
    pub status: Option<String>,
}

/// Provider error envelope: `{"error": {"code": ..., "description": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Client for the Razorpay Orders API.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct RazorpayClient {
    inner: Arc<RazorpayClientInner>,
}

struct RazorpayClientInner {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    #[must_use]
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            inner: Arc::new(RazorpayClientInner {
                client: reqwest::Client::new(),
                base_url: API_BASE.to_owned(),
                key_id: config.key_id.clone(),
                key_secret: config.key_secret.clone(),
            }),
        }
    }

    /// The public key id the checkout widget needs. Safe to expose.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.inner.key_id
    }

    /// Create a provider-side order.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::Api` with the provider's message when the
    /// provider rejects the request, or `RazorpayError::Http` on transport
    /// failure. There is no built-in retry.
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<ProviderOrder, RazorpayError> {
        let response = self
            .inner
            .client
            .post(format!("{}/orders", self.inner.base_url))
            .basic_auth(
                &self.inner.key_id,
                Some(self.inner.key_secret.expose_secret()),
            )
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<ApiErrorEnvelope>(&body).ok();
            let (code, description) = parsed.map_or_else(
                || {
                    (
                        "UNKNOWN".to_owned(),
                        body.chars().take(200).collect::<String>(),
                    )
                },
                |e| (e.error.code, e.error.description),
            );
            tracing::error!(status = %status, code = %code, "provider order creation failed");
            return Err(RazorpayError::Api {
                status: status.as_u16(),
                code,
                description,
            });
        }

        Ok(response.json().await?)
    }

    /// Verify a client-collected payment against the server-held secret.
    ///
    /// Recomputes HMAC-SHA256 over `"{order_id}|{payment_id}"` and compares
    /// it with the submitted hex signature in constant time. Only an exact
    /// match authenticates the payment.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::MalformedSignature` when the signature is not
    /// hex, or `RazorpayError::SignatureMismatch` when it does not verify.
    pub fn verify_payment_signature(
        &self,
        provider_order_id: &str,
        provider_payment_id: &str,
        signature: &str,
    ) -> Result<(), RazorpayError> {
        verify_signature(
            self.inner.key_secret.expose_secret().as_bytes(),
            provider_order_id,
            provider_payment_id,
            signature,
        )
    }
}

/// Signature verification core, shared with tests.
fn verify_signature(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
    signature_hex: &str,
) -> Result<(), RazorpayError> {
    let signature = hex::decode(signature_hex)?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&signature)
        .map_err(|_| RazorpayError::SignatureMismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0hV2mJ8qLx4TzR6wCf9yKd3B";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_verifies() {
        let signature = sign("order_abc", "pay_xyz");
        assert!(verify_signature(SECRET, "order_abc", "pay_xyz", &signature).is_ok());
    }

    #[test]
    fn test_single_character_mutation_is_rejected() {
        let signature = sign("order_abc", "pay_xyz");
        let mut chars: Vec<char> = signature.chars().collect();
        let first = chars.first_mut().unwrap();
        *first = if *first == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(
            verify_signature(SECRET, "order_abc", "pay_xyz", &tampered),
            Err(RazorpayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_swapped_ids_are_rejected() {
        let signature = sign("order_abc", "pay_xyz");
        assert!(matches!(
            verify_signature(SECRET, "pay_xyz", "order_abc", &signature),
            Err(RazorpayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let signature = sign("order_abc", "pay_xyz");
        assert!(matches!(
            verify_signature(b"another-secret", "order_abc", "pay_xyz", &signature),
            Err(RazorpayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_non_hex_signature_is_malformed() {
        assert!(matches!(
            verify_signature(SECRET, "order_abc", "pay_xyz", "not hex!"),
            Err(RazorpayError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_create_order_request_omits_empty_optionals() {
        let request = CreateOrderRequest {
            amount: 50_000,
            currency: "INR".to_owned(),
            receipt: None,
            notes: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": 50_000, "currency": "INR"})
        );
    }

    #[test]
    fn test_provider_order_parses_minimal_body() {
        let order: ProviderOrder = serde_json::from_str(
            r#"{"id": "order_abc", "amount": 50000, "currency": "INR"}"#,
        )
        .unwrap();
        assert_eq!(order.id, "order_abc");
        assert_eq!(order.amount, 50_000);
        assert!(order.receipt.is_none());
    }
}

//! Payment provider handshake routes.
//!
//! Two-phase flow: mint a provider order server-side, then verify the
//! signature the client-side checkout hands back before anything trusts the
//! payment. The key secret never appears in a response; the widget only
//! needs the public key id.

use axum::{extract::State, Json};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::razorpay::CreateOrderRequest;
use crate::state::AppState;

/// Body for `POST /api/payment/create`.
///
/// Fields are optional at the serde level so missing input surfaces as the
/// documented `400 {error}` rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    /// Amount in the currency's major unit (rupees).
    pub amount: Option<Decimal>,
    /// ISO 4217 code; defaults to INR.
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<Map<String, Value>>,
}

/// Response for `POST /api/payment/create`: the minimal fields the checkout
/// widget needs.
#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub id: String,
    /// Amount in minor units, as the provider reports it.
    pub amount: i64,
    pub currency: String,
}

/// `POST /api/payment/create` - mint a provider-side order.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentBody>,
) -> Result<Json<CreatePaymentResponse>> {
    let Some(amount) = body.amount else {
        return Err(AppError::Validation("amount is required".to_owned()));
    };
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("amount must be positive".to_owned()));
    }

    let request = CreateOrderRequest {
        amount: to_minor_units(amount)?,
        currency: body.currency.unwrap_or_else(|| "INR".to_owned()),
        receipt: body.receipt,
        notes: body.notes,
    };

    let order = state.razorpay().create_order(&request).await?;

    Ok(Json(CreatePaymentResponse {
        id: order.id,
        amount: order.amount,
        currency: order.currency,
    }))
}

/// Convert a major-unit amount to the provider's integer minor units.
fn to_minor_units(amount: Decimal) -> Result<i64> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Validation("amount out of range".to_owned()))
}

/// Response for `GET /api/payment/key`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentKeyResponse {
    pub key_id: String,
}

/// `GET /api/payment/key` - the public key id the checkout widget needs.
///
/// Only the public id crosses this boundary; the key secret stays
/// server-side.
#[instrument(skip(state))]
pub async fn key(State(state): State<AppState>) -> Json<PaymentKeyResponse> {
    Json(PaymentKeyResponse {
        key_id: state.razorpay().key_id().to_owned(),
    })
}

/// Body for `POST /api/payment/verify`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentBody {
    pub provider_order_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub signature: Option<String>,
}

/// Response for a verified payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub provider_order_id: String,
    pub provider_payment_id: String,
}

/// `POST /api/payment/verify` - authenticate a collected payment.
///
/// Missing parameters are rejected before any cryptography runs. A mismatch
/// is a security-relevant rejection: no order is created here or later.
#[instrument(skip(state, body))]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyPaymentBody>,
) -> Result<Json<VerifyPaymentResponse>> {
    let (Some(provider_order_id), Some(provider_payment_id), Some(signature)) = (
        body.provider_order_id,
        body.provider_payment_id,
        body.signature,
    ) else {
        return Err(AppError::Validation(
            "providerOrderId, providerPaymentId and signature are required".to_owned(),
        ));
    };

    state
        .razorpay()
        .verify_payment_signature(&provider_order_id, &provider_payment_id, &signature)?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        provider_order_id,
        provider_payment_id,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::from(500)).unwrap(), 50_000);
        assert_eq!(to_minor_units(Decimal::new(3304, 1)).unwrap(), 33_040);
        assert_eq!(to_minor_units(Decimal::new(1, 2)).unwrap(), 1);
    }

    #[test]
    fn test_create_body_accepts_number_or_string_amount() {
        let body: CreatePaymentBody =
            serde_json::from_str(r#"{"amount": 500, "currency": "INR"}"#).unwrap();
        assert_eq!(body.amount, Some(Decimal::from(500)));

        let body: CreatePaymentBody = serde_json::from_str(r#"{"amount": "330.4"}"#).unwrap();
        assert_eq!(body.amount, Some(Decimal::new(3304, 1)));

        let body: CreatePaymentBody = serde_json::from_str("{}").unwrap();
        assert!(body.amount.is_none());
    }

    #[test]
    fn test_verify_response_wire_names() {
        let response = VerifyPaymentResponse {
            success: true,
            provider_order_id: "order_abc".to_owned(),
            provider_payment_id: "pay_xyz".to_owned(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "providerOrderId": "order_abc",
                "providerPaymentId": "pay_xyz"
            })
        );
    }
}

//! Order routes.
//!
//! Placement re-verifies the payment signature before persisting anything
//! (see [`crate::services::checkout`]); status changes are gated behind the
//! configured admin key and the transition table.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use saffron_lane_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::order::{NewOrder, Order};
use crate::services::checkout::{place_order, OrderCollections};
use crate::state::AppState;

/// Header carrying the admin key for status mutation.
const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// `POST /api/orders` - place an order against a collected payment.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    if body.items.is_empty() {
        return Err(AppError::Validation(
            "order requires at least one item".to_owned(),
        ));
    }

    let collections = OrderCollections {
        users: &state.collections().users,
        orders: &state.collections().orders,
    };
    let order = place_order(
        state.appwrite(),
        state.razorpay(),
        &state.config().pricing,
        collections,
        body,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}` - order detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.appwrite(), &state.collections().orders);
    Ok(Json(repo.get(&OrderId::new(id)).await?))
}

/// Body for `PATCH /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

/// `PATCH /api/orders/{id}/status` - admin-keyed status transition.
///
/// Illegal transitions are rejected with 409; a missing or wrong admin key
/// with 401.
#[instrument(skip(state, headers, body))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Order>> {
    authorize_admin(&state, &headers)?;

    let status = body
        .status
        .ok_or_else(|| AppError::Validation("status is required".to_owned()))?
        .parse::<OrderStatus>()
        .map_err(AppError::Validation)?;

    let repo = OrderRepository::new(state.appwrite(), &state.collections().orders);
    Ok(Json(repo.update_status(&OrderId::new(id), status).await?))
}

fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = &state.config().admin_api_key else {
        return Err(AppError::Unauthorized(
            "status changes are disabled: no admin key configured".to_owned(),
        ));
    };

    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided == expected.expose_secret() {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid admin key".to_owned()))
    }
}

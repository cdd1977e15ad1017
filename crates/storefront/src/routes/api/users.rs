//! User sub-document routes: addresses, wishlist, order history.
//!
//! These are thin shells over [`crate::db::UserRepository`]; every mutation
//! is a read-modify-write of the relevant blob field on the user document.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use saffron_lane_core::{AddressId, ProductId, UserId};

use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::order::Order;
use crate::models::user::{Address, NewAddress, UserRecord};
use crate::state::AppState;

/// `GET /api/users/{id}` - the user record with all sub-collections decoded.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    Ok(Json(repo.get(&UserId::new(id)).await?))
}

/// `GET /api/users/{id}/addresses`
#[instrument(skip(state))]
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    Ok(Json(repo.addresses(&UserId::new(id)).await?))
}

/// `POST /api/users/{id}/addresses`
#[instrument(skip(state, body))]
pub async fn create_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NewAddress>,
) -> Result<(StatusCode, Json<Vec<Address>>)> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo.add_address(&UserId::new(id), body).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// `PUT /api/users/{id}/addresses/{address_id}`
#[instrument(skip(state, body))]
pub async fn update_address(
    State(state): State<AppState>,
    Path((id, address_id)): Path<(String, String)>,
    Json(body): Json<NewAddress>,
) -> Result<Json<Vec<Address>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo
        .update_address(&UserId::new(id), &AddressId::new(address_id), body)
        .await?;
    Ok(Json(list))
}

/// `DELETE /api/users/{id}/addresses/{address_id}`
#[instrument(skip(state))]
pub async fn delete_address(
    State(state): State<AppState>,
    Path((id, address_id)): Path<(String, String)>,
) -> Result<Json<Vec<Address>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo
        .remove_address(&UserId::new(id), &AddressId::new(address_id))
        .await?;
    Ok(Json(list))
}

/// `POST /api/users/{id}/addresses/{address_id}/default`
#[instrument(skip(state))]
pub async fn set_default_address(
    State(state): State<AppState>,
    Path((id, address_id)): Path<(String, String)>,
) -> Result<Json<Vec<Address>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo
        .set_default_address(&UserId::new(id), &AddressId::new(address_id))
        .await?;
    Ok(Json(list))
}

/// `GET /api/users/{id}/wishlist`
#[instrument(skip(state))]
pub async fn wishlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductId>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    Ok(Json(repo.wishlist(&UserId::new(id)).await?))
}

/// Body for `POST /api/users/{id}/wishlist`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistBody {
    pub product_id: Option<String>,
}

/// `POST /api/users/{id}/wishlist` - idempotent add.
#[instrument(skip(state, body))]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddToWishlistBody>,
) -> Result<Json<Vec<ProductId>>> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::Validation("productId is required".to_owned()))?;

    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo
        .add_to_wishlist(&UserId::new(id), ProductId::new(product_id))
        .await?;
    Ok(Json(list))
}

/// `DELETE /api/users/{id}/wishlist/{product_id}` - no-op when absent.
#[instrument(skip(state))]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<Vec<ProductId>>> {
    let repo = UserRepository::new(state.appwrite(), &state.collections().users);
    let list = repo
        .remove_from_wishlist(&UserId::new(id), &ProductId::new(product_id))
        .await?;
    Ok(Json(list))
}

/// `GET /api/users/{id}/orders` - order history, newest first.
#[instrument(skip(state))]
pub async fn orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.appwrite(), &state.collections().orders);
    Ok(Json(repo.list_for_user(&UserId::new(id)).await?))
}

//! Cached catalog reads: products, categories, banners, announcements.
//!
//! Thin passthroughs - documents are returned as stored, and reads go
//! through the client's short-TTL cache. The storefront does not own this
//! data; the admin tooling that writes it lives elsewhere.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::appwrite::{Document, DocumentList, DocumentStore};
use crate::error::Result;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(show_product))
        .route("/categories", get(list_categories))
        .route("/banners", get(list_banners))
        .route("/announcements", get(list_announcements))
}

async fn list_collection(state: &AppState, collection: &str) -> Result<Json<DocumentList>> {
    let list = state.appwrite().list_documents(collection, &[]).await?;
    Ok(Json(list))
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<DocumentList>> {
    list_collection(&state, &state.collections().products).await
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>> {
    let doc = state
        .appwrite()
        .get_document(&state.collections().products, &id)
        .await?;
    Ok(Json(doc))
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<DocumentList>> {
    list_collection(&state, &state.collections().categories).await
}

/// `GET /api/banners`
#[instrument(skip(state))]
pub async fn list_banners(State(state): State<AppState>) -> Result<Json<DocumentList>> {
    list_collection(&state, &state.collections().banners).await
}

/// `GET /api/announcements`
#[instrument(skip(state))]
pub async fn list_announcements(State(state): State<AppState>) -> Result<Json<DocumentList>> {
    list_collection(&state, &state.collections().announcements).await
}

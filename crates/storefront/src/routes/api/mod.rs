//! JSON API routers.

pub mod catalog;
pub mod orders;
pub mod payment;
pub mod users;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/key", get(payment::key))
        .route("/create", post(payment::create))
        .route("/verify", post(payment::verify))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(users::show))
        .route(
            "/{id}/addresses",
            get(users::list_addresses).post(users::create_address),
        )
        .route(
            "/{id}/addresses/{address_id}",
            put(users::update_address).delete(users::delete_address),
        )
        .route(
            "/{id}/addresses/{address_id}/default",
            post(users::set_default_address),
        )
        .route(
            "/{id}/wishlist",
            get(users::wishlist).post(users::add_to_wishlist),
        )
        .route(
            "/{id}/wishlist/{product_id}",
            delete(users::remove_from_wishlist),
        )
        .route("/{id}/orders", get(users::orders))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/payment", payment_routes())
        .nest("/orders", order_routes())
        .nest("/users", user_routes())
        .merge(catalog::routes())
}

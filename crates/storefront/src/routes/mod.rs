//! HTTP route handlers for the storefront service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness check
//! GET  /health/ready                             - Readiness check (pings the store)
//!
//! # Payment (provider handshake)
//! GET  /api/payment/key                          - Public key id for the widget
//! POST /api/payment/create                       - Mint a provider order
//! POST /api/payment/verify                       - Verify a collected payment
//!
//! # Orders
//! POST  /api/orders                              - Place an order (verified payment)
//! GET   /api/orders/{id}                         - Order detail
//! PATCH /api/orders/{id}/status                  - Status transition (admin key)
//!
//! # Users (sub-document collections)
//! GET    /api/users/{id}                         - User record
//! GET    /api/users/{id}/addresses               - Address list
//! POST   /api/users/{id}/addresses               - Add address
//! PUT    /api/users/{id}/addresses/{address_id}  - Edit address
//! DELETE /api/users/{id}/addresses/{address_id}  - Delete address
//! POST   /api/users/{id}/addresses/{address_id}/default - Promote to default
//! GET    /api/users/{id}/wishlist                - Wishlist
//! POST   /api/users/{id}/wishlist                - Add to wishlist
//! DELETE /api/users/{id}/wishlist/{product_id}   - Remove from wishlist
//! GET    /api/users/{id}/orders                  - Order history
//!
//! # Catalog (cached reads)
//! GET /api/products                              - Product listing
//! GET /api/products/{id}                         - Product detail
//! GET /api/categories                            - Category listing
//! GET /api/banners                               - Banner listing
//! GET /api/announcements                         - Announcement listing
//! ```

pub mod api;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the storefront service.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api::routes())
}

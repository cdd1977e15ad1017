//! Pure operations on a user's wishlist.
//!
//! The wishlist is a set of product ids with insertion order preserved for
//! display; there is no per-entry metadata.

use saffron_lane_core::ProductId;

/// Idempotent insert: a product already present is not duplicated.
#[must_use]
pub fn add(mut list: Vec<ProductId>, product_id: ProductId) -> Vec<ProductId> {
    if !list.contains(&product_id) {
        list.push(product_id);
    }
    list
}

/// Remove a product; an absent id is a no-op.
#[must_use]
pub fn remove(mut list: Vec<ProductId>, product_id: &ProductId) -> Vec<ProductId> {
    list.retain(|p| p != product_id);
    list
}

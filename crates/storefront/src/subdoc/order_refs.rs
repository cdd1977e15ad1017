//! Order references carried on the user record.

use saffron_lane_core::OrderId;

/// Append an order reference.
///
/// References are unique by construction (each order is created exactly
/// once), so no de-duplication happens here.
#[must_use]
pub fn append(mut list: Vec<OrderId>, order_id: OrderId) -> Vec<OrderId> {
    list.push(order_id);
    list
}

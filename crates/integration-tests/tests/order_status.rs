//! Order status transitions through the repository.

#![allow(clippy::unwrap_used)]

use saffron_lane_core::{OrderStatus, PricingPolicy};
use saffron_lane_integration_tests::{razorpay_client, signed_order, ORDERS, USERS};
use saffron_lane_storefront::appwrite::InMemoryStore;
use saffron_lane_storefront::db::{OrderRepository, RepositoryError};
use saffron_lane_storefront::services::checkout::{place_order, OrderCollections};

const COLLECTIONS: OrderCollections<'static> = OrderCollections {
    users: USERS,
    orders: ORDERS,
};

async fn placed_order(store: &InMemoryStore) -> saffron_lane_storefront::models::order::Order {
    place_order(
        store,
        &razorpay_client(),
        &PricingPolicy::default(),
        COLLECTIONS,
        signed_order(None, "order_status", "pay_status"),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn happy_path_reaches_delivered() {
    let store = InMemoryStore::new();
    let order = placed_order(&store).await;
    let repo = OrderRepository::new(&store, ORDERS);

    let order = repo
        .update_status(&order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    let order = repo
        .update_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn cancellation_is_terminal() {
    let store = InMemoryStore::new();
    let order = placed_order(&store).await;
    let repo = OrderRepository::new(&store, ORDERS);

    repo.update_status(&order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    for next in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let err = repo.update_status(&order.id, next).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transition(_)));
    }
}

#[tokio::test]
async fn skipping_shipment_is_rejected() {
    let store = InMemoryStore::new();
    let order = placed_order(&store).await;
    let repo = OrderRepository::new(&store, ORDERS);

    let err = repo
        .update_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Transition(_)));

    // The stored status is untouched by the rejected transition.
    let fetched = repo.get(&order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Processing);
}

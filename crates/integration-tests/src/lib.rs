//! Integration tests for Saffron Lane.
//!
//! These run hermetically against the in-memory document store - no
//! external services, no network. Shared fixtures live here; the flows are
//! under `tests/`.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Payment verification and order placement
//! - `subdoc_store` - Address/wishlist sub-document behaviour end to end
//! - `order_status` - Status transition enforcement

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Map;
use sha2::Sha256;

use saffron_lane_core::{ProductId, UserId};
use saffron_lane_storefront::appwrite::{DocumentStore, InMemoryStore};
use saffron_lane_storefront::config::RazorpayConfig;
use saffron_lane_storefront::models::order::{LineItem, NewOrder, PaymentDetails, ShippingAddress};
use saffron_lane_storefront::razorpay::RazorpayClient;

/// Collection ids used throughout the tests.
pub const USERS: &str = "users";
pub const ORDERS: &str = "orders";

/// The key secret the test Razorpay client is built with.
pub const TEST_KEY_SECRET: &str = "0hV2mJ8qLx4TzR6wCf9yKd3B";

/// A Razorpay client holding a fixed test secret.
///
/// Signature verification is pure, so no network is involved.
#[must_use]
pub fn razorpay_client() -> RazorpayClient {
    RazorpayClient::new(&RazorpayConfig {
        key_id: "rzp_test_integration".to_owned(),
        key_secret: SecretString::from(TEST_KEY_SECRET),
    })
}

/// Sign `"{order_id}|{payment_id}"` the way the provider does.
#[must_use]
pub fn sign(order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_KEY_SECRET.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Create an empty user document and return its id.
pub async fn seed_user(store: &InMemoryStore) -> UserId {
    let doc = store
        .create_document(USERS, &Map::new())
        .await
        .expect("seed user");
    UserId::new(doc.id)
}

/// A one-line cart: two kurtas at 100, one dupatta discounted to 80.
#[must_use]
pub fn sample_items() -> Vec<LineItem> {
    vec![
        LineItem {
            product_id: ProductId::new("p-kurta"),
            name: "Block-print kurta".to_owned(),
            unit_price: Decimal::from(100),
            discount_price: None,
            quantity: 2,
            color: "Indigo".to_owned(),
            size: "M".to_owned(),
            image: "https://cdn.example/p-kurta.jpg".to_owned(),
        },
        LineItem {
            product_id: ProductId::new("p-dupatta"),
            name: "Silk dupatta".to_owned(),
            unit_price: Decimal::from(100),
            discount_price: Some(Decimal::from(80)),
            quantity: 1,
            color: "Rust".to_owned(),
            size: "Free".to_owned(),
            image: "https://cdn.example/p-dupatta.jpg".to_owned(),
        },
    ]
}

/// A shipping snapshot for the sample orders.
#[must_use]
pub fn sample_shipping() -> ShippingAddress {
    ShippingAddress {
        full_name: "Meera Pillai".to_owned(),
        address_line1: "14 Lake View Road".to_owned(),
        address_line2: None,
        city: "Kochi".to_owned(),
        state: "Kerala".to_owned(),
        postal_code: "682001".to_owned(),
        country: "India".to_owned(),
        phone: "+91 98470 12345".to_owned(),
    }
}

/// A fully-signed order placement request.
#[must_use]
pub fn signed_order(user_id: Option<UserId>, provider_order_id: &str, payment_id: &str) -> NewOrder {
    NewOrder {
        user_id,
        items: sample_items(),
        shipping_address: sample_shipping(),
        payment: PaymentDetails {
            provider_order_id: provider_order_id.to_owned(),
            provider_payment_id: payment_id.to_owned(),
            signature: sign(provider_order_id, payment_id),
            method: "upi".to_owned(),
        },
        currency: None,
    }
}

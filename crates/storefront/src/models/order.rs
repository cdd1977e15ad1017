//! Order domain types.
//!
//! Orders are first-class documents in the `orders` collection; only their
//! nested collections (`items`, `shippingAddress`, `payment`, `amount`) are
//! blob-encoded fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saffron_lane_core::{CurrencyCode, LinePrice, OrderAmount, OrderId, OrderStatus, ProductId, UserId};

use super::user::Address;

/// One purchased line, captured at checkout prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    pub quantity: u32,
    pub color: String,
    pub size: String,
    pub image: String,
}

impl LineItem {
    /// Reduce to the pricing fields used for amount derivation.
    #[must_use]
    pub fn line_price(&self) -> LinePrice {
        LinePrice {
            unit_price: self.unit_price,
            discount_price: self.discount_price,
            quantity: self.quantity,
        }
    }
}

/// The shipping destination frozen onto an order.
///
/// A denormalized snapshot of an [`Address`], not a reference: editing a
/// saved address later never alters historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Provider-side payment identifiers captured after verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
    /// Payment method reported by the checkout widget (card, upi, ...).
    pub method: String,
}

/// A placed order.
///
/// `amount` is derived once at creation and frozen; orders are never
/// deleted, only their status moves (see [`OrderStatus`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Absent for guest checkouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentDetails,
    pub amount: OrderAmount,
    pub currency: CurrencyCode,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for placing an order against a collected payment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentDetails,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
}

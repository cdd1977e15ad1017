//! Checkout orchestration: verified payment in, recorded order out.
//!
//! Order creation runs only against a verified payment: the submitted
//! signature is re-checked here, immediately before anything is persisted,
//! so a caller cannot skip the verify endpoint and still record an order.
//! Verification is stateless, which also makes a client retry of this flow
//! safe after a transient failure.

use tracing::instrument;

use saffron_lane_core::{OrderAmount, PricingPolicy};

use crate::appwrite::DocumentStore;
use crate::db::orders::{OrderDraft, OrderRepository};
use crate::db::users::UserRepository;
use crate::db::RepositoryError;
use crate::models::order::{LineItem, NewOrder, Order};
use crate::razorpay::{RazorpayClient, RazorpayError};

/// Collection ids involved in placing an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderCollections<'a> {
    pub users: &'a str,
    pub orders: &'a str,
}

/// Errors from the place-order flow.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The payment signature did not verify; nothing was persisted.
    #[error("payment verification failed: {0}")]
    Verification(#[source] RazorpayError),

    /// The order could not be persisted after the payment verified.
    ///
    /// This is the paid-but-unrecorded case: the caller must retry.
    #[error("payment verified but the order could not be recorded: {0}")]
    Recording(#[source] RepositoryError),
}

/// Place an order for a collected payment.
///
/// Steps, treated as one logical transaction:
///
/// 1. re-verify the payment signature (stateless, constant-time);
/// 2. derive the frozen amount breakdown from the submitted items;
/// 3. persist the order with `Processing` status;
/// 4. append the order reference to the user record, when a user is present.
///
/// A persistence failure after step 1 succeeds is logged at error level and
/// captured before it surfaces - a paid-but-unrecorded order must never
/// disappear into a dropped error. A failure at step 4 does not fail the
/// order: the document exists and remains queryable by user id; the
/// dangling reference is logged instead.
///
/// # Errors
///
/// Returns [`CheckoutError::Verification`] on a bad signature (no side
/// effects), or [`CheckoutError::Recording`] when persistence fails after
/// verification.
#[instrument(
    skip_all,
    fields(provider_order_id = %order.payment.provider_order_id)
)]
pub async fn place_order<S: DocumentStore>(
    store: &S,
    razorpay: &RazorpayClient,
    policy: &PricingPolicy,
    collections: OrderCollections<'_>,
    order: NewOrder,
) -> Result<Order, CheckoutError> {
    razorpay
        .verify_payment_signature(
            &order.payment.provider_order_id,
            &order.payment.provider_payment_id,
            &order.payment.signature,
        )
        .map_err(|err| {
            tracing::warn!(error = %err, "rejected order placement: payment did not verify");
            CheckoutError::Verification(err)
        })?;

    let amount = OrderAmount::derive(order.items.iter().map(LineItem::line_price), policy);
    let draft = OrderDraft {
        user_id: order.user_id,
        items: order.items,
        shipping_address: order.shipping_address,
        payment: order.payment,
        amount,
        currency: order.currency.unwrap_or_default(),
    };

    let orders = OrderRepository::new(store, collections.orders);
    let placed = match orders.create(&draft).await {
        Ok(placed) => placed,
        Err(err) => {
            tracing::error!(
                error = %err,
                provider_payment_id = %draft.payment.provider_payment_id,
                "verified payment has no recorded order"
            );
            sentry::capture_error(&err);
            return Err(CheckoutError::Recording(err));
        }
    };

    if let Some(user_id) = &placed.user_id {
        let users = UserRepository::new(store, collections.users);
        if let Err(err) = users.append_order_ref(user_id, placed.id.clone()).await {
            tracing::error!(
                error = %err,
                order_id = %placed.id,
                "order recorded but the user's order reference was not"
            );
        }
    }

    Ok(placed)
}

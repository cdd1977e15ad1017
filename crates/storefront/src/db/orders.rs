//! Order repository for the `orders` collection.
//!
//! Orders are first-class documents; their nested collections (`items`,
//! `shippingAddress`, `payment`, `amount`) are blob-encoded fields. Unlike
//! the user sub-collections, these decode strictly: an order we cannot read
//! back is corruption and must surface, not degrade to an empty value.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::instrument;

use saffron_lane_core::{CurrencyCode, OrderAmount, OrderId, OrderStatus, UserId};

use super::{map_store_error, RepositoryError};
use crate::appwrite::{Document, DocumentStore, Query};
use crate::models::order::{LineItem, Order, PaymentDetails, ShippingAddress};

const FIELD_USER_ID: &str = "userId";
const FIELD_ITEMS: &str = "items";
const FIELD_SHIPPING_ADDRESS: &str = "shippingAddress";
const FIELD_PAYMENT: &str = "payment";
const FIELD_AMOUNT: &str = "amount";
const FIELD_CURRENCY: &str = "currency";
const FIELD_STATUS: &str = "status";

/// The fields persisted for a new order.
///
/// Assembled by the checkout service after payment verification; the
/// amount is already derived and will never be recomputed.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentDetails,
    pub amount: OrderAmount,
    pub currency: CurrencyCode,
}

/// Repository for order documents.
pub struct OrderRepository<'a, S> {
    store: &'a S,
    collection: &'a str,
}

impl<'a, S: DocumentStore> OrderRepository<'a, S> {
    /// Create a new order repository over the given store and collection id.
    #[must_use]
    pub const fn new(store: &'a S, collection: &'a str) -> Self {
        Self { store, collection }
    }

    /// Persist a new order with `Processing` status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Encode` if a blob field cannot be encoded,
    /// or `RepositoryError::Store` if the store rejects the write.
    #[instrument(skip(self, draft), fields(provider_order_id = %draft.payment.provider_order_id))]
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut data = Map::new();
        if let Some(user_id) = &draft.user_id {
            data.insert(
                FIELD_USER_ID.to_owned(),
                Value::String(user_id.as_str().to_owned()),
            );
        }
        data.insert(
            FIELD_ITEMS.to_owned(),
            Value::String(serde_json::to_string(&draft.items)?),
        );
        data.insert(
            FIELD_SHIPPING_ADDRESS.to_owned(),
            Value::String(serde_json::to_string(&draft.shipping_address)?),
        );
        data.insert(
            FIELD_PAYMENT.to_owned(),
            Value::String(serde_json::to_string(&draft.payment)?),
        );
        data.insert(
            FIELD_AMOUNT.to_owned(),
            Value::String(serde_json::to_string(&draft.amount)?),
        );
        data.insert(
            FIELD_CURRENCY.to_owned(),
            Value::String(draft.currency.as_str().to_owned()),
        );
        data.insert(
            FIELD_STATUS.to_owned(),
            Value::String(OrderStatus::Processing.to_string()),
        );

        let doc = self
            .store
            .create_document(self.collection, &data)
            .await
            .map_err(map_store_error)?;
        Self::from_document(&doc)
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist, or
    /// `RepositoryError::DataCorruption` if its stored fields are unreadable.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let doc = self
            .store
            .get_document(self.collection, id.as_str())
            .await
            .map_err(map_store_error)?;
        Self::from_document(&doc)
    }

    /// Orders placed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if any stored order is
    /// unreadable.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let list = self
            .store
            .list_documents(
                self.collection,
                &[
                    Query::Equal(FIELD_USER_ID.to_owned(), user_id.as_str().to_owned()),
                    Query::OrderDesc("$createdAt".to_owned()),
                ],
            )
            .await
            .map_err(map_store_error)?;

        list.documents.iter().map(Self::from_document).collect()
    }

    /// Apply a status change, enforcing the transition table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Transition` when the table forbids the
    /// move, and `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id, next = %next))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let current = self.get(id).await?;
        let next = current.status.transition_to(next)?;

        let mut data = Map::new();
        data.insert(FIELD_STATUS.to_owned(), Value::String(next.to_string()));

        let doc = self
            .store
            .update_document(self.collection, id.as_str(), &data)
            .await
            .map_err(map_store_error)?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &Document) -> Result<Order, RepositoryError> {
        let status = string_field(doc, FIELD_STATUS)?
            .parse::<OrderStatus>()
            .map_err(|err| corruption(doc, FIELD_STATUS, &err))?;
        let currency = string_field(doc, FIELD_CURRENCY)?
            .parse::<CurrencyCode>()
            .map_err(|err| corruption(doc, FIELD_CURRENCY, &err))?;
        let user_id = doc
            .field(FIELD_USER_ID)
            .and_then(Value::as_str)
            .map(UserId::from);

        Ok(Order {
            id: OrderId::new(doc.id.clone()),
            user_id,
            items: decode_blob(doc, FIELD_ITEMS)?,
            shipping_address: decode_blob(doc, FIELD_SHIPPING_ADDRESS)?,
            payment: decode_blob(doc, FIELD_PAYMENT)?,
            amount: decode_blob(doc, FIELD_AMOUNT)?,
            currency,
            status,
            created_at: doc.created_at,
        })
    }
}

fn corruption(doc: &Document, field: &str, err: &impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("order {}: unreadable {field}: {err}", doc.id))
}

fn string_field<'d>(doc: &'d Document, field: &str) -> Result<&'d str, RepositoryError> {
    doc.field(field).and_then(Value::as_str).ok_or_else(|| {
        RepositoryError::DataCorruption(format!("order {}: missing {field}", doc.id))
    })
}

/// Strictly decode a blob-encoded field. Both the text encoding and the
/// native form are accepted; anything unreadable is corruption.
fn decode_blob<T: DeserializeOwned>(doc: &Document, field: &str) -> Result<T, RepositoryError> {
    let value = doc.field(field).ok_or_else(|| {
        RepositoryError::DataCorruption(format!("order {}: missing {field}", doc.id))
    })?;

    match value {
        Value::String(text) => serde_json::from_str(text),
        other => serde_json::from_value(other.clone()),
    }
    .map_err(|err| corruption(doc, field, &err))
}

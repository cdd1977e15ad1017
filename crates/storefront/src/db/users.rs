//! User repository: sub-document mutations on the `users` collection.
//!
//! Every mutation here is a read-modify-write: fetch the parent document,
//! transform the decoded collection with the pure [`crate::subdoc`]
//! operations, re-encode, write the whole field back. There is no
//! concurrency guard on the cycle - see the `subdoc` module docs for the
//! trade-off.

use serde_json::{Map, Value};
use tracing::instrument;

use saffron_lane_core::{AddressId, OrderId, ProductId, UserId};

use super::{map_store_error, RepositoryError};
use crate::appwrite::{Document, DocumentStore};
use crate::models::user::{Address, NewAddress, UserRecord};
use crate::subdoc::{self, addresses, order_refs, wishlist};

/// Field names on the `users` document holding encoded sub-collections.
const FIELD_ADDRESSES: &str = "addresses";
const FIELD_WISHLIST: &str = "wishlist";
const FIELD_ORDER_REFS: &str = "orders";

/// Repository for user documents and their sub-document collections.
pub struct UserRepository<'a, S> {
    store: &'a S,
    collection: &'a str,
}

impl<'a, S: DocumentStore> UserRepository<'a, S> {
    /// Create a new user repository over the given store and collection id.
    #[must_use]
    pub const fn new(store: &'a S, collection: &'a str) -> Self {
        Self { store, collection }
    }

    async fn fetch(&self, id: &UserId) -> Result<Document, RepositoryError> {
        self.store
            .get_document(self.collection, id.as_str())
            .await
            .map_err(map_store_error)
    }

    async fn write_field(
        &self,
        id: &UserId,
        field: &str,
        encoded: String,
    ) -> Result<(), RepositoryError> {
        let mut data = Map::new();
        data.insert(field.to_owned(), Value::String(encoded));
        self.store
            .update_document(self.collection, id.as_str(), &data)
            .await
            .map_err(map_store_error)?;
        Ok(())
    }

    /// Fetch a user with all sub-collections decoded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: &UserId) -> Result<UserRecord, RepositoryError> {
        let doc = self.fetch(id).await?;
        Ok(UserRecord {
            id: UserId::new(doc.id.clone()),
            addresses: subdoc::decode_list(FIELD_ADDRESSES, doc.field(FIELD_ADDRESSES)),
            wishlist: subdoc::decode_list(FIELD_WISHLIST, doc.field(FIELD_WISHLIST)),
            order_refs: subdoc::decode_list(FIELD_ORDER_REFS, doc.field(FIELD_ORDER_REFS)),
            updated_at: doc.updated_at,
        })
    }

    /// The user's current address list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn addresses(&self, id: &UserId) -> Result<Vec<Address>, RepositoryError> {
        let doc = self.fetch(id).await?;
        Ok(subdoc::decode_list(
            FIELD_ADDRESSES,
            doc.field(FIELD_ADDRESSES),
        ))
    }

    /// Append a new address and persist the updated list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self, new), fields(user_id = %id))]
    pub async fn add_address(
        &self,
        id: &UserId,
        new: NewAddress,
    ) -> Result<Vec<Address>, RepositoryError> {
        let current = self.addresses(id).await?;
        let updated = addresses::add(current, new);
        self.write_field(id, FIELD_ADDRESSES, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Edit an existing address in place and persist the updated list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or the address does
    /// not exist.
    #[instrument(skip(self, new), fields(user_id = %id, address_id = %address_id))]
    pub async fn update_address(
        &self,
        id: &UserId,
        address_id: &AddressId,
        new: NewAddress,
    ) -> Result<Vec<Address>, RepositoryError> {
        let current = self.addresses(id).await?;
        let updated =
            addresses::update(current, address_id, new).ok_or(RepositoryError::NotFound)?;
        self.write_field(id, FIELD_ADDRESSES, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Delete an address and persist the updated list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id, address_id = %address_id))]
    pub async fn remove_address(
        &self,
        id: &UserId,
        address_id: &AddressId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let current = self.addresses(id).await?;
        let updated = addresses::remove(current, address_id);
        self.write_field(id, FIELD_ADDRESSES, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Promote an address to default and persist the updated list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or the address does
    /// not exist.
    #[instrument(skip(self), fields(user_id = %id, address_id = %address_id))]
    pub async fn set_default_address(
        &self,
        id: &UserId,
        address_id: &AddressId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let current = self.addresses(id).await?;
        let updated =
            addresses::set_default(current, address_id).ok_or(RepositoryError::NotFound)?;
        self.write_field(id, FIELD_ADDRESSES, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// The user's current wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn wishlist(&self, id: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let doc = self.fetch(id).await?;
        Ok(subdoc::decode_list(
            FIELD_WISHLIST,
            doc.field(FIELD_WISHLIST),
        ))
    }

    /// Add a product to the wishlist (idempotent) and persist it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id, product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        id: &UserId,
        product_id: ProductId,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let current = self.wishlist(id).await?;
        let updated = wishlist::add(current, product_id);
        self.write_field(id, FIELD_WISHLIST, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Remove a product from the wishlist (no-op when absent) and persist it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id, product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let current = self.wishlist(id).await?;
        let updated = wishlist::remove(current, product_id);
        self.write_field(id, FIELD_WISHLIST, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }

    /// Append an order reference to the user record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id, order_id = %order_id))]
    pub async fn append_order_ref(
        &self,
        id: &UserId,
        order_id: OrderId,
    ) -> Result<Vec<OrderId>, RepositoryError> {
        let doc = self.fetch(id).await?;
        let current = subdoc::decode_list(FIELD_ORDER_REFS, doc.field(FIELD_ORDER_REFS));
        let updated = order_refs::append(current, order_id);
        self.write_field(id, FIELD_ORDER_REFS, subdoc::encode(&updated)?)
            .await?;
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::appwrite::InMemoryStore;
    use serde_json::json;

    const USERS: &str = "users";

    async fn seed_user(store: &InMemoryStore) -> UserId {
        let doc = store
            .create_document(USERS, &Map::new())
            .await
            .expect("seed user");
        UserId::new(doc.id)
    }

    fn new_address(name: &str, is_default: bool) -> NewAddress {
        NewAddress {
            full_name: name.to_owned(),
            address_line1: "14 Lake View Road".to_owned(),
            address_line2: None,
            city: "Kochi".to_owned(),
            state: "Kerala".to_owned(),
            postal_code: "682001".to_owned(),
            country: "India".to_owned(),
            phone: "+91 98470 12345".to_owned(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_address_roundtrip_through_blob() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        let added = repo
            .add_address(&user_id, new_address("Meera", false))
            .await
            .unwrap();
        assert_eq!(added.len(), 1);

        // The stored field is a JSON text blob, not a native array.
        let doc = store.get_document(USERS, user_id.as_str()).await.unwrap();
        assert!(matches!(doc.field(FIELD_ADDRESSES), Some(Value::String(_))));

        // And it decodes back to the same list.
        let fetched = repo.addresses(&user_id).await.unwrap();
        assert_eq!(fetched, added);
    }

    #[tokio::test]
    async fn test_legacy_native_array_field_is_readable() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        // Write the legacy representation directly.
        let mut data = Map::new();
        data.insert(
            FIELD_WISHLIST.to_owned(),
            json!(["p1", "p2"]),
        );
        store
            .update_document(USERS, user_id.as_str(), &data)
            .await
            .unwrap();

        let list = repo.wishlist(&user_id).await.unwrap();
        assert_eq!(list, vec![ProductId::new("p1"), ProductId::new("p2")]);
    }

    #[tokio::test]
    async fn test_corrupt_blob_degrades_to_empty() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        let mut data = Map::new();
        data.insert(
            FIELD_ADDRESSES.to_owned(),
            Value::String("{\"not\": \"a list".to_owned()),
        );
        store
            .update_document(USERS, user_id.as_str(), &data)
            .await
            .unwrap();

        assert!(repo.addresses(&user_id).await.unwrap().is_empty());

        // A subsequent add starts over from the empty list rather than failing.
        let added = repo
            .add_address(&user_id, new_address("Meera", false))
            .await
            .unwrap();
        assert_eq!(added.len(), 1);
    }

    #[tokio::test]
    async fn test_default_invariant_via_repository() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        repo.add_address(&user_id, new_address("Meera", true))
            .await
            .unwrap();
        repo.add_address(&user_id, new_address("Arjun", false))
            .await
            .unwrap();
        let list = repo
            .add_address(&user_id, new_address("Devi", true))
            .await
            .unwrap();

        assert_eq!(list.iter().filter(|a| a.is_default).count(), 1);
        assert!(list.last().unwrap().is_default);

        let second_id = list.get(1).unwrap().id.clone();
        let list = repo
            .set_default_address(&user_id, &second_id)
            .await
            .unwrap();
        assert_eq!(list.iter().filter(|a| a.is_default).count(), 1);
        assert!(list.get(1).unwrap().is_default);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store, USERS);

        let err = repo.addresses(&UserId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_unknown_address_is_not_found() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        let err = repo
            .set_default_address(&user_id, &AddressId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_wishlist_set_semantics() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        repo.add_to_wishlist(&user_id, ProductId::new("p1"))
            .await
            .unwrap();
        let list = repo
            .add_to_wishlist(&user_id, ProductId::new("p1"))
            .await
            .unwrap();
        assert_eq!(list, vec![ProductId::new("p1")]);

        let list = repo
            .remove_from_wishlist(&user_id, &ProductId::new("p9"))
            .await
            .unwrap();
        assert_eq!(list, vec![ProductId::new("p1")]);
    }

    #[tokio::test]
    async fn test_order_refs_accumulate() {
        let store = InMemoryStore::new();
        let user_id = seed_user(&store).await;
        let repo = UserRepository::new(&store, USERS);

        repo.append_order_ref(&user_id, OrderId::new("o1"))
            .await
            .unwrap();
        let refs = repo
            .append_order_ref(&user_id, OrderId::new("o2"))
            .await
            .unwrap();
        assert_eq!(refs, vec![OrderId::new("o1"), OrderId::new("o2")]);

        let record = repo.get(&user_id).await.unwrap();
        assert_eq!(record.order_refs.len(), 2);
    }
}

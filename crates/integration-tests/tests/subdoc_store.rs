//! Sub-document behaviour end to end: blobs on the user document, decoded
//! collections at the API surface.

#![allow(clippy::unwrap_used)]

use serde_json::{json, Map, Value};

use saffron_lane_core::ProductId;
use saffron_lane_integration_tests::{seed_user, USERS};
use saffron_lane_storefront::appwrite::{DocumentStore, InMemoryStore};
use saffron_lane_storefront::db::UserRepository;
use saffron_lane_storefront::models::user::NewAddress;

fn address(name: &str, is_default: bool) -> NewAddress {
    NewAddress {
        full_name: name.to_owned(),
        address_line1: "2 Temple Street".to_owned(),
        address_line2: Some("Flat 4B".to_owned()),
        city: "Madurai".to_owned(),
        state: "Tamil Nadu".to_owned(),
        postal_code: "625001".to_owned(),
        country: "India".to_owned(),
        phone: "+91 98400 98400".to_owned(),
        is_default,
    }
}

#[tokio::test]
async fn address_lifecycle_keeps_exactly_one_default() {
    let store = InMemoryStore::new();
    let user_id = seed_user(&store).await;
    let repo = UserRepository::new(&store, USERS);

    // First address defaults even when not asked to.
    let list = repo.add_address(&user_id, address("Meera", false)).await.unwrap();
    assert!(list.first().unwrap().is_default);

    // A later default add demotes it.
    let list = repo.add_address(&user_id, address("Arjun", true)).await.unwrap();
    assert_eq!(list.iter().filter(|a| a.is_default).count(), 1);
    assert!(list.last().unwrap().is_default);

    // Deleting the default promotes the survivor.
    let default_id = list.last().unwrap().id.clone();
    let list = repo.remove_address(&user_id, &default_id).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(list.first().unwrap().is_default);
}

#[tokio::test]
async fn mixed_generation_user_record_is_readable() {
    let store = InMemoryStore::new();
    let user_id = seed_user(&store).await;

    // A record as the migration left it: one field in the legacy native
    // representation, one in the current text encoding, one null.
    let mut data = Map::new();
    data.insert("wishlist".to_owned(), json!(["p1", "p2"]));
    data.insert("orders".to_owned(), Value::String(r#"["o1"]"#.to_owned()));
    data.insert("addresses".to_owned(), Value::Null);
    store
        .update_document(USERS, user_id.as_str(), &data)
        .await
        .unwrap();

    let repo = UserRepository::new(&store, USERS);
    let record = repo.get(&user_id).await.unwrap();

    assert_eq!(record.wishlist.len(), 2);
    assert_eq!(record.order_refs.len(), 1);
    assert!(record.addresses.is_empty());
}

#[tokio::test]
async fn corrupt_blob_degrades_without_blocking_mutation() {
    let store = InMemoryStore::new();
    let user_id = seed_user(&store).await;

    let mut data = Map::new();
    data.insert(
        "wishlist".to_owned(),
        Value::String("[[[ not json".to_owned()),
    );
    store
        .update_document(USERS, user_id.as_str(), &data)
        .await
        .unwrap();

    let repo = UserRepository::new(&store, USERS);
    assert!(repo.wishlist(&user_id).await.unwrap().is_empty());

    // The next write replaces the corrupt blob with a clean encoding.
    let list = repo
        .add_to_wishlist(&user_id, ProductId::new("p1"))
        .await
        .unwrap();
    assert_eq!(list, vec![ProductId::new("p1")]);

    let doc = store.get_document(USERS, user_id.as_str()).await.unwrap();
    assert_eq!(
        doc.field("wishlist"),
        Some(&Value::String(r#"["p1"]"#.to_owned()))
    );
}

#[tokio::test]
async fn wishlist_is_a_set_across_requests() {
    let store = InMemoryStore::new();
    let user_id = seed_user(&store).await;
    let repo = UserRepository::new(&store, USERS);

    for _ in 0..3 {
        repo.add_to_wishlist(&user_id, ProductId::new("p1"))
            .await
            .unwrap();
    }
    repo.add_to_wishlist(&user_id, ProductId::new("p2"))
        .await
        .unwrap();

    let list = repo.wishlist(&user_id).await.unwrap();
    assert_eq!(list, vec![ProductId::new("p1"), ProductId::new("p2")]);
}

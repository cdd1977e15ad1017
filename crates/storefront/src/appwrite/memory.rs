//! In-process [`DocumentStore`] used by tests.
//!
//! Implements the same contract as the REST client against a `HashMap`, so
//! repository and checkout flows can run hermetically. Only the query
//! operators the service actually uses are supported.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::documents::{Document, DocumentList, DocumentStore, Query};
use super::AppwriteError;

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredDocument {
    fn to_document(&self, id: &str) -> Document {
        Document {
            id: id.to_owned(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields: self.fields.clone(),
        }
    }
}

/// An in-memory document store.
///
/// Cloneable; clones share the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<HashMap<String, HashMap<String, StoredDocument>>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<String, StoredDocument>>> {
        self.collections.lock().expect("store mutex poisoned")
    }

    fn not_found(collection: &str, id: &str) -> AppwriteError {
        AppwriteError::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }
}

impl DocumentStore for InMemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError> {
        self.lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| doc.to_document(id))
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn create_document(
        &self,
        collection: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let stored = StoredDocument {
            fields: data.clone(),
            created_at: now,
            updated_at: now,
        };
        let doc = stored.to_document(&id);
        self.lock()
            .entry(collection.to_owned())
            .or_default()
            .insert(id, stored);
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let mut collections = self.lock();
        let stored = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;

        for (key, value) in data {
            stored.fields.insert(key.clone(), value.clone());
        }
        stored.updated_at = Utc::now();
        Ok(stored.to_document(id))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError> {
        self.lock()
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError> {
        let collections = self.lock();
        let mut matches: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| {
                        queries.iter().all(|query| match query {
                            Query::Equal(attribute, value) => doc
                                .fields
                                .get(attribute)
                                .is_some_and(|v| v == &Value::String(value.clone())),
                            Query::Limit(_) | Query::OrderDesc(_) => true,
                        })
                    })
                    .map(|(id, doc)| doc.to_document(id))
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        for query in queries {
            if let Query::OrderDesc(attribute) = query {
                if attribute == "$createdAt" {
                    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                } else {
                    matches.sort_by(|a, b| {
                        let left = b.fields.get(attribute).map(Value::to_string);
                        let right = a.fields.get(attribute).map(Value::to_string);
                        left.cmp(&right)
                    });
                }
            }
        }

        let total = matches.len() as u64;
        for query in queries {
            if let Query::Limit(limit) = query {
                matches.truncate(*limit as usize);
            }
        }

        Ok(DocumentList {
            total,
            documents: matches,
        })
    }
}

//! The [`DocumentStore`] interface and its REST implementation.
//!
//! The trait is the single data-access seam of the service: repositories
//! and services depend on it, production wires in [`AppwriteClient`], and
//! tests wire in the in-memory implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::AppwriteError;
use crate::config::AppwriteConfig;

/// A document returned by the store.
///
/// System fields are `$`-prefixed on the wire; everything else lands in
/// [`Document::fields`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Server-minted document id.
    #[serde(rename = "$id")]
    pub id: String,
    /// Creation timestamp, set by the store.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp, rewritten by the store on every mutation.
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// The document's data fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Look up a data field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A page of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList {
    /// Total number of documents matching the query.
    pub total: u64,
    /// The returned page.
    pub documents: Vec<Document>,
}

/// The subset of the store's query language this service uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `field == value`
    Equal(String, String),
    /// Maximum number of documents returned.
    Limit(u32),
    /// Order by a field, newest first.
    OrderDesc(String),
}

impl Query {
    /// Render to the store's JSON query encoding.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Equal(attribute, value) => serde_json::json!({
                "method": "equal",
                "attribute": attribute,
                "values": [value],
            })
            .to_string(),
            Self::Limit(limit) => serde_json::json!({
                "method": "limit",
                "values": [limit],
            })
            .to_string(),
            Self::OrderDesc(attribute) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attribute,
            })
            .to_string(),
        }
    }
}

/// The document data-access interface.
///
/// One cohesive surface over the store's collections, constructed once and
/// passed by reference - callers never talk HTTP themselves and never see
/// the client's credentials.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Fetch a single document.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError>;

    /// Create a document with a store-minted id.
    async fn create_document(
        &self,
        collection: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError>;

    /// Patch the given fields of a document; untouched fields are preserved.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError>;

    /// Delete a document.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError>;

    /// List documents matching the queries.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError>;
}

// =============================================================================
// AppwriteClient
// =============================================================================

/// Appwrite error envelope.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Clone)]
enum CacheValue {
    Document(Box<Document>),
    List(DocumentList),
}

/// REST client for the Appwrite Databases API.
///
/// Cheaply cloneable; catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<AppwriteClientInner>,
}

struct AppwriteClientInner {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
    /// Collection ids whose reads go through the cache.
    cached_collections: HashSet<String>,
    cache: Cache<String, CacheValue>,
}

impl AppwriteClient {
    /// Create a new Appwrite client.
    #[must_use]
    pub fn new(config: &AppwriteConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(AppwriteClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.expose_secret().to_owned(),
                database_id: config.database_id.clone(),
                cached_collections: config.collections.cached(),
                cache,
            }),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.inner.endpoint, self.inner.database_id, collection
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.inner.project_id)
            .header("X-Appwrite-Key", &self.inner.api_key)
    }

    fn is_cached(&self, collection: &str) -> bool {
        self.inner.cached_collections.contains(collection)
    }

    /// Decode a response, mapping non-success statuses to [`AppwriteError`].
    async fn read_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        collection: &str,
        id: Option<&str>,
    ) -> Result<T, AppwriteError> {
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppwriteError::NotFound {
                collection: collection.to_owned(),
                id: id.unwrap_or_default().to_owned(),
            });
        }

        if !status.is_success() {
            let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
            let (kind, message) = parsed.map_or_else(
                || {
                    (
                        "unknown".to_owned(),
                        body.chars().take(200).collect::<String>(),
                    )
                },
                |e| (e.kind, e.message),
            );
            tracing::error!(
                status = %status,
                collection,
                kind = %kind,
                "store returned non-success status"
            );
            return Err(AppwriteError::Api {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|err| {
            tracing::error!(
                error = %err,
                collection,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse store response"
            );
            AppwriteError::Parse(err)
        })
    }

    /// Check that the store is reachable (used by the readiness probe).
    ///
    /// # Errors
    ///
    /// Returns an error if the health endpoint is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), AppwriteError> {
        let url = format!("{}/health", self.inner.endpoint);
        let response = self.authed(self.inner.client.get(url)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppwriteError::Api {
                status: status.as_u16(),
                kind: "health".to_owned(),
                message: "store health check failed".to_owned(),
            })
        }
    }

    /// Drop all cached catalog reads.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}

impl DocumentStore for AppwriteClient {
    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError> {
        let cache_key = format!("doc:{collection}:{id}");

        if self.is_cached(collection)
            && let Some(CacheValue::Document(doc)) = self.inner.cache.get(&cache_key).await
        {
            debug!("cache hit for document");
            return Ok(*doc);
        }

        let url = format!("{}/{}", self.documents_url(collection), id);
        let response = self.authed(self.inner.client.get(url)).send().await?;
        let doc: Document = Self::read_response(response, collection, Some(id)).await?;

        if self.is_cached(collection) {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Document(Box::new(doc.clone())))
                .await;
        }

        Ok(doc)
    }

    #[instrument(skip(self, data), fields(collection = %collection))]
    async fn create_document(
        &self,
        collection: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let body = serde_json::json!({
            "documentId": "unique()",
            "data": data,
        });

        let response = self
            .authed(self.inner.client.post(self.documents_url(collection)))
            .json(&body)
            .send()
            .await?;
        let doc = Self::read_response(response, collection, None).await?;

        // Writes to a cached collection are rare; a coarse flush keeps the
        // cache honest without tracking list keys.
        if self.is_cached(collection) {
            self.inner.cache.invalidate_all();
        }

        Ok(doc)
    }

    #[instrument(skip(self, data), fields(collection = %collection, id = %id))]
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let url = format!("{}/{}", self.documents_url(collection), id);
        let body = serde_json::json!({ "data": data });

        let response = self
            .authed(self.inner.client.patch(url))
            .json(&body)
            .send()
            .await?;
        let doc = Self::read_response(response, collection, Some(id)).await?;

        if self.is_cached(collection) {
            self.inner.cache.invalidate_all();
        }

        Ok(doc)
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError> {
        let url = format!("{}/{}", self.documents_url(collection), id);
        let response = self.authed(self.inner.client.delete(url)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppwriteError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
            let (kind, message) = parsed.map_or_else(
                || ("unknown".to_owned(), body.chars().take(200).collect()),
                |e| (e.kind, e.message),
            );
            return Err(AppwriteError::Api {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        if self.is_cached(collection) {
            self.inner.cache.invalidate_all();
        }

        Ok(())
    }

    #[instrument(skip(self, queries), fields(collection = %collection))]
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError> {
        let rendered: Vec<String> = queries.iter().map(Query::to_query_string).collect();
        let cache_key = format!("list:{collection}:{}", rendered.join(","));

        if self.is_cached(collection)
            && let Some(CacheValue::List(list)) = self.inner.cache.get(&cache_key).await
        {
            debug!("cache hit for document list");
            return Ok(list);
        }

        let params: Vec<(&str, &String)> = rendered.iter().map(|q| ("queries[]", q)).collect();
        let response = self
            .authed(self.inner.client.get(self.documents_url(collection)))
            .query(&params)
            .send()
            .await?;
        let list: DocumentList = Self::read_response(response, collection, None).await?;

        if self.is_cached(collection) {
            self.inner
                .cache
                .insert(cache_key, CacheValue::List(list.clone()))
                .await;
        }

        Ok(list)
    }
}

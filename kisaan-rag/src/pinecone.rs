//! Pinecone vector store backed by the Pinecone REST API.
//!
//! This module is only available when the `pinecone` feature is enabled.
//!
//! The store talks to two endpoints: the control plane
//! (`https://api.pinecone.io`) to describe and create serverless indexes,
//! and the per-index data plane host for upserts and queries. Index hosts
//! are resolved once and cached.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// The Pinecone control-plane endpoint.
const CONTROLLER_URL: &str = "https://api.pinecone.io";

/// Pinned Pinecone REST API version.
const API_VERSION: &str = "2025-01";

/// Maximum vectors per upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// A [`VectorStore`] backed by a Pinecone serverless index.
///
/// # Configuration
///
/// - `cloud`/`region` – serverless placement, defaults to `aws`/`us-east-1`.
/// - `api_key` – from the constructor; the server reads it from
///   `PINECONE_API_KEY`.
///
/// # Example
///
/// ```rust,ignore
/// use kisaan_rag::pinecone::PineconeVectorStore;
///
/// let store = PineconeVectorStore::new("pc-...")?;
/// store.ensure_index("general-query", 384).await?;
/// ```
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    controller_url: String,
    cloud: String,
    region: String,
    /// Resolved data-plane hosts, index name → host.
    hosts: RwLock<HashMap<String, String>>,
}

impl PineconeVectorStore {
    /// Create a new store with the given API key and default serverless
    /// placement (`aws`/`us-east-1`).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            controller_url: CONTROLLER_URL.into(),
            cloud: "aws".into(),
            region: "us-east-1".into(),
            hosts: RwLock::new(HashMap::new()),
        })
    }

    /// Override the control-plane URL (for tests against a local stub).
    pub fn with_controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = url.into();
        self
    }

    /// Set the serverless cloud and region used when creating indexes.
    pub fn with_placement(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    /// Read the API error message out of a failed response body.
    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        format!("API returned {status}: {detail}")
    }

    /// Resolve the data-plane host for an index, describing it on first use.
    async fn host_for(&self, index: &str) -> Result<String> {
        if let Some(host) = self.hosts.read().await.get(index) {
            return Ok(host.clone());
        }

        let url = format!("{}/indexes/{index}", self.controller_url);
        let response =
            self.request(reqwest::Method::GET, &url).send().await.map_err(|e| {
                error!(backend = "Pinecone", error = %e, "describe index request failed");
                RagError::VectorStoreError {
                    backend: "Pinecone".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let message = Self::error_detail(response).await;
            error!(backend = "Pinecone", index, %message, "describe index failed");
            return Err(RagError::VectorStoreError { backend: "Pinecone".into(), message });
        }

        let described: IndexModel = response.json().await.map_err(|e| {
            RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: format!("failed to parse describe response: {e}"),
            }
        })?;

        self.hosts.write().await.insert(index.to_string(), described.host.clone());
        Ok(described.host)
    }
}

// ── Pinecone API request/response types ─────────────────────────────

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Deserialize)]
struct IndexModel {
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

#[derive(Serialize)]
struct VectorRecord {
    id: String,
    values: Vec<f32>,
    metadata: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Flatten a chunk into Pinecone metadata: text plus the string metadata
/// fields and the parent document ID.
fn chunk_metadata(chunk: &Chunk) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("text".to_string(), Value::String(chunk.text.clone()));
    metadata.insert("document_id".to_string(), Value::String(chunk.document_id.clone()));
    for (key, value) in &chunk.metadata {
        metadata.insert(key.clone(), Value::String(value.clone()));
    }
    metadata
}

/// Rebuild a chunk from a query match. The embedding is not returned by
/// the query (values are excluded), so it is left empty.
fn match_to_chunk(m: QueryMatch) -> Chunk {
    let mut metadata = HashMap::new();
    let mut text = String::new();
    let mut document_id = String::new();

    for (key, value) in m.metadata {
        let Value::String(value) = value else { continue };
        match key.as_str() {
            "text" => text = value,
            "document_id" => document_id = value,
            _ => {
                metadata.insert(key, value);
            }
        }
    }

    Chunk { id: m.id, text, embedding: Vec::new(), metadata, document_id }
}

// ── VectorStore implementation ──────────────────────────────────────

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()> {
        // Describe first; an existing index makes creation a no-op.
        let describe_url = format!("{}/indexes/{name}", self.controller_url);
        let response = self
            .request(reqwest::Method::GET, &describe_url)
            .send()
            .await
            .map_err(|e| RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: format!("request failed: {e}"),
            })?;

        if response.status().is_success() {
            let described: IndexModel =
                response.json().await.map_err(|e| RagError::VectorStoreError {
                    backend: "Pinecone".into(),
                    message: format!("failed to parse describe response: {e}"),
                })?;
            debug!(backend = "Pinecone", index = name, host = %described.host, "index exists");
            self.hosts.write().await.insert(name.to_string(), described.host);
            return Ok(());
        }

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let message = Self::error_detail(response).await;
            error!(backend = "Pinecone", index = name, %message, "describe index failed");
            return Err(RagError::VectorStoreError { backend: "Pinecone".into(), message });
        }

        let request_body = CreateIndexRequest {
            name,
            dimension: dimensions,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec { cloud: &self.cloud, region: &self.region },
            },
        };

        let create_url = format!("{}/indexes", self.controller_url);
        let response = self
            .request(reqwest::Method::POST, &create_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let message = Self::error_detail(response).await;
            error!(backend = "Pinecone", index = name, %message, "create index failed");
            return Err(RagError::VectorStoreError { backend: "Pinecone".into(), message });
        }

        let created: IndexModel = response.json().await.map_err(|e| {
            RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: format!("failed to parse create response: {e}"),
            }
        })?;

        info!(backend = "Pinecone", index = name, dimensions, "created index");
        self.hosts.write().await.insert(name.to_string(), created.host);
        Ok(())
    }

    async fn upsert(&self, index: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let host = self.host_for(index).await?;
        let url = format!("https://{host}/vectors/upsert");

        for batch in chunks.chunks(UPSERT_BATCH_SIZE) {
            let request_body = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|chunk| VectorRecord {
                        id: chunk.id.clone(),
                        values: chunk.embedding.clone(),
                        metadata: chunk_metadata(chunk),
                    })
                    .collect(),
            };

            let response =
                self.request(reqwest::Method::POST, &url).json(&request_body).send().await.map_err(
                    |e| {
                        error!(backend = "Pinecone", index, error = %e, "upsert request failed");
                        RagError::VectorStoreError {
                            backend: "Pinecone".into(),
                            message: format!("request failed: {e}"),
                        }
                    },
                )?;

            if !response.status().is_success() {
                let message = Self::error_detail(response).await;
                error!(backend = "Pinecone", index, %message, "upsert failed");
                return Err(RagError::VectorStoreError { backend: "Pinecone".into(), message });
            }
        }

        debug!(backend = "Pinecone", index, count = chunks.len(), "upserted chunks");
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let host = self.host_for(index).await?;
        let url = format!("https://{host}/query");

        let request_body = QueryRequest {
            vector: embedding,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "Pinecone", index, error = %e, "query request failed");
                RagError::VectorStoreError {
                    backend: "Pinecone".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let message = Self::error_detail(response).await;
            error!(backend = "Pinecone", index, %message, "query failed");
            return Err(RagError::VectorStoreError { backend: "Pinecone".into(), message });
        }

        let query_response: QueryResponse = response.json().await.map_err(|e| {
            RagError::VectorStoreError {
                backend: "Pinecone".into(),
                message: format!("failed to parse query response: {e}"),
            }
        })?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| {
                let score = m.score;
                SearchResult { chunk: match_to_chunk(m), score }
            })
            .collect())
    }
}

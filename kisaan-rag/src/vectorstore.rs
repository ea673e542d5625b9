//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for vector embeddings with cosine similarity search.
///
/// Implementations manage named indexes of [`Chunk`]s and support upserting
/// and nearest-neighbor queries. There is no delete operation: the system
/// defines no deletion lifecycle, and deterministic chunk IDs make upserts
/// overwrite prior entries.
///
/// # Example
///
/// ```rust,ignore
/// use kisaan_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.ensure_index("general-query", 384).await?;
/// store.upsert("general-query", &chunks).await?;
/// let results = store.query("general-query", &query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named index with the given dimensionality if it does not
    /// already exist. Idempotent.
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Upsert chunks into an index. Chunks must have embeddings set.
    ///
    /// There is no transactionality: a failure mid-batch may leave the index
    /// partially updated.
    async fn upsert(&self, index: &str, chunks: &[Chunk]) -> Result<()>;

    /// Query for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns at most `top_k` results ordered by descending similarity
    /// score. Ties are broken by the backend's internal order.
    async fn query(&self, index: &str, embedding: &[f32], top_k: usize)
        -> Result<Vec<SearchResult>>;
}

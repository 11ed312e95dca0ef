//! Vector store trait for storing documents and searching by similarity.

use async_trait::async_trait;
use uuid::Uuid;

use crate::document::{NewDocument, RetrievalResult};
use crate::error::Result;

/// Default maximum number of results returned by a similarity search.
pub const DEFAULT_TOP_K: usize = 20;

/// Default minimum similarity for a result to be included.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// A storage backend for embedded documents with similarity search.
///
/// Implementations delegate ranking and filtering to the backend — the
/// client side performs no local scoring, caching, or retries.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_retrieval::{PgVectorStore, VectorStore, DEFAULT_TOP_K, DEFAULT_THRESHOLD};
///
/// let store = PgVectorStore::from_env().await?;
/// store.ensure_schema(768).await?;
/// store.insert_documents(&docs).await?;
/// let results = store.similarity_search(&query_embedding, DEFAULT_TOP_K, DEFAULT_THRESHOLD).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the backing schema if it does not exist yet.
    ///
    /// `dimensions` is the embedding dimensionality the store will hold.
    /// Idempotent.
    async fn ensure_schema(&self, dimensions: usize) -> Result<()>;

    /// Bulk-insert raw document rows.
    ///
    /// No batching, chunking, or dedup logic; an empty slice is a no-op.
    /// Any failure aborts the whole call with [`RetrievalError::Insert`](crate::RetrievalError::Insert).
    async fn insert_documents(&self, documents: &[NewDocument]) -> Result<()>;

    /// Delete documents by id. Unknown ids are ignored.
    async fn delete_documents(&self, ids: &[Uuid]) -> Result<()>;

    /// Return the `top_k` most similar documents above `threshold`.
    ///
    /// Results are ordered by descending similarity, contain at most `top_k`
    /// entries, and every entry satisfies `similarity > threshold` (strict).
    async fn similarity_search(
        &self,
        embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievalResult>>;
}

/// Full-text search over stored documents, for hybrid retrieval.
///
/// Separate from [`VectorStore`] because not every backend has a lexical
/// index. Scores are rank values in an arbitrary non-negative range and are
/// only meaningful for ordering within one result list.
#[async_trait]
pub trait LexicalSearch: Send + Sync {
    /// Return up to `top_k` documents matching `query`, best match first.
    async fn lexical_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>>;
}

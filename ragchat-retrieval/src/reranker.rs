//! Reranker trait for re-scoring search results.

use async_trait::async_trait;

use crate::document::RetrievalResult;
use crate::error::Result;

/// A reranker that re-scores and reorders retrieval results.
///
/// Implementations can call cross-encoder models, LLM-based scorers, or
/// other external services. The reranking model itself lives outside this
/// crate; this trait is the seam that produces `rerank_score`.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank results given the original query.
    ///
    /// Returns results in a new order with `rerank_score` populated.
    async fn rerank(&self, query: &str, results: Vec<RetrievalResult>) -> Result<Vec<RetrievalResult>>;
}

/// A no-op reranker that returns results unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReranker;

#[async_trait]
impl Reranker for NoOpReranker {
    async fn rerank(&self, _query: &str, results: Vec<RetrievalResult>) -> Result<Vec<RetrievalResult>> {
        Ok(results)
    }
}

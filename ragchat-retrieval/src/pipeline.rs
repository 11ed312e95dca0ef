//! Ingest and query orchestration.
//!
//! The [`RetrievalPipeline`] coordinates the full workflow by composing an
//! [`EmbeddingProvider`], a [`VectorStore`], a [`Chunker`], and optional
//! [`Reranker`] / [`LexicalSearch`] collaborators.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragchat_retrieval::{RetrievalPipeline, RetrievalConfig, InMemoryVectorStore};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.init().await?;
//! pipeline.ingest(&source).await?;
//! let results = pipeline.retrieve("how do I configure X?").await?;
//! ```

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::chunking::{Chunker, TokenEstimateChunker};
use crate::config::RetrievalConfig;
use crate::document::{DocumentSource, NewDocument, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::ranking::{maximal_marginal_relevance, reciprocal_rank_fusion};
use crate::reranker::Reranker;
use crate::text::{clean_for_embedding, content_hash, normalize_text};
use crate::vectorstore::{LexicalSearch, VectorStore};

/// The retrieval pipeline orchestrator.
///
/// Ingestion runs normalize → chunk → embed → store; queries run
/// embed → search → fuse → rerank → truncate. Construct one via
/// [`RetrievalPipeline::builder()`].
pub struct RetrievalPipeline {
    config: RetrievalConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    reranker: Option<Arc<dyn Reranker>>,
    lexical: Option<Arc<dyn LexicalSearch>>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Bootstrap the vector store schema with the embedding provider's
    /// dimensionality. Idempotent.
    pub async fn init(&self) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.ensure_schema(dimensions).await.map_err(|e| {
            error!(dimensions, error = %e, "failed to bootstrap schema");
            RetrievalError::Pipeline(format!("schema bootstrap failed: {e}"))
        })
    }

    /// Ingest one source: normalize → chunk → embed → store.
    ///
    /// Chunk text is stored verbatim; only the text sent to the embedding
    /// service is cleaned. Every stored row carries the source title, URI,
    /// chunk position, and the content hash of the normalized source text.
    ///
    /// Returns the number of chunks stored. Empty text stores nothing and
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Pipeline`] if embedding or storage fails,
    /// including the source title in the error message.
    pub async fn ingest(&self, source: &DocumentSource) -> Result<usize> {
        let normalized = normalize_text(&source.text);
        let chunks = self.chunker.chunk(&normalized);
        if chunks.is_empty() {
            info!(title = %source.title, chunk_count = 0, "ingested source (empty)");
            return Ok(0);
        }

        let hash = content_hash(&normalized);

        let cleaned: Vec<String> = chunks.iter().map(|c| clean_for_embedding(&c.text)).collect();
        let texts: Vec<&str> = cleaned.iter().map(String::as_str).collect();

        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(title = %source.title, error = %e, "embedding failed during ingestion");
            RetrievalError::Pipeline(format!("embedding failed for '{}': {e}", source.title))
        })?;

        let documents: Vec<NewDocument> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let mut metadata = crate::document::Metadata::new();
                metadata.insert("title".to_string(), json!(source.title));
                if let Some(uri) = &source.source_uri {
                    metadata.insert("source".to_string(), json!(uri));
                }
                metadata.insert("position".to_string(), json!(chunk.ordinal));
                metadata.insert("tokens".to_string(), json!(chunk.tokens));
                metadata.insert("content_hash".to_string(), json!(hash));

                NewDocument { content: chunk.text.clone(), embedding, metadata }
            })
            .collect();

        self.vector_store.insert_documents(&documents).await.map_err(|e| {
            error!(title = %source.title, error = %e, "insert failed during ingestion");
            RetrievalError::Pipeline(format!("insert failed for '{}': {e}", source.title))
        })?;

        let chunk_count = documents.len();
        info!(title = %source.title, chunk_count, "ingested source");

        Ok(chunk_count)
    }

    /// Query the pipeline: embed → search → fuse → rerank → truncate.
    ///
    /// On the vector-only path the store applies the similarity threshold
    /// and ordering. On the hybrid path vector candidates are fetched
    /// unfiltered so that low-similarity matches can still be rescued by
    /// rank fusion, and the full fused list is kept — lexical hits have no
    /// comparable similarity, so no threshold applies after fusion.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Pipeline`] if embedding or search fails.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let query_embedding =
            self.embedding_provider.embed(&clean_for_embedding(query)).await.map_err(|e| {
                error!(error = %e, "embedding failed during query");
                RetrievalError::Pipeline(format!("query embedding failed: {e}"))
            })?;

        let hybrid = self.config.hybrid && self.lexical.is_some();
        let threshold =
            if hybrid { f32::NEG_INFINITY } else { self.config.similarity_threshold };

        let vector_results = self
            .vector_store
            .similarity_search(&query_embedding, self.config.top_k, threshold)
            .await
            .map_err(|e| {
                error!(error = %e, "vector store search failed");
                RetrievalError::Pipeline(format!("search failed: {e}"))
            })?;

        let mut results = match &self.lexical {
            Some(lexical) if self.config.hybrid => {
                let lexical_results =
                    lexical.lexical_search(query, self.config.top_k).await.map_err(|e| {
                        error!(error = %e, "lexical search failed");
                        RetrievalError::Pipeline(format!("lexical search failed: {e}"))
                    })?;
                reciprocal_rank_fusion(vec![vector_results, lexical_results], self.config.rrf_k)
            }
            _ => vector_results,
        };

        if let Some(reranker) = &self.reranker {
            results = reranker.rerank(query, results).await.map_err(|e| {
                error!(error = %e, "reranking failed");
                RetrievalError::Pipeline(format!("reranking failed: {e}"))
            })?;
        }

        results.truncate(self.config.top_k);

        info!(result_count = results.len(), "query completed");
        Ok(results)
    }

    /// Retrieve and then select a diverse context window with MMR.
    ///
    /// Returns at most `top_m_context` results, traded off between relevance
    /// and redundancy by `mmr_lambda`.
    pub async fn retrieve_context(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let results = self.retrieve(query).await?;
        Ok(maximal_marginal_relevance(results, self.config.mmr_lambda, self.config.top_m_context))
    }
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// `embedding_provider` and `vector_store` are required. When no chunker is
/// supplied, a [`TokenEstimateChunker`] is built from the config's chunk
/// parameters.
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RetrievalConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    reranker: Option<Arc<dyn Reranker>>,
    lexical: Option<Arc<dyn LexicalSearch>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`RetrievalConfig::default()`].
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the chunker built from the config.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set an optional reranker for post-search result reordering.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the lexical backend used for hybrid retrieval.
    pub fn lexical(mut self, lexical: Arc<dyn LexicalSearch>) -> Self {
        self.lexical = Some(lexical);
        self
    }

    /// Build the [`RetrievalPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Config`] if `embedding_provider` or
    /// `vector_store` is missing.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RetrievalError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RetrievalError::Config("vector_store is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(TokenEstimateChunker::new(config.chunk_tokens, config.chunk_overlap_pct))
        });

        Ok(RetrievalPipeline {
            config,
            embedding_provider,
            vector_store,
            chunker,
            reranker: self.reranker,
            lexical: self.lexical,
        })
    }
}

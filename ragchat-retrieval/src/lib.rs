//! Document ingestion and vector-similarity retrieval for RagChat.
//!
//! This crate is the retrieval layer of a RAG chat application. It stores
//! embedded document chunks in PostgreSQL with the
//! [pgvector](https://github.com/pgvector/pgvector) extension and answers
//! queries with thresholded top-k cosine similarity search. The
//! nearest-neighbor computation itself runs in the database; embedding
//! generation is delegated to an external service behind
//! [`EmbeddingProvider`].
//!
//! ## Components
//!
//! - [`VectorStore`] — storage/search trait, with [`PgVectorStore`]
//!   (feature `pgvector`) and [`InMemoryVectorStore`] backends
//! - [`EmbeddingProvider`] — embedding trait, with
//!   [`GeminiEmbeddingProvider`](gemini::GeminiEmbeddingProvider)
//!   (feature `gemini`)
//! - [`RetrievalPipeline`] — ingest (normalize → chunk → embed → store) and
//!   query (embed → search → fuse → rerank) orchestration
//! - [`ranking`] — reciprocal rank fusion and MMR context selection
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragchat_retrieval::{
//!     DocumentSource, GeminiEmbeddingProvider, PgVectorStore, RetrievalConfig,
//!     RetrievalPipeline,
//! };
//!
//! let store = Arc::new(PgVectorStore::from_env().await?);
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::from_env()?)
//!     .embedding_provider(Arc::new(GeminiEmbeddingProvider::from_env()?))
//!     .vector_store(store.clone())
//!     .lexical(store)
//!     .build()?;
//!
//! pipeline.init().await?;
//! pipeline.ingest(&DocumentSource {
//!     title: "User guide".into(),
//!     source_uri: None,
//!     text: guide_text,
//! }).await?;
//! let results = pipeline.retrieve("how do I reset my password?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod pipeline;
pub mod ranking;
pub mod reranker;
pub mod text;
pub mod vectorstore;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use chunking::{Chunker, TokenEstimateChunker};
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Chunk, Document, DocumentSource, Metadata, NewDocument, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use error::{Result, RetrievalError};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{RetrievalPipeline, RetrievalPipelineBuilder};
pub use reranker::{NoOpReranker, Reranker};
pub use vectorstore::{DEFAULT_THRESHOLD, DEFAULT_TOP_K, LexicalSearch, VectorStore};

#[cfg(feature = "gemini")]
pub use gemini::GeminiEmbeddingProvider;

#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;

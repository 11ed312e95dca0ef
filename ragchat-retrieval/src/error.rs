//! Error types for the `ragchat-retrieval` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
///
/// Insert and search failures are distinct variants; both carry the upstream
/// message verbatim. There is no retry or partial-success handling — callers
/// surface these as-is.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// An error occurred during embedding generation.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A document insert failed. The whole call is aborted.
    #[error("failed to insert documents ({backend}): {message}")]
    Insert {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A similarity or lexical search failed. No partial results.
    #[error("similarity search failed ({backend}): {message}")]
    Search {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Any other vector store operation failed (schema bootstrap, delete).
    #[error("vector store error ({backend}): {message}")]
    Store {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error in the ingest/query orchestration.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

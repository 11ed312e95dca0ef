//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open key-value metadata attached to documents and chunks.
///
/// Conventional keys include `source`, `title`, `section`, and `position`.
pub type Metadata = HashMap<String, serde_json::Value>;

/// A stored document row: a unit of embedded text with metadata.
///
/// Rows are created by ingestion and immutable afterwards except for
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, generated by the store on insert.
    pub id: Uuid,
    /// The text content of the document.
    pub content: String,
    /// The embedding vector. Search results omit it to keep payloads small.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Key-value metadata (source, title, section, position, ...).
    pub metadata: Metadata,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The insert shape of a [`Document`]: everything except the generated
/// `id` and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDocument {
    /// The text content of the document.
    pub content: String,
    /// The embedding vector for `content`.
    pub embedding: Vec<f32>,
    /// Key-value metadata (source, title, section, position, ...).
    pub metadata: Metadata,
}

/// A pre-embedding unit of text produced by a [`Chunker`](crate::chunking::Chunker).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Zero-based position of this chunk within its source text.
    pub ordinal: usize,
    /// The chunk text.
    pub text: String,
    /// Estimated token count for the chunk text.
    pub tokens: usize,
}

/// Source material handed to the ingest pipeline: raw text plus the
/// metadata that ends up on every chunk produced from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSource {
    /// Human-readable title of the source.
    pub title: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
    /// The full text to ingest.
    pub text: String,
}

/// A retrieved [`Document`] paired with its similarity score.
///
/// Ephemeral: constructed per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The retrieved document (embedding omitted).
    pub document: Document,
    /// Similarity to the query embedding. With the cosine metric this is
    /// `1 - cosine_distance`, i.e. in [-1, 1] and higher is closer.
    pub similarity: f32,
    /// Score assigned by rank fusion or a reranker, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
}

//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps documents in a `HashMap` behind a
//! `tokio::sync::RwLock`. It honors the same search contract as the
//! pgvector backend (strict threshold, descending order, top-k bound) and
//! is intended for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Document, NewDocument, RetrievalResult};
use crate::error::Result;
use crate::vectorstore::{LexicalSearch, VectorStore};

/// An in-memory vector store using cosine similarity for search.
///
/// Ids and timestamps are generated on insert, mirroring what the database
/// backend's column defaults do.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_schema(&self, _dimensions: usize) -> Result<()> {
        Ok(())
    }

    async fn insert_documents(&self, documents: &[NewDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut store = self.documents.write().await;
        let now = Utc::now();
        for doc in documents {
            let id = Uuid::new_v4();
            store.insert(
                id,
                Document {
                    id,
                    content: doc.content.clone(),
                    embedding: Some(doc.embedding.clone()),
                    metadata: doc.metadata.clone(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Ok(())
    }

    async fn delete_documents(&self, ids: &[Uuid]) -> Result<()> {
        let mut store = self.documents.write().await;
        for id in ids {
            store.remove(id);
        }
        Ok(())
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievalResult>> {
        let store = self.documents.read().await;

        let mut scored: Vec<RetrievalResult> = store
            .values()
            .filter_map(|doc| {
                let stored = doc.embedding.as_deref()?;
                let similarity = cosine_similarity(stored, embedding);
                // Strict threshold, same as the SQL contract.
                (similarity > threshold).then(|| RetrievalResult {
                    document: Document { embedding: None, ..doc.clone() },
                    similarity,
                    rerank_score: None,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[async_trait]
impl LexicalSearch for InMemoryVectorStore {
    /// Naive term-overlap ranking: the score is the number of distinct query
    /// terms contained in the document content. Rough, but enough to
    /// exercise hybrid fusion paths without a database.
    async fn lexical_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        let terms: Vec<String> =
            query.to_lowercase().split_whitespace().map(str::to_string).collect();

        let store = self.documents.read().await;
        let mut scored: Vec<RetrievalResult> = store
            .values()
            .filter_map(|doc| {
                let content = doc.content.to_lowercase();
                let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
                (hits > 0).then(|| RetrievalResult {
                    document: Document { embedding: None, ..doc.clone() },
                    similarity: hits as f32,
                    rerank_score: None,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

//! Document chunking.
//!
//! Provides the [`Chunker`] trait and [`TokenEstimateChunker`], which splits
//! text into overlapping windows sized by an approximate token count.

use crate::document::Chunk;

/// A strategy for splitting source text into chunks.
///
/// Implementations produce [`Chunk`]s with text and ordinals but no
/// embeddings; embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split text into chunks. Returns an empty `Vec` for empty input.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Approximate number of characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// Splits text into overlapping windows sized by estimated tokens.
///
/// Uses the ~4 characters per token heuristic: a target of 900 tokens yields
/// windows of roughly 3600 characters, with the overlap expressed as a
/// percentage of the window size.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_retrieval::chunking::TokenEstimateChunker;
///
/// let chunker = TokenEstimateChunker::new(900, 12);
/// let chunks = chunker.chunk(&text);
/// ```
#[derive(Debug, Clone)]
pub struct TokenEstimateChunker {
    target_tokens: usize,
    overlap_pct: usize,
}

impl TokenEstimateChunker {
    /// Create a new chunker.
    ///
    /// # Arguments
    ///
    /// * `target_tokens` — approximate tokens per chunk
    /// * `overlap_pct` — overlap between consecutive chunks, as a percentage
    ///   of the chunk size (must be below 100)
    pub fn new(target_tokens: usize, overlap_pct: usize) -> Self {
        Self { target_tokens, overlap_pct }
    }
}

impl Default for TokenEstimateChunker {
    fn default() -> Self {
        Self::new(900, 12)
    }
}

impl Chunker for TokenEstimateChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let approx_chars = (self.target_tokens * CHARS_PER_TOKEN).max(1);
        // Clamp below the window size so the window always advances.
        let overlap_chars = (approx_chars * self.overlap_pct / 100).min(approx_chars - 1);

        // Work on char boundaries so multi-byte input never splits a char.
        let chars: Vec<char> = text.chars().collect();

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut ordinal = 0;

        while start < chars.len() {
            let end = (start + approx_chars).min(chars.len());
            let chunk_text: String = chars[start..end].iter().collect();
            let tokens = (end - start).div_ceil(CHARS_PER_TOKEN);

            chunks.push(Chunk { ordinal, text: chunk_text, tokens });

            if end == chars.len() {
                break;
            }
            ordinal += 1;
            start = end - overlap_chars;
        }

        chunks
    }
}

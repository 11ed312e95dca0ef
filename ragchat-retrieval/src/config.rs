//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};
use crate::vectorstore::{DEFAULT_THRESHOLD, DEFAULT_TOP_K};

/// Tuning parameters for ingestion and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Maximum number of results returned by a query.
    pub top_k: usize,
    /// Minimum similarity for a result to be kept (strict comparison).
    pub similarity_threshold: f32,
    /// Approximate tokens per chunk during ingestion.
    pub chunk_tokens: usize,
    /// Overlap between consecutive chunks, as a percentage of chunk size.
    pub chunk_overlap_pct: usize,
    /// Fuse vector and lexical results when a lexical backend is available.
    /// Has no effect on pipelines without a lexical backend.
    pub hybrid: bool,
    /// The `k` constant for reciprocal rank fusion.
    pub rrf_k: usize,
    /// Relevance/diversity trade-off for MMR context selection, in [0, 1].
    pub mmr_lambda: f32,
    /// Number of results kept by MMR context selection.
    pub top_m_context: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_THRESHOLD,
            chunk_tokens: 900,
            chunk_overlap_pct: 12,
            hybrid: true,
            rrf_k: 60,
            mmr_lambda: 0.5,
            top_m_context: 10,
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }

    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `TOP_K`, `SIMILARITY_THRESHOLD`, `CHUNK_TOKENS`,
    /// `CHUNK_OVERLAP_PCT`, `HYBRID_RETRIEVAL`, `RRF_K`, `MMR_LAMBDA`,
    /// `TOP_M_CONTEXT`. Unparseable values are rejected.
    pub fn from_env() -> Result<Self> {
        fn parse<T: std::str::FromStr>(name: &str, current: T) -> Result<T> {
            match std::env::var(name) {
                Ok(raw) => raw.trim().parse().map_err(|_| {
                    RetrievalError::Config(format!("invalid value for {name}: {raw:?}"))
                }),
                Err(_) => Ok(current),
            }
        }

        let defaults = Self::default();
        let config = Self {
            top_k: parse("TOP_K", defaults.top_k)?,
            similarity_threshold: parse("SIMILARITY_THRESHOLD", defaults.similarity_threshold)?,
            chunk_tokens: parse("CHUNK_TOKENS", defaults.chunk_tokens)?,
            chunk_overlap_pct: parse("CHUNK_OVERLAP_PCT", defaults.chunk_overlap_pct)?,
            hybrid: parse("HYBRID_RETRIEVAL", defaults.hybrid)?,
            rrf_k: parse("RRF_K", defaults.rrf_k)?,
            mmr_lambda: parse("MMR_LAMBDA", defaults.mmr_lambda)?,
            top_m_context: parse("TOP_M_CONTEXT", defaults.top_m_context)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be greater than zero".to_string()));
        }
        if self.chunk_overlap_pct >= 100 {
            return Err(RetrievalError::Config(format!(
                "chunk_overlap_pct ({}) must be below 100",
                self.chunk_overlap_pct
            )));
        }
        if self.chunk_tokens == 0 {
            return Err(RetrievalError::Config("chunk_tokens must be greater than zero".to_string()));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RetrievalError::Config(format!(
                "similarity_threshold ({}) must be within [-1, 1]",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(RetrievalError::Config(format!(
                "mmr_lambda ({}) must be within [0, 1]",
                self.mmr_lambda
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the maximum number of query results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity threshold.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the approximate tokens per chunk.
    pub fn chunk_tokens(mut self, tokens: usize) -> Self {
        self.config.chunk_tokens = tokens;
        self
    }

    /// Set the chunk overlap percentage.
    pub fn chunk_overlap_pct(mut self, pct: usize) -> Self {
        self.config.chunk_overlap_pct = pct;
        self
    }

    /// Enable or disable hybrid retrieval.
    pub fn hybrid(mut self, hybrid: bool) -> Self {
        self.config.hybrid = hybrid;
        self
    }

    /// Set the reciprocal rank fusion constant.
    pub fn rrf_k(mut self, k: usize) -> Self {
        self.config.rrf_k = k;
        self
    }

    /// Set the MMR relevance/diversity trade-off.
    pub fn mmr_lambda(mut self, lambda: f32) -> Self {
        self.config.mmr_lambda = lambda;
        self
    }

    /// Set the number of results kept by context selection.
    pub fn top_m_context(mut self, m: usize) -> Self {
        self.config.top_m_context = m;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Config`] if `top_k` or `chunk_tokens` is
    /// zero, `chunk_overlap_pct` is 100 or more, or a ratio parameter is out
    /// of range.
    pub fn build(self) -> Result<RetrievalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

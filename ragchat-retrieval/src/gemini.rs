//! Gemini embedding provider using the Generative Language REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};

/// Base URL for the Generative Language API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_MODEL: &str = "models/text-embedding-004";

/// The dimensionality of `text-embedding-004`.
const DEFAULT_DIMENSIONS: usize = 768;

/// An [`EmbeddingProvider`] backed by the Gemini embeddings API.
///
/// Uses `reqwest` to call the `:embedContent` and `:batchEmbedContents`
/// endpoints directly.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-004`; names are normalized to the
///   `models/…` form the API expects.
/// - `api_key` – from the constructor or the `GEMINI_API_KEY` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_retrieval::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

/// Normalize a model name to the `models/…` form.
///
/// Accepts variants like `gemini-text-embedding-004` or
/// `text-embedding-004`.
fn normalize_model_name(name: &str) -> String {
    let mut name = name.trim().to_string();
    if let Some(stripped) = name.strip_prefix("gemini-text-embedding-") {
        name = format!("text-embedding-{stripped}");
    }
    if !name.starts_with("models/") {
        name = format!("models/{name}");
    }
    name
}

impl GeminiEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-004`, 768 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RetrievalError::Embedding {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| RetrievalError::Embedding {
            provider: "Gemini".into(),
            message: "GEMINI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `text-embedding-004`).
    pub fn with_model(mut self, model: impl AsRef<str>) -> Self {
        self.model = normalize_model_name(model.as_ref());
        self
    }

    /// Set the dimensionality reported by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                RetrievalError::Embedding {
                    provider: "Gemini".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Gemini", %status, "API error");
            return Err(RetrievalError::Embedding {
                provider: "Gemini".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            RetrievalError::Embedding {
                provider: "Gemini".into(),
                message: format!("failed to parse response: {e}"),
            }
        })
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let url = format!("{GEMINI_API_BASE}/{}:embedContent", self.model);
        let request = EmbedRequest {
            model: &self.model,
            content: Content { parts: vec![Part { text }] },
        };

        let response: EmbedResponse = self.post_json(&url, &request).await?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), model = %self.model, "embedding batch");

        let url = format!("{GEMINI_API_BASE}/{}:batchEmbedContents", self.model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &self.model,
                    content: Content { parts: vec![Part { text }] },
                })
                .collect(),
        };

        let response: BatchEmbedResponse = self.post_json(&url, &request).await?;
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_are_normalized() {
        assert_eq!(normalize_model_name("text-embedding-004"), "models/text-embedding-004");
        assert_eq!(normalize_model_name("gemini-text-embedding-004"), "models/text-embedding-004");
        assert_eq!(normalize_model_name("models/text-embedding-004"), "models/text-embedding-004");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(GeminiEmbeddingProvider::new("").is_err());
    }
}

//! End-to-end pipeline tests against the in-memory store.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use ragchat_retrieval::document::{DocumentSource, NewDocument};
use ragchat_retrieval::embedding::EmbeddingProvider;
use ragchat_retrieval::error::Result;
use ragchat_retrieval::inmemory::InMemoryVectorStore;
use ragchat_retrieval::vectorstore::VectorStore;
use ragchat_retrieval::{NoOpReranker, RetrievalConfig, RetrievalPipeline};

const DIM: usize = 64;

/// Deterministic bag-of-words embedder: each token bumps one dimension.
/// Identical text embeds identically, so exact-match queries score 1.0.
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIM];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            v[(hasher.finish() as usize) % DIM] += 1.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

fn pipeline(store: Arc<InMemoryVectorStore>, config: RetrievalConfig) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder))
        .vector_store(store)
        .build()
        .unwrap()
}

fn source(title: &str, text: &str) -> DocumentSource {
    DocumentSource { title: title.to_string(), source_uri: None, text: text.to_string() }
}

#[tokio::test]
async fn exact_match_round_trip_scores_maximal_similarity() {
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RetrievalConfig::builder().top_k(5).similarity_threshold(0.8).build().unwrap();
    let pipeline = pipeline(store, config);
    pipeline.init().await.unwrap();

    let text = "postgres stores embeddings inside pgvector columns";
    let stored = pipeline.ingest(&source("Guide", text)).await.unwrap();
    assert_eq!(stored, 1);

    let results = pipeline.retrieve(text).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].similarity > 0.99);
    assert_eq!(results[0].document.content, text);
    assert_eq!(results[0].document.metadata["title"], serde_json::json!("Guide"));
    assert_eq!(results[0].document.metadata["position"], serde_json::json!(0));
}

#[tokio::test]
async fn ingesting_empty_text_stores_nothing_and_succeeds() {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline(store.clone(), RetrievalConfig::default());

    assert_eq!(pipeline.ingest(&source("Empty", "   \n\t  ")).await.unwrap(), 0);

    let query = vec![1.0; DIM];
    assert!(store.similarity_search(&query, 10, -0.5).await.unwrap().is_empty());
}

#[tokio::test]
async fn inserting_zero_documents_is_a_noop() {
    let store = InMemoryVectorStore::new();
    store.insert_documents(&[]).await.unwrap();

    let query = vec![1.0; DIM];
    assert!(store.similarity_search(&query, 10, -0.5).await.unwrap().is_empty());
}

#[tokio::test]
async fn threshold_excludes_dissimilar_documents() {
    let store = InMemoryVectorStore::new();
    let along_x = NewDocument {
        content: "along x".to_string(),
        embedding: vec![1.0, 0.0],
        metadata: HashMap::new(),
    };
    let along_y = NewDocument {
        content: "along y".to_string(),
        embedding: vec![0.0, 1.0],
        metadata: HashMap::new(),
    };
    store.insert_documents(&[along_x, along_y]).await.unwrap();

    let results = store.similarity_search(&[1.0, 0.0], 10, 0.7).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.content, "along x");
    assert!(results[0].similarity > 0.99);
}

#[tokio::test]
async fn deleted_documents_stop_matching() {
    let store = InMemoryVectorStore::new();
    let doc = NewDocument {
        content: "to be removed".to_string(),
        embedding: vec![1.0, 0.0],
        metadata: HashMap::new(),
    };
    store.insert_documents(&[doc]).await.unwrap();

    let results = store.similarity_search(&[1.0, 0.0], 10, 0.5).await.unwrap();
    assert_eq!(results.len(), 1);

    store.delete_documents(&[results[0].document.id]).await.unwrap();
    assert!(store.similarity_search(&[1.0, 0.0], 10, 0.5).await.unwrap().is_empty());
}

#[tokio::test]
async fn hybrid_retrieval_fuses_vector_and_lexical_lists() {
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RetrievalConfig::builder()
        .top_k(10)
        .similarity_threshold(0.3)
        .hybrid(true)
        .build()
        .unwrap();
    let pipeline = RetrievalPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder))
        .vector_store(store.clone())
        .lexical(store)
        .reranker(Arc::new(NoOpReranker))
        .build()
        .unwrap();

    pipeline.ingest(&source("A", "alpha beta gamma delta")).await.unwrap();
    pipeline.ingest(&source("B", "completely unrelated cooking recipes")).await.unwrap();

    let results = pipeline.retrieve("alpha beta gamma delta").await.unwrap();
    assert!(!results.is_empty());
    // Fusion records the RRF score.
    assert!(results[0].rerank_score.is_some());
    assert_eq!(results[0].document.metadata["title"], serde_json::json!("A"));
}

/// Embeds every text to the same fixed direction, so stored embeddings
/// control the similarity exactly.
struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

#[tokio::test]
async fn hybrid_keeps_below_threshold_vector_candidates() {
    let store = Arc::new(InMemoryVectorStore::new());
    // Cosine 0.5 to the query direction, no lexical overlap with the query.
    let half_similar = NewDocument {
        content: "nothing lexically shared here".to_string(),
        embedding: vec![0.5, 0.75f32.sqrt()],
        metadata: HashMap::new(),
    };
    store.insert_documents(&[half_similar]).await.unwrap();

    let hybrid_pipeline = RetrievalPipeline::builder()
        .config(
            RetrievalConfig::builder()
                .top_k(10)
                .similarity_threshold(0.7)
                .hybrid(true)
                .build()
                .unwrap(),
        )
        .embedding_provider(Arc::new(FixedEmbedder))
        .vector_store(store.clone())
        .lexical(store.clone())
        .build()
        .unwrap();

    // Fusion sees unfiltered vector candidates, so the below-threshold
    // document survives with a fused score.
    let results = hybrid_pipeline.retrieve("zebra quartz").await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].similarity < 0.7);
    assert!(results[0].rerank_score.is_some());

    // Vector-only retrieval with the same threshold filters it out.
    let vector_only = RetrievalPipeline::builder()
        .config(
            RetrievalConfig::builder()
                .top_k(10)
                .similarity_threshold(0.7)
                .hybrid(false)
                .build()
                .unwrap(),
        )
        .embedding_provider(Arc::new(FixedEmbedder))
        .vector_store(store)
        .build()
        .unwrap();
    assert!(vector_only.retrieve("zebra quartz").await.unwrap().is_empty());
}

#[tokio::test]
async fn context_selection_is_bounded_by_top_m() {
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RetrievalConfig::builder()
        .top_k(10)
        .similarity_threshold(0.1)
        .top_m_context(2)
        .build()
        .unwrap();
    let pipeline = pipeline(store, config);

    for i in 0..6 {
        let text = format!("shared topic words plus variant{i}");
        pipeline.ingest(&source(&format!("Doc{i}"), &text)).await.unwrap();
    }

    let context = pipeline.retrieve_context("shared topic words").await.unwrap();
    assert!(context.len() <= 2);
    assert!(!context.is_empty());
}

#[test]
fn builder_requires_a_vector_store() {
    let built = RetrievalPipeline::builder().embedding_provider(Arc::new(HashEmbedder)).build();
    assert!(built.is_err());
}

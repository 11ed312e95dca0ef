//! Rank fusion and diversity selection over retrieval results.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::document::RetrievalResult;

/// Fuse ranked result lists with reciprocal rank fusion.
///
/// Each document accumulates `1 / (k + rank)` across the lists it appears in
/// (rank is 1-based within each list). The fused score is recorded as
/// `rerank_score`; the original `similarity` is preserved from the first list
/// a document appeared in. Output is ordered by descending fused score.
pub fn reciprocal_rank_fusion(lists: Vec<Vec<RetrievalResult>>, k: usize) -> Vec<RetrievalResult> {
    let mut fused: HashMap<Uuid, (RetrievalResult, f32)> = HashMap::new();
    let mut order: Vec<Uuid> = Vec::new();

    for list in lists {
        for (rank, result) in list.into_iter().enumerate() {
            let contribution = 1.0 / (k as f32 + rank as f32 + 1.0);
            let id = result.document.id;
            match fused.get_mut(&id) {
                Some((_, score)) => *score += contribution,
                None => {
                    fused.insert(id, (result, contribution));
                    order.push(id);
                }
            }
        }
    }

    let mut merged: Vec<RetrievalResult> = order
        .into_iter()
        .filter_map(|id| fused.remove(&id))
        .map(|(mut result, score)| {
            result.rerank_score = Some(score);
            result
        })
        .collect();

    merged.sort_by(|a, b| {
        b.rerank_score
            .partial_cmp(&a.rerank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged
}

/// Crude textual overlap similarity: Jaccard index over the token sets of
/// the first 500 characters of each document.
fn overlap_similarity(a: &RetrievalResult, b: &RetrievalResult) -> f32 {
    let tokens = |r: &RetrievalResult| -> HashSet<String> {
        let content = &r.document.content;
        let end = content
            .char_indices()
            .nth(500)
            .map(|(i, _)| i)
            .unwrap_or(content.len());
        content[..end].split_whitespace().map(str::to_string).collect()
    };

    let set_a = tokens(a);
    let set_b = tokens(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f32;
    let union = set_a.union(&set_b).count() as f32;
    intersection / union
}

/// Select up to `top_m` results with maximal marginal relevance.
///
/// Greedily picks the candidate maximizing
/// `lambda * relevance - (1 - lambda) * max_overlap_with_selected`,
/// trading relevance against redundancy. Candidates are expected in
/// descending relevance order; if there are at most `top_m` of them they are
/// returned unchanged.
pub fn maximal_marginal_relevance(
    candidates: Vec<RetrievalResult>,
    lambda: f32,
    top_m: usize,
) -> Vec<RetrievalResult> {
    if candidates.len() <= top_m {
        return candidates;
    }

    let mut selected: Vec<RetrievalResult> = Vec::with_capacity(top_m);
    let mut remaining = candidates;

    while !remaining.is_empty() && selected.len() < top_m {
        if selected.is_empty() {
            selected.push(remaining.remove(0));
            continue;
        }

        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let relevance = candidate.similarity;
            let redundancy = selected
                .iter()
                .map(|s| overlap_similarity(candidate, s))
                .fold(0.0f32, f32::max);
            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_idx = i;
            }
        }
        selected.push(remaining.remove(best_idx));
    }

    selected
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::document::{Document, RetrievalResult};

    fn result(content: &str, similarity: f32) -> RetrievalResult {
        let now = Utc::now();
        RetrievalResult {
            document: Document {
                id: Uuid::new_v4(),
                content: content.to_string(),
                embedding: None,
                metadata: HashMap::new(),
                created_at: now,
                updated_at: now,
            },
            similarity,
            rerank_score: None,
        }
    }

    #[test]
    fn rrf_prefers_documents_ranked_high_in_both_lists() {
        let shared = result("appears in both lists", 0.9);
        let vec_only = result("vector only", 0.95);
        let lex_only = result("lexical only", 3.0);

        let vector_list = vec![vec_only.clone(), shared.clone()];
        let lexical_list = vec![shared.clone(), lex_only.clone()];

        let fused = reciprocal_rank_fusion(vec![vector_list, lexical_list], 60);

        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].document.id, shared.document.id);
        // 1/62 + 1/61 for the shared doc
        let expected = 1.0 / 62.0 + 1.0 / 61.0;
        assert!((fused[0].rerank_score.unwrap() - expected).abs() < 1e-6);
        // Original similarity survives fusion.
        assert_eq!(fused[0].similarity, 0.9);
    }

    #[test]
    fn rrf_of_single_list_preserves_order() {
        let a = result("first", 0.9);
        let b = result("second", 0.8);
        let fused = reciprocal_rank_fusion(vec![vec![a.clone(), b.clone()]], 60);
        assert_eq!(fused[0].document.id, a.document.id);
        assert_eq!(fused[1].document.id, b.document.id);
    }

    #[test]
    fn mmr_returns_candidates_unchanged_when_few() {
        let candidates = vec![result("one", 0.9), result("two", 0.8)];
        let picked = maximal_marginal_relevance(candidates.clone(), 0.5, 5);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].document.id, candidates[0].document.id);
    }

    #[test]
    fn mmr_penalizes_near_duplicates() {
        let top = result("rust retrieval pipelines and vector stores", 0.95);
        let duplicate = result("rust retrieval pipelines and vector stores", 0.94);
        let diverse = result("cooking pasta with garlic and olive oil", 0.5);

        let picked =
            maximal_marginal_relevance(vec![top.clone(), duplicate.clone(), diverse.clone()], 0.5, 2);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].document.id, top.document.id);
        assert_eq!(picked[1].document.id, diverse.document.id);
    }
}

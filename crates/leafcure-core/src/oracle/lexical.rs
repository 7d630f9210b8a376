//! In-process oracle using string similarity over disease keys.

use std::sync::Arc;

use async_trait::async_trait;
use strsim::{jaro_winkler, normalized_levenshtein};

use super::{OracleResult, SimilarityOracle};
use crate::catalog::SharedCatalog;
use crate::models::{normalize_key, Candidate};

/// Default minimum similarity for a key to count as a hit.
pub const DEFAULT_LEXICAL_MIN_SCORE: f32 = 0.75;

/// Similarity oracle that scores every catalog key against the query.
///
/// Good enough to catch typos ("powdery mildow") without an embedding
/// service. Keys scoring below `min_score` are not returned.
pub struct LexicalOracle {
    catalog: Arc<SharedCatalog>,
    min_score: f32,
}

impl LexicalOracle {
    pub fn new(catalog: Arc<SharedCatalog>) -> Self {
        Self {
            catalog,
            min_score: DEFAULT_LEXICAL_MIN_SCORE,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

#[async_trait]
impl SimilarityOracle for LexicalOracle {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn search(&self, query: &str, top_k: usize) -> OracleResult<Vec<Candidate>> {
        let needle = normalize_key(query);
        if needle.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let catalog = self.catalog.snapshot();
        let mut scored: Vec<_> = catalog
            .records()
            .iter()
            .map(|record| (fuzzy_match(&needle, &record.disease_key) as f32, record))
            .filter(|(score, _)| *score >= self.min_score)
            .collect();

        // Sort by score descending; stable so ties keep catalog order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(rank, (score, record))| {
                Candidate::new(record.clone(), score, rank).with_raw_text(record.to_payload())
            })
            .collect())
    }
}

/// Compute fuzzy string similarity using combined metrics.
pub fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edit distance
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::models::ProductRecord;

    fn oracle() -> LexicalOracle {
        let store = CatalogStore::from_records(vec![
            ProductRecord::new("powdery mildew", "FungX", "https://x", "Kills fungus", None),
            ProductRecord::new("downy mildew", "DownOut", "https://d", "Oomycete control", None),
            ProductRecord::new("root rot", "RootGuard", "https://r", "Drench", None),
        ]);
        LexicalOracle::new(Arc::new(SharedCatalog::new(store)))
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("powdery mildew", "powdery mildew") > 0.99);
        assert!(fuzzy_match("powdery mildow", "powdery mildew") > 0.85);
        assert!(fuzzy_match("root rot", "powdery mildew") < 0.6);
    }

    #[tokio::test]
    async fn test_typo_finds_record() {
        let results = oracle().search("Powdery Mildow", 3).await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].record.product_name, "FungX");
        assert_eq!(results[0].rank, 0);
        assert!(results[0].raw_text.as_deref().unwrap().contains("product_name: FungX"));
    }

    #[tokio::test]
    async fn test_ranked_and_truncated() {
        let results = oracle().with_min_score(0.0).search("mildew", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[1].rank, 1);
    }

    #[tokio::test]
    async fn test_unrelated_query_is_empty() {
        let results = oracle().search("unknown disease xyz", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_is_empty() {
        assert!(oracle().search("   ", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_scores_keep_catalog_order() {
        let store = CatalogStore::from_records(vec![
            ProductRecord::new("rust x", "X", "https://x", "d", None),
            ProductRecord::new("rust y", "Y", "https://y", "d", None),
        ]);
        let oracle = LexicalOracle::new(Arc::new(SharedCatalog::new(store))).with_min_score(0.0);

        let results = oracle.search("rust", 2).await.unwrap();
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].record.product_name, "X");
        assert_eq!(results[1].record.product_name, "Y");
    }
}

//! Embedding-backed [`SimilarityOracle`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use leafcure_core::{
    Candidate, CatalogStore, OracleError, OracleResult, SharedCatalog, SimilarityOracle,
};

use crate::framing::{document_text, frame_query, DEFAULT_QUERY_PREFIX};
use crate::index::{IndexEntry, VectorIndex};
use crate::{EmbedError, EmbedResult, Embedder};

/// `None` while the build runs; the error is kept as text so waiters can share it.
type BuildOutcome = Option<Result<Arc<VectorIndex>, String>>;

/// A build in flight for one catalog fingerprint.
struct PendingBuild {
    fingerprint: String,
    done: watch::Receiver<BuildOutcome>,
}

#[derive(Default)]
struct IndexSlot {
    ready: Option<Arc<VectorIndex>>,
    pending: Option<PendingBuild>,
}

/// Semantic oracle over the shared catalog.
///
/// The index is built lazily on first search and rebuilt whenever the
/// catalog fingerprint changes. Builds run in their own task: a search that
/// gives up waiting does not cancel the build, and later searches for the
/// same fingerprint wait on it instead of starting another. A failed build
/// is not cached, so the next search retries.
pub struct EmbeddingOracle {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<SharedCatalog>,
    query_prefix: String,
    slot: Arc<Mutex<IndexSlot>>,
}

impl EmbeddingOracle {
    pub fn new(embedder: Arc<dyn Embedder>, catalog: Arc<SharedCatalog>) -> Self {
        Self {
            embedder,
            catalog,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
            slot: Arc::new(Mutex::new(IndexSlot::default())),
        }
    }

    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }

    /// Build the index now instead of on the first query.
    pub async fn warm(&self) -> EmbedResult<usize> {
        Ok(self.current_index().await?.len())
    }

    /// Index for the current catalog snapshot, building it if stale.
    async fn current_index(&self) -> EmbedResult<Arc<VectorIndex>> {
        let catalog = self.catalog.snapshot();
        let fingerprint = catalog.fingerprint().to_string();

        let mut done = {
            let mut slot = self.slot.lock().await;
            if let Some(index) = slot.ready.as_ref() {
                if index.fingerprint() == fingerprint {
                    return Ok(Arc::clone(index));
                }
            }

            let in_flight = slot
                .pending
                .as_ref()
                .filter(|pending| pending.fingerprint == fingerprint)
                .map(|pending| pending.done.clone());

            match in_flight {
                Some(done) => {
                    debug!(%fingerprint, "Waiting on embedding index build");
                    done
                }
                None => {
                    let done = self.spawn_build(catalog);
                    slot.pending = Some(PendingBuild {
                        fingerprint,
                        done: done.clone(),
                    });
                    done
                }
            }
        };

        let outcome = done
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| (*outcome).clone());

        match outcome {
            Some(Ok(index)) => Ok(index),
            Some(Err(reason)) => Err(EmbedError::IndexBuild(reason)),
            None => Err(EmbedError::IndexBuild("build task ended without a result".into())),
        }
    }

    /// Start building an index for `catalog` and return its completion channel.
    fn spawn_build(&self, catalog: Arc<CatalogStore>) -> watch::Receiver<BuildOutcome> {
        let (tx, rx) = watch::channel(None);
        let embedder = Arc::clone(&self.embedder);
        let slot = Arc::clone(&self.slot);

        tokio::spawn(async move {
            let fingerprint = catalog.fingerprint().to_string();
            let outcome = build_index(embedder.as_ref(), &catalog).await.map(Arc::new);

            {
                let mut slot = slot.lock().await;
                // A newer catalog may have started its own build meanwhile
                let current = slot
                    .pending
                    .as_ref()
                    .is_some_and(|pending| pending.fingerprint == fingerprint);
                if current {
                    slot.pending = None;
                    if let Ok(index) = &outcome {
                        slot.ready = Some(Arc::clone(index));
                    }
                }
            }

            match &outcome {
                Ok(index) => info!(
                    records = index.len(),
                    dimension = index.dimension(),
                    model = embedder.model_name(),
                    "Built embedding index"
                ),
                Err(e) => warn!(error = %e, "Embedding index build failed"),
            }
            tx.send_replace(Some(outcome.map_err(|e| e.to_string())));
        });

        rx
    }

    async fn search_index(&self, query: &str, top_k: usize) -> EmbedResult<Vec<Candidate>> {
        let index = self.current_index().await?;
        if index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed_query(&frame_query(&self.query_prefix, query)).await?;
        let hits = index.search(&vector, top_k)?;

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, hit)| {
                Candidate::new(hit.entry.record.clone(), hit.score, rank)
                    .with_raw_text(hit.entry.document.clone())
            })
            .collect())
    }
}

async fn build_index(embedder: &dyn Embedder, catalog: &CatalogStore) -> EmbedResult<VectorIndex> {
    let documents: Vec<String> = catalog.records().iter().map(document_text).collect();
    let vectors = embedder.embed_documents(&documents).await?;
    if vectors.len() != documents.len() {
        return Err(EmbedError::CountMismatch {
            expected: documents.len(),
            actual: vectors.len(),
        });
    }

    let entries = catalog
        .records()
        .iter()
        .cloned()
        .zip(documents)
        .zip(vectors)
        .map(|((record, document), vector)| IndexEntry {
            record,
            document,
            vector,
        })
        .collect();

    VectorIndex::build(catalog.fingerprint(), entries)
}

#[async_trait]
impl SimilarityOracle for EmbeddingOracle {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn search(&self, query: &str, top_k: usize) -> OracleResult<Vec<Candidate>> {
        self.search_index(query, top_k).await.map_err(|e| {
            warn!(error = %e, "Embedding search failed");
            OracleError::Unavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use leafcure_core::{ProductRecord, Resolver, ResolverConfig, Strategy};

    /// Embeds text as letter-frequency vectors over a-z.
    struct LetterEmbedder {
        document_calls: AtomicUsize,
        fail_documents: AtomicBool,
        last_query: std::sync::Mutex<String>,
    }

    impl LetterEmbedder {
        fn new() -> Self {
            Self {
                document_calls: AtomicUsize::new(0),
                fail_documents: AtomicBool::new(false),
                last_query: std::sync::Mutex::new(String::new()),
            }
        }

        fn vectorize(text: &str) -> Vec<f32> {
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            v
        }
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        fn model_name(&self) -> &str {
            "letters"
        }

        async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>> {
            *self.last_query.lock().unwrap() = text.to_string();
            Ok(Self::vectorize(text))
        }

        async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
            self.document_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_documents.load(Ordering::SeqCst) {
                return Err(EmbedError::Api {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            // Disease line only, so document vectors track the key
            Ok(texts
                .iter()
                .map(|t| Self::vectorize(t.lines().next().unwrap_or("")))
                .collect())
        }
    }

    /// Letter embedder whose document batches take longer than a query timeout.
    struct SlowEmbedder {
        delay: std::time::Duration,
        builds: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for SlowEmbedder {
        fn model_name(&self) -> &str {
            "slow-letters"
        }

        async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>> {
            Ok(LetterEmbedder::vectorize(text))
        }

        async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(texts
                .iter()
                .map(|t| LetterEmbedder::vectorize(t.lines().next().unwrap_or("")))
                .collect())
        }
    }

    fn catalog(records: Vec<(&str, &str)>) -> Arc<SharedCatalog> {
        let records = records
            .into_iter()
            .map(|(disease, name)| ProductRecord::new(disease, name, "https://shop", "Treatment", None));
        Arc::new(SharedCatalog::new(CatalogStore::from_records(records)))
    }

    #[tokio::test]
    async fn test_search_ranks_candidates_with_payload() {
        let embedder = Arc::new(LetterEmbedder::new());
        let oracle = EmbeddingOracle::new(
            embedder.clone(),
            catalog(vec![("root rot", "RootGuard"), ("powdery mildew", "FungX")]),
        )
        .with_query_prefix("");

        let candidates = oracle.search("powdery mildow", 2).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].record.product_name, "FungX");
        assert_eq!(candidates[0].rank, 0);
        assert!(candidates[0].score > candidates[1].score);
        assert!(candidates[0]
            .raw_text
            .as_deref()
            .unwrap()
            .contains("product_name: FungX"));
    }

    #[tokio::test]
    async fn test_query_is_framed() {
        let embedder = Arc::new(LetterEmbedder::new());
        let oracle = EmbeddingOracle::new(embedder.clone(), catalog(vec![("rust", "R")]));

        oracle.search("  rust ", 1).await.unwrap();
        assert_eq!(*embedder.last_query.lock().unwrap(), "Plant disease: rust");
    }

    #[tokio::test]
    async fn test_index_built_once_per_fingerprint() {
        let embedder = Arc::new(LetterEmbedder::new());
        let shared = catalog(vec![("rust", "R")]);
        let oracle = EmbeddingOracle::new(embedder.clone(), Arc::clone(&shared));

        assert_eq!(oracle.warm().await.unwrap(), 1);
        oracle.search("rust", 1).await.unwrap();
        assert_eq!(embedder.document_calls.load(Ordering::SeqCst), 1);

        shared.replace(CatalogStore::from_records(vec![
            ProductRecord::new("rust", "R", "https://shop", "Treatment", None),
            ProductRecord::new("scab", "S", "https://shop", "Treatment", None),
        ]));
        let candidates = oracle.search("scab", 1).await.unwrap();
        assert_eq!(candidates[0].record.product_name, "S");
        assert_eq!(embedder.document_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_build_is_unavailable_and_retried() {
        let embedder = Arc::new(LetterEmbedder::new());
        embedder.fail_documents.store(true, Ordering::SeqCst);
        let oracle = EmbeddingOracle::new(embedder.clone(), catalog(vec![("rust", "R")]));

        let err = oracle.search("rust", 1).await.unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));

        embedder.fail_documents.store(false, Ordering::SeqCst);
        assert_eq!(oracle.search("rust", 1).await.unwrap().len(), 1);
        assert_eq!(embedder.document_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_build_survives_query_timeout() {
        let embedder = Arc::new(SlowEmbedder {
            delay: std::time::Duration::from_secs(8),
            builds: AtomicUsize::new(0),
        });
        let shared = catalog(vec![("powdery mildew", "FungX")]);
        let oracle = EmbeddingOracle::new(embedder.clone(), Arc::clone(&shared));
        let resolver = Resolver::new(shared, ResolverConfig::default()).with_oracle(Arc::new(oracle));

        let mut strategies = Vec::new();
        for _ in 0..5 {
            let resolution = resolver.resolve_traced("powdery mildow").await;
            assert_eq!(resolution.outcome.record().unwrap().product_name, "FungX");
            strategies.push(resolution.strategy);
        }

        assert_eq!(strategies[0], Some(Strategy::Keyword));
        assert!(strategies[1..].iter().all(|s| *s == Some(Strategy::Semantic)));
        assert_eq!(embedder.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_searches_share_one_build() {
        let embedder = Arc::new(SlowEmbedder {
            delay: std::time::Duration::from_secs(1),
            builds: AtomicUsize::new(0),
        });
        let oracle = EmbeddingOracle::new(embedder.clone(), catalog(vec![("rust", "R")]));

        let (a, b) = tokio::join!(oracle.search("rust", 1), oracle.search("rust", 1));
        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(embedder.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_top_k_returns_nothing() {
        let oracle = EmbeddingOracle::new(Arc::new(LetterEmbedder::new()), catalog(vec![("rust", "R")]));
        assert!(oracle.search("rust", 0).await.unwrap().is_empty());
        assert_eq!(oracle.name(), "embedding");
    }
}

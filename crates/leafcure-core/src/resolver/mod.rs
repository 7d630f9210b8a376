//! Resolution engine.
//!
//! Strategy chain: Exact → Semantic → Keyword → Unresolved
//!
//! The chain is strictly linear: the first strategy that yields an acceptable
//! record wins and later strategies are never consulted. An exact key hit is
//! final: if its record is incomplete the query is unresolved. Every per-request
//! failure (oracle error, oracle timeout, incomplete record) degrades to the
//! next strategy; `resolve` itself never fails.

mod acceptance;

pub use acceptance::*;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::{CatalogStore, SharedCatalog};
use crate::models::{Candidate, ProductRecord, Resolution, ResolutionOutcome, Strategy};
use crate::oracle::{OracleError, OracleResult, SimilarityOracle};

/// Default number of candidates requested from the oracle.
pub const DEFAULT_TOP_K: usize = 3;

/// Default upper bound on a single oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for the resolution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Candidates requested from the oracle per query
    pub top_k: usize,
    /// Bound on each oracle call; exceeding it counts as unavailable
    pub oracle_timeout: Duration,
    /// Drop oracle candidates scoring below this before acceptance
    pub min_similarity: Option<f32>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            min_similarity: None,
        }
    }
}

/// Resolves free-text disease queries to a single product record.
///
/// Stateless across calls; holds only shared read-only handles.
pub struct Resolver {
    catalog: Arc<SharedCatalog>,
    oracle: Option<Arc<dyn SimilarityOracle>>,
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver without a similarity oracle.
    pub fn new(catalog: Arc<SharedCatalog>, config: ResolverConfig) -> Self {
        Self {
            catalog,
            oracle: None,
            config,
        }
    }

    /// Attach the similarity oracle used by the semantic strategy.
    pub fn with_oracle(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Name of the configured oracle, if any.
    pub fn oracle_name(&self) -> Option<&str> {
        self.oracle.as_deref().map(|o| o.name())
    }

    /// Resolve a query to a record or `Unresolved`.
    pub async fn resolve(&self, query: &str) -> ResolutionOutcome {
        self.resolve_traced(query).await.outcome
    }

    /// Resolve a query and report which strategy accepted it.
    pub async fn resolve_traced(&self, query: &str) -> Resolution {
        // One snapshot per call: a concurrent reload cannot change the catalog mid-chain
        let catalog = self.catalog.snapshot();

        // An exact key hit ends the chain whether or not its record is usable
        if let Some(record) = catalog.exact(query) {
            if record.is_complete() {
                return self.accepted(record.clone(), Strategy::Exact);
            }
            debug!(
                disease = %record.disease_key,
                missing = ?record.missing_fields(),
                "Exact match incomplete, not consulting other strategies"
            );
            return Resolution::unresolved();
        }
        if let Some(record) = self.try_semantic(query).await {
            return self.accepted(record, Strategy::Semantic);
        }
        if let Some(record) = self.try_keyword(&catalog, query) {
            return self.accepted(record, Strategy::Keyword);
        }

        debug!("No strategy resolved the query");
        Resolution::unresolved()
    }

    fn accepted(&self, record: ProductRecord, strategy: Strategy) -> Resolution {
        debug!(
            strategy = strategy.as_str(),
            disease = %record.disease_key,
            product = %record.product_name,
            "Query resolved"
        );
        Resolution::resolved(record, strategy)
    }

    async fn try_semantic(&self, query: &str) -> Option<ProductRecord> {
        let oracle = self.oracle.as_deref()?;

        let candidates = match self.search_oracle(oracle, query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(oracle = oracle.name(), error = %e, "Semantic search failed, falling back to keyword search");
                return None;
            }
        };

        self.select_candidate(&candidates)
    }

    /// Run one bounded oracle search.
    async fn search_oracle(
        &self,
        oracle: &dyn SimilarityOracle,
        query: &str,
    ) -> OracleResult<Vec<Candidate>> {
        let timeout = self.config.oracle_timeout;
        match tokio::time::timeout(timeout, oracle.search(query, self.config.top_k)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(timeout)),
        }
    }

    /// First candidate, in rank order, that passes the threshold and acceptance rule.
    fn select_candidate(&self, candidates: &[Candidate]) -> Option<ProductRecord> {
        candidates.iter().find_map(|candidate| {
            if let Some(min) = self.config.min_similarity {
                if candidate.score < min {
                    debug!(rank = candidate.rank, score = candidate.score, "Candidate below similarity threshold");
                    return None;
                }
            }

            let accepted = accept_candidate(candidate);
            if accepted.is_none() {
                debug!(
                    rank = candidate.rank,
                    missing = ?candidate.record.missing_fields(),
                    "Candidate rejected as incomplete"
                );
            }
            accepted
        })
    }

    fn try_keyword(&self, catalog: &CatalogStore, query: &str) -> Option<ProductRecord> {
        catalog
            .keyword_search(query)
            .into_iter()
            .find(|record| record.is_complete())
            .cloned()
    }
}

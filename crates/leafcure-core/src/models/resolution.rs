//! Resolution models for the strategy chain.

use serde::{Deserialize, Serialize};

use super::ProductRecord;

/// A provisional match produced by the similarity oracle.
///
/// Candidate records are not validated; fields may be empty when the
/// upstream metadata was sparse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Record built from the candidate's metadata
    pub record: ProductRecord,
    /// Similarity score (higher is more similar)
    pub score: f32,
    /// Position in the oracle's ranking, starting at 0
    pub rank: usize,
    /// Raw text payload, usable for `key: value` field recovery
    pub raw_text: Option<String>,
}

impl Candidate {
    /// Create a candidate without a raw text payload.
    pub fn new(record: ProductRecord, score: f32, rank: usize) -> Self {
        Self {
            record,
            score,
            rank,
            raw_text: None,
        }
    }

    /// Attach the raw text payload.
    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }
}

/// Terminal result of resolving a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ResolutionOutcome {
    /// A complete record was accepted
    Resolved(ProductRecord),
    /// No strategy produced an acceptable record
    Unresolved,
}

impl ResolutionOutcome {
    /// The resolved record, if any.
    pub fn record(&self) -> Option<&ProductRecord> {
        match self {
            ResolutionOutcome::Resolved(record) => Some(record),
            ResolutionOutcome::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }
}

/// Lookup strategies, in the order the resolver tries them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strategy {
    /// Direct key lookup on the normalized query
    Exact,
    /// Similarity oracle search
    Semantic,
    /// Substring/token match over the catalog
    Keyword,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Semantic => "semantic",
            Strategy::Keyword => "keyword",
        }
    }
}

/// Outcome of one `resolve` call plus the strategy that accepted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    /// `None` when the outcome is `Unresolved`
    pub strategy: Option<Strategy>,
}

impl Resolution {
    pub fn resolved(record: ProductRecord, strategy: Strategy) -> Self {
        Self {
            outcome: ResolutionOutcome::Resolved(record),
            strategy: Some(strategy),
        }
    }

    pub fn unresolved() -> Self {
        Self {
            outcome: ResolutionOutcome::Unresolved,
            strategy: None,
        }
    }
}

//! Similarity oracle seam.
//!
//! An oracle is an external nearest-neighbour search over the catalog. The
//! resolver only sees ranked [`Candidate`]s and must be able to tell "searched
//! and found nothing" (`Ok(vec![])`) apart from "could not search" (`Err`).

mod lexical;

pub use lexical::*;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Candidate;

/// Oracle errors. Both variants are recoverable per request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Similarity oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Similarity oracle timed out after {0:?}")]
    Timeout(Duration),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Nearest-neighbour search returning ranked candidates.
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &str;

    /// Return up to `top_k` candidates, most similar first.
    ///
    /// No results is `Ok(vec![])`, never an error.
    async fn search(&self, query: &str, top_k: usize) -> OracleResult<Vec<Candidate>>;
}

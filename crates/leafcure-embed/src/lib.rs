//! Embedding-backed similarity oracle for leafcure.
//!
//! Catalog records are embedded once per catalog fingerprint into an
//! in-memory cosine index; queries are embedded on demand and matched
//! against it.
//!
//! - [`client`]: HTTP client for a Gemini-compatible embedding API
//! - [`framing`]: Query and document text sent to the embedder
//! - [`index`]: Brute-force cosine index over catalog records
//! - [`oracle`]: [`EmbeddingOracle`], the `SimilarityOracle` implementation

pub mod client;
pub mod framing;
pub mod index;
pub mod oracle;

pub use client::*;
pub use framing::*;
pub use index::*;
pub use oracle::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid embedding configuration: {0}")]
    Config(String),

    #[error("Embedding index build failed: {0}")]
    IndexBuild(String),
}

pub type EmbedResult<T> = Result<T, EmbedError>;

/// Text embedding backend.
///
/// Queries and documents are embedded separately because retrieval models
/// use a different task type for each side.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Embed documents, returning one vector per input in input order.
    async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>>;
}

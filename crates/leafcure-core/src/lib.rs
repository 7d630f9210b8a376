//! Leafcure Core Library
//!
//! Resolves a free-text plant disease description to a single recommended
//! treatment product.
//!
//! # Architecture
//!
//! ```text
//!   query ──► Resolver ─┬─► 1. Exact     CatalogStore::exact
//!                       ├─► 2. Semantic  SimilarityOracle::search (bounded by timeout)
//!                       ├─► 3. Keyword   CatalogStore::keyword_search
//!                       └─► 4. Unresolved
//!                               │
//!                 Acceptance Rule (name, link, description present)
//!                               │
//!                               ▼
//!                      render() ──► RenderedResult (JSON / HTML)
//! ```
//!
//! # Core Principle
//!
//! **An incomplete record is never rendered.** Every strategy's result passes
//! the acceptance rule first; failures of any single strategy degrade to the
//! next one instead of failing the request.
//!
//! # Modules
//!
//! - [`catalog`]: In-memory catalog store, CSV loader, atomic reload
//! - [`models`]: Domain types (ProductRecord, Candidate, ResolutionOutcome)
//! - [`oracle`]: Similarity oracle trait and the in-process lexical oracle
//! - [`resolver`]: The strategy chain and acceptance rule
//! - [`render`]: JSON and escaped HTML rendering
//! - [`service`]: Top-level service wiring it together

pub mod catalog;
pub mod models;
pub mod oracle;
pub mod render;
pub mod resolver;
pub mod service;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogStore, LoadOptions, LoadReport, SharedCatalog};
pub use models::{Candidate, ProductRecord, Resolution, ResolutionOutcome, Strategy};
pub use oracle::{LexicalOracle, OracleError, OracleResult, SimilarityOracle};
pub use render::{render, ProductCard, RenderedResult, DEFAULT_IMAGE, NOT_FOUND_MESSAGE};
pub use resolver::{Resolver, ResolverConfig};
pub use service::{RemedyService, ServiceStatus};

//! Top-level service owning the catalog and the resolver.
//!
//! Constructed once at startup and shared by reference with every request
//! handler; there is no module-level state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{CatalogResult, CatalogStore, LoadOptions, LoadReport, SharedCatalog};
use crate::models::Resolution;
use crate::oracle::SimilarityOracle;
use crate::render::{render, RenderedResult};
use crate::resolver::{Resolver, ResolverConfig};

/// Snapshot of service state for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub records: usize,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub oracle: Option<String>,
}

/// Disease-to-treatment recommendation service.
pub struct RemedyService {
    catalog: Arc<SharedCatalog>,
    resolver: Resolver,
    source: Option<PathBuf>,
    load_options: LoadOptions,
}

impl RemedyService {
    /// Load the catalog at `path` and build a service without an oracle.
    pub fn open<P: AsRef<Path>>(
        path: P,
        load_options: LoadOptions,
        config: ResolverConfig,
    ) -> CatalogResult<(Self, LoadReport)> {
        let path = path.as_ref();
        let (store, report) = CatalogStore::load(path, &load_options)?;
        let mut service = Self::from_store(store, config);
        service.source = Some(path.to_path_buf());
        service.load_options = load_options;
        Ok((service, report))
    }

    /// Build a service around an already loaded catalog.
    pub fn from_store(store: CatalogStore, config: ResolverConfig) -> Self {
        let catalog = Arc::new(SharedCatalog::new(store));
        Self {
            resolver: Resolver::new(Arc::clone(&catalog), config),
            catalog,
            source: None,
            load_options: LoadOptions::default(),
        }
    }

    /// Attach a similarity oracle for the semantic strategy.
    pub fn with_oracle(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.resolver = self.resolver.with_oracle(oracle);
        self
    }

    /// Shared catalog handle, for building oracles over the same data.
    pub fn catalog(&self) -> Arc<SharedCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve a query and report the accepting strategy.
    pub async fn resolve(&self, query: &str) -> Resolution {
        self.resolver.resolve_traced(query).await
    }

    /// Resolve a query and render the result.
    pub async fn answer(&self, query: &str) -> RenderedResult {
        let resolution = self.resolve(query).await;
        render(&resolution.outcome)
    }

    /// Reload the catalog from its original source.
    ///
    /// Returns `None` when the service was not built from a file.
    pub fn reload(&self) -> Option<CatalogResult<LoadReport>> {
        let source = self.source.as_ref()?;
        Some(self.catalog.reload(source, &self.load_options))
    }

    pub fn status(&self) -> ServiceStatus {
        let catalog = self.catalog.snapshot();
        ServiceStatus {
            records: catalog.len(),
            fingerprint: catalog.fingerprint().to_string(),
            loaded_at: catalog.loaded_at(),
            oracle: self.resolver.oracle_name().map(str::to_string),
        }
    }
}

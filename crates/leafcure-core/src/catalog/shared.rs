//! Atomically swappable catalog handle.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use super::{CatalogResult, CatalogStore, LoadOptions, LoadReport};

/// Shared handle to the active catalog.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request, so
/// a concurrent reload never exposes a half-built catalog.
pub struct SharedCatalog {
    current: RwLock<Arc<CatalogStore>>,
}

impl SharedCatalog {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Current catalog snapshot.
    pub fn snapshot(&self) -> Arc<CatalogStore> {
        // The lock only guards an Arc swap, so a poisoned lock still holds a valid catalog
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a fully built catalog.
    pub fn replace(&self, store: CatalogStore) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(store);
    }

    /// Load a new catalog from disk and swap it in.
    ///
    /// On failure the active catalog is left untouched.
    pub fn reload<P: AsRef<Path>>(&self, path: P, options: &LoadOptions) -> CatalogResult<LoadReport> {
        let path = path.as_ref();
        match CatalogStore::load(path, options) {
            Ok((store, report)) => {
                let previous = self.snapshot();
                info!(
                    previous = %previous.fingerprint(),
                    current = %store.fingerprint(),
                    "Catalog reloaded"
                );
                self.replace(store);
                Ok(report)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Catalog reload failed, keeping current catalog");
                Err(e)
            }
        }
    }
}

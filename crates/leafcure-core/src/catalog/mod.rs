//! In-memory product catalog keyed by disease.
//!
//! The store is built once from a delimited file and is read-only afterwards,
//! so concurrent readers never need a lock. Reloading builds a complete
//! replacement and swaps it in through [`SharedCatalog`].

mod loader;
mod shared;

pub use loader::*;
pub use shared::*;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{normalize_key, ProductRecord};

/// Catalog load errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid catalog row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("Catalog contains no usable records")]
    Empty,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// How a record matched a keyword query. Variant order is match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeywordMatch {
    /// The whole query is a substring of the disease key
    KeySubstring,
    /// The description contains the query, or the key shares a token with it
    Related,
}

/// Read-only catalog of product records.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    /// Records in insertion order
    records: Vec<ProductRecord>,
    /// disease_key → position in `records`
    index: HashMap<String, usize>,
    /// SHA-256 of the source, hex encoded
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl CatalogStore {
    /// Build a store from records, keeping the last record for a repeated key.
    ///
    /// A replaced record keeps the insertion position of the first occurrence.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ProductRecord>,
    {
        let mut hasher = Sha256::new();
        let mut store = Self::empty();
        for record in records {
            hasher.update(record.to_payload().as_bytes());
            hasher.update(b"\n");
            store.insert(record);
        }
        store.fingerprint = hex::encode(hasher.finalize());
        store
    }

    pub(crate) fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            fingerprint: String::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Insert a record. Returns `true` if it replaced an existing key.
    pub(crate) fn insert(&mut self, record: ProductRecord) -> bool {
        match self.index.get(&record.disease_key) {
            Some(&pos) => {
                self.records[pos] = record;
                true
            }
            None => {
                self.index
                    .insert(record.disease_key.clone(), self.records.len());
                self.records.push(record);
                false
            }
        }
    }

    pub(crate) fn set_fingerprint(&mut self, fingerprint: String) {
        self.fingerprint = fingerprint;
    }

    /// Look up a record by exact (normalized) disease key.
    pub fn exact(&self, query: &str) -> Option<&ProductRecord> {
        let key = normalize_key(query);
        self.index.get(&key).map(|&pos| &self.records[pos])
    }

    /// Find records related to the query, best matches first.
    ///
    /// A record matches when its key contains the normalized query, when its
    /// description contains it, or when its key shares a whitespace token with
    /// it. Key-substring matches come first; ties keep insertion order.
    pub fn keyword_search(&self, query: &str) -> Vec<&ProductRecord> {
        self.keyword_matches(query)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Like [`keyword_search`](Self::keyword_search), with the match kind.
    pub fn keyword_matches(&self, query: &str) -> Vec<(KeywordMatch, &ProductRecord)> {
        let needle = normalize_key(query);
        if needle.is_empty() {
            return Vec::new();
        }
        let tokens: HashSet<&str> = needle.split_whitespace().collect();

        let mut matches: Vec<(KeywordMatch, &ProductRecord)> = self
            .records
            .iter()
            .filter_map(|record| {
                if record.disease_key.contains(&needle) {
                    Some((KeywordMatch::KeySubstring, record))
                } else if record.description.to_lowercase().contains(&needle)
                    || record
                        .disease_key
                        .split_whitespace()
                        .any(|t| tokens.contains(t))
                {
                    Some((KeywordMatch::Related, record))
                } else {
                    None
                }
            })
            .collect();

        // Stable: equal priorities stay in insertion order
        matches.sort_by_key(|(kind, _)| *kind);
        matches
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hex SHA-256 of the catalog source.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

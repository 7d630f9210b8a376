//! In-memory vector index over catalog records.
//!
//! Brute-force cosine search. Catalogs are small (hundreds of rows), so a
//! linear scan per query is enough.

use leafcure_core::ProductRecord;

use crate::{EmbedError, EmbedResult};

/// One indexed record with its embedded document text.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub record: ProductRecord,
    pub document: String,
    pub vector: Vec<f32>,
}

/// A scored hit, most similar first.
#[derive(Debug, Clone)]
pub struct IndexHit<'a> {
    pub entry: &'a IndexEntry,
    pub score: f32,
}

/// Cosine index built for one catalog fingerprint.
#[derive(Debug)]
pub struct VectorIndex {
    fingerprint: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index. Every vector must share the first vector's dimension.
    pub fn build(fingerprint: impl Into<String>, entries: Vec<IndexEntry>) -> EmbedResult<Self> {
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(EmbedError::DimensionMismatch {
                expected: dimension,
                actual: bad.vector.len(),
            });
        }

        Ok(Self {
            fingerprint: fingerprint.into(),
            dimension,
            entries,
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return up to `k` entries by descending cosine similarity.
    ///
    /// Ties keep index order.
    pub fn search(&self, vector: &[f32], k: usize) -> EmbedResult<Vec<IndexHit<'_>>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if vector.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let mut hits: Vec<_> = self
            .entries
            .iter()
            .map(|entry| IndexHit {
                entry,
                score: cosine_similarity(vector, &entry.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Cosine similarity; zero when either vector has zero norm or a
/// non-finite component.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a * norm_b);
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}

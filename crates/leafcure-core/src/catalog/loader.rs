//! Catalog file parsing.
//!
//! Expected columns: `disease, product_name, product_link, description, image_url`.
//! Header names are matched case-insensitively and column order is free.
//! `image_url` may be omitted entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{CatalogError, CatalogResult, CatalogStore};
use crate::models::ProductRecord;

const REQUIRED_COLUMNS: [&str; 4] = ["disease", "product_name", "product_link", "description"];
const IMAGE_COLUMN: &str = "image_url";

/// Options controlling how strictly rows are validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Log and skip bad rows instead of failing the whole load
    #[serde(default)]
    pub skip_invalid_rows: bool,
}

/// Summary of a catalog load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows seen (header excluded)
    pub rows_read: usize,
    /// Distinct records in the resulting store
    pub records: usize,
    /// Rows dropped because they were malformed or incomplete
    pub skipped: usize,
    /// Rows that overwrote an earlier row with the same disease key
    pub duplicates_replaced: usize,
}

/// Column positions resolved from the header row.
struct Columns {
    disease: usize,
    product_name: usize,
    product_link: usize,
    description: usize,
    image_url: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> CatalogResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let mut positions = [0usize; 4];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name).ok_or(CatalogError::MissingColumn(name))?;
        }

        Ok(Self {
            disease: positions[0],
            product_name: positions[1],
            product_link: positions[2],
            description: positions[3],
            image_url: find(IMAGE_COLUMN),
        })
    }

    fn build(&self, row: &csv::StringRecord) -> Result<ProductRecord, String> {
        let field = |pos: usize| row.get(pos).unwrap_or("");

        let disease = field(self.disease);
        if disease.trim().is_empty() {
            return Err("empty disease".into());
        }
        let product_name = field(self.product_name);
        if product_name.trim().is_empty() {
            return Err("empty product_name".into());
        }

        Ok(ProductRecord::new(
            disease,
            product_name,
            field(self.product_link),
            field(self.description),
            self.image_url.map(field),
        ))
    }
}

impl CatalogStore {
    /// Load a catalog file from disk.
    pub fn load<P: AsRef<Path>>(
        path: P,
        options: &LoadOptions,
    ) -> CatalogResult<(Self, LoadReport)> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (store, report) = Self::from_bytes(&bytes, options)?;
        info!(
            path = %path.display(),
            records = report.records,
            skipped = report.skipped,
            duplicates = report.duplicates_replaced,
            fingerprint = %store.fingerprint(),
            "Catalog loaded"
        );
        Ok((store, report))
    }

    /// Parse a catalog from raw delimited bytes.
    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> CatalogResult<(Self, LoadReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let columns = Columns::from_headers(reader.headers()?)?;
        let mut store = CatalogStore::empty();
        let mut report = LoadReport::default();

        for result in reader.records() {
            report.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) if options.skip_invalid_rows && !matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    warn!(error = %e, "Skipping malformed catalog row");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let line = row.position().map(|p| p.line()).unwrap_or(0);
            match columns.build(&row) {
                Ok(record) => {
                    if store.insert(record) {
                        report.duplicates_replaced += 1;
                    }
                }
                Err(reason) if options.skip_invalid_rows => {
                    warn!(line, %reason, "Skipping invalid catalog row");
                    report.skipped += 1;
                }
                Err(reason) => return Err(CatalogError::InvalidRow { line, reason }),
            }
        }

        if store.is_empty() {
            return Err(CatalogError::Empty);
        }

        store.set_fingerprint(hex::encode(Sha256::digest(bytes)));
        report.records = store.len();
        Ok((store, report))
    }
}

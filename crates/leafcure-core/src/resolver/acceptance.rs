//! Candidate acceptance and field recovery.
//!
//! A candidate is acceptable only when `product_name`, `product_link` and
//! `description` are all non-empty. Oracle metadata can be sparse, so before
//! rejecting a candidate we try to fill the gaps from its raw text payload,
//! which encodes the catalog columns as `key: value` lines.

use std::collections::HashMap;

use crate::models::{clean_image_url, normalize_key, Candidate, ProductRecord};

/// Return the record to emit for this candidate, or `None` if it is rejected.
pub fn accept_candidate(candidate: &Candidate) -> Option<ProductRecord> {
    if candidate.record.is_complete() {
        return Some(candidate.record.clone());
    }

    let raw = candidate.raw_text.as_deref()?;
    let recovered = recover_fields(&candidate.record, raw);
    if recovered.is_complete() {
        Some(recovered)
    } else {
        None
    }
}

/// Fill empty fields of `record` from `key: value` lines in `raw`.
///
/// Fields that are already populated are never overwritten.
pub fn recover_fields(record: &ProductRecord, raw: &str) -> ProductRecord {
    let fields = parse_payload(raw);
    let mut recovered = record.clone();

    let fill = |target: &mut String, key: &str| {
        if target.trim().is_empty() {
            if let Some(value) = fields.get(key) {
                *target = value.clone();
            }
        }
    };

    fill(&mut recovered.product_name, "product_name");
    fill(&mut recovered.product_link, "product_link");
    fill(&mut recovered.description, "description");

    if recovered.disease_key.is_empty() {
        if let Some(disease) = fields.get("disease") {
            recovered.disease_key = normalize_key(disease);
        }
    }
    if recovered.image_url.is_none() {
        recovered.image_url = clean_image_url(fields.get("image_url").map(String::as_str));
    }

    recovered
}

/// Parse `key: value` lines. Lines without a colon are ignored; the value is
/// everything after the first colon, so URLs survive intact.
pub fn parse_payload(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect()
}

//! Text framing for queries and catalog documents.

use leafcure_core::ProductRecord;

/// Prefix prepended to user queries before embedding.
pub const DEFAULT_QUERY_PREFIX: &str = "Plant disease: ";

/// Frame a user query for embedding. Surrounding whitespace is dropped.
pub fn frame_query(prefix: &str, query: &str) -> String {
    format!("{}{}", prefix, query.trim())
}

/// Document text embedded for a catalog record.
///
/// This is also the candidate payload, so acceptance can recover fields
/// from it.
pub fn document_text(record: &ProductRecord) -> String {
    record.to_payload()
}

//! Result rendering.
//!
//! Pure mapping from a [`ResolutionOutcome`] to a presentation structure that
//! can be emitted as JSON or as an HTML card.

mod html;

pub use html::*;

use serde::{Deserialize, Serialize};

use crate::models::ResolutionOutcome;

/// Image shown when a record has no usable image.
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/200x150?text=No+Image";

/// Message shown when no treatment could be resolved.
pub const NOT_FOUND_MESSAGE: &str = "Sorry, no treatment found for that disease.";

/// Display data for a resolved product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductCard {
    pub name: String,
    pub description: String,
    pub link: String,
    pub image: String,
}

/// Presentation-ready result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedResult {
    Product(ProductCard),
    NotFound { message: String },
}

/// Map an outcome to its rendered form.
pub fn render(outcome: &ResolutionOutcome) -> RenderedResult {
    match outcome {
        ResolutionOutcome::Resolved(record) => RenderedResult::Product(ProductCard {
            name: record.product_name.clone(),
            description: record.description.clone(),
            link: record.product_link.clone(),
            image: record
                .image_url
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        }),
        ResolutionOutcome::Unresolved => RenderedResult::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        },
    }
}

impl RenderedResult {
    pub fn is_found(&self) -> bool {
        matches!(self, RenderedResult::Product(_))
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Export to HTML markup with all text escaped.
    pub fn to_html(&self) -> String {
        match self {
            RenderedResult::Product(card) => product_card_html(card),
            RenderedResult::NotFound { message } => not_found_html(message),
        }
    }
}

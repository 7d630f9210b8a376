//! Product catalog models.

use serde::{Deserialize, Serialize};

/// Placeholder some catalog rows use instead of leaving `image_url` blank.
pub const IMAGE_PLACEHOLDER: &str = "NA";

/// A single treatment recommendation from the product catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    /// Normalized (trimmed, lower-cased) disease identifier
    pub disease_key: String,
    /// Display name of the recommended product
    pub product_name: String,
    /// Product page URL (may be empty)
    pub product_link: String,
    /// Free-text description of the treatment
    pub description: String,
    /// Product image URL, if the catalog has a usable one
    pub image_url: Option<String>,
}

impl ProductRecord {
    /// Create a record with the disease key normalized and the image cleaned up.
    pub fn new(
        disease: &str,
        product_name: &str,
        product_link: &str,
        description: &str,
        image_url: Option<&str>,
    ) -> Self {
        Self {
            disease_key: normalize_key(disease),
            product_name: product_name.trim().to_string(),
            product_link: product_link.trim().to_string(),
            description: description.trim().to_string(),
            image_url: clean_image_url(image_url),
        }
    }

    /// Check the acceptance rule: name, link and description all present.
    ///
    /// A record failing this check must never be rendered as a result.
    pub fn is_complete(&self) -> bool {
        !self.product_name.trim().is_empty()
            && !self.product_link.trim().is_empty()
            && !self.description.trim().is_empty()
    }

    /// Names of the acceptance fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.product_name.trim().is_empty() {
            missing.push("product_name");
        }
        if self.product_link.trim().is_empty() {
            missing.push("product_link");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        missing
    }

    /// Render the record as `key: value` lines, one per catalog column.
    pub fn to_payload(&self) -> String {
        format!(
            "disease: {}\nproduct_name: {}\nproduct_link: {}\ndescription: {}\nimage_url: {}",
            self.disease_key,
            self.product_name,
            self.product_link,
            self.description,
            self.image_url.as_deref().unwrap_or(""),
        )
    }
}

/// Normalize a disease name or query for key lookup.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Map empty and placeholder image values to `None`.
pub fn clean_image_url(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(IMAGE_PLACEHOLDER) {
        None
    } else {
        Some(value.to_string())
    }
}

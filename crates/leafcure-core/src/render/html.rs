//! HTML card markup.
//!
//! Catalog text is never trusted: every interpolated value is escaped and
//! links are limited to http(s).

use super::{ProductCard, DEFAULT_IMAGE};

/// Build the product card markup.
pub fn product_card_html(card: &ProductCard) -> String {
    let name = escape_html(&card.name);
    let description = escape_html(&card.description);
    let link = escape_html(&safe_url(&card.link));
    let image = escape_html(&safe_url(&card.image));
    let fallback = escape_html(DEFAULT_IMAGE);

    format!(
        r#"<div class="recommended-product">
    <div class="product-header">
        <h3>Recommended Treatment</h3>
    </div>
    <div class="product-card">
        <div class="product-image">
            <img src="{image}" alt="{name}" onerror="this.onerror=null;this.src='{fallback}'">
        </div>
        <div class="product-details">
            <h4>{name}</h4>
            <p class="description">{description}</p>
            <a href="{link}" target="_blank" rel="noopener noreferrer" class="buy-button">View Product</a>
        </div>
    </div>
</div>"#
    )
}

/// Build the "nothing found" markup.
pub fn not_found_html(message: &str) -> String {
    format!(r#"<div class="bot-response">{}</div>"#, escape_html(message))
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Keep http(s) URLs, replace anything else (javascript:, data:, …) with `#`.
pub fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, description: &str, link: &str, image: &str) -> ProductCard {
        ProductCard {
            name: name.into(),
            description: description.into(),
            link: link.into(),
            image: image.into(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url(" https://shop/x "), "https://shop/x");
        assert_eq!(safe_url("HTTP://shop"), "HTTP://shop");
        assert_eq!(safe_url("javascript:alert(1)"), "#");
        assert_eq!(safe_url(""), "#");
    }

    #[test]
    fn test_card_escapes_catalog_text() {
        let html = product_card_html(&card(
            "<script>alert(1)</script>",
            "Use \"carefully\"",
            "javascript:alert(1)",
            "https://img/x.png?a=1&b=2",
        ));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Use &quot;carefully&quot;"));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("https://img/x.png?a=1&amp;b=2"));
    }

    #[test]
    fn test_not_found_html() {
        assert_eq!(
            not_found_html("No <luck>"),
            r#"<div class="bot-response">No &lt;luck&gt;</div>"#
        );
    }
}

//! Content extraction functionality for the crawler module
//!
//! Pages are reduced to their visible, content-bearing text. Elements are
//! classified through a fixed tag-role table: anything whose role is
//! [`TagRole::Chrome`] (scripts, styles, navigation, headers, footers, forms,
//! embedded media, interactive controls, document metadata) is dropped together
//! with its subtree before the text is collected.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

/// Role of an HTML element for text extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    /// Text inside the element is page content
    Content,
    /// The element and everything beneath it is page furniture
    Chrome,
}

/// Tags whose subtree never contributes text
const CHROME_TAGS: &[&str] = &[
    // scripting and styling
    "script", "style", "noscript", "template",
    // page furniture
    "nav", "header", "footer",
    // forms and interactive controls
    "form", "button", "input", "select", "option", "optgroup", "textarea", "label", "fieldset",
    "datalist", "dialog", "menu",
    // embedded media
    "iframe", "object", "embed", "svg", "canvas", "img", "picture", "video", "audio", "source",
    "track", "map",
    // document metadata
    "title", "link", "meta", "base",
];

/// Fixed table mapping tag names to their [`TagRole`]
#[derive(Debug, Clone)]
pub struct TagRoleTable {
    chrome: HashSet<&'static str>,
}

impl Default for TagRoleTable {
    fn default() -> Self {
        Self {
            chrome: CHROME_TAGS.iter().copied().collect(),
        }
    }
}

impl TagRoleTable {
    /// Role of the given (lowercase) tag name
    pub fn role(&self, tag: &str) -> TagRole {
        if self.chrome.contains(tag) {
            TagRole::Chrome
        } else {
            TagRole::Content
        }
    }
}

static DEFAULT_ROLES: LazyLock<TagRoleTable> = LazyLock::new(TagRoleTable::default);

static LINK_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| match Selector::parse("a[href]") {
    Ok(selector) => Some(selector),
    Err(e) => {
        warn!("Failed to parse link selector: {}", e);
        None
    }
});

/// Extract the visible text of an HTML document
///
/// Malformed markup yields best-effort, possibly empty, text.
pub fn extract_text(html: &str) -> String {
    extract_text_with(html, &DEFAULT_ROLES)
}

/// Extract visible text using a custom tag-role table
pub fn extract_text_with(html: &str, roles: &TagRoleTable) -> String {
    let document = Html::parse_document(html);

    let fragments = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let in_chrome = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| roles.role(element.name()) == TagRole::Chrome)
            });
            (!in_chrome).then_some(&**text)
        })
        .collect::<Vec<_>>();

    collapse_whitespace(&fragments.join(" "))
}

/// Collapse every whitespace run to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract outgoing http(s) links, resolved against the page URL
///
/// Links are returned in document order; duplicates are left to the caller.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let Some(selector) = LINK_SELECTOR.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect()
}

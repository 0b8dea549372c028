// src/ingest/text.rs
//! Markup helpers: strip HTML fragments to text, collect link targets,
//! and flatten comment trees into one markup blob.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::ExtractError;
use crate::ingest::types::RawComment;

static ANCHOR_WITH_HREF: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Plain text and hyperlink targets of one HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub links: Vec<String>,
}

/// Parse `html` as a fragment. Never fails: the parser recovers from
/// unbalanced or truncated markup the way browsers do.
pub fn extract_text(html: &str) -> Extracted {
    if html.is_empty() {
        return Extracted::default();
    }

    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<String>();
    let links = fragment
        .select(&ANCHOR_WITH_HREF)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect();

    Extracted { text, links }
}

/// Same as [`extract_text`] for raw bytes; rejects input that is not UTF-8.
pub fn extract_text_bytes(raw: &[u8]) -> Result<Extracted, ExtractError> {
    let html = std::str::from_utf8(raw)?;
    Ok(extract_text(html))
}

/// Pre-order concatenation of every comment body in `roots` (siblings in
/// order). Bodies are appended verbatim, markup included.
///
/// Uses an explicit stack so thread depth is bounded by heap, not call stack.
pub fn flatten(roots: &[RawComment]) -> String {
    let mut out = String::new();
    let mut stack: Vec<&RawComment> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if let Some(text) = node.text.as_deref() {
            out.push_str(text);
        }
        stack.extend(node.children.iter().rev());
    }

    out
}

impl RawComment {
    /// Flatten the subtree rooted at this node, this node's text first.
    pub fn flattened(&self) -> String {
        flatten(std::slice::from_ref(self))
    }
}

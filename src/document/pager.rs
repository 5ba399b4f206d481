//! Next-page evidence scan
//!
//! The server renders pagination anchors whose href encodes a page-advance
//! postback. The anchor listing the literal next index is strong evidence of
//! a next page; ellipsis, chevron, and "Next" anchors are weak evidence,
//! accepted because truncated page-number ranges do not always expose the
//! next index as a clickable target. The duplicate-signature guard in the
//! pagination loop is authoritative when this scan is wrong.

use super::signature::element_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Anchor texts treated as weak evidence of further pages
///
/// The last entry is the localized "Next" used by the target application.
pub const CONTINUATION_LABELS: &[&str] = &["...", "›", "»", "Next", "הבא"];

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Decide whether the document shows evidence of a page after `current_page`
///
/// Returns false when the document has no page-advance anchors at all.
pub fn has_next_page(html: &str, current_page: u32) -> bool {
    let doc = Html::parse_document(html);

    let anchors: Vec<_> = doc
        .select(&ANCHOR_SELECTOR)
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.contains("__doPostBack") && href.contains("Page$"))
        })
        .collect();

    if anchors.is_empty() {
        return false;
    }

    let next_target = format!("Page${}", current_page + 1);
    if anchors
        .iter()
        .any(|a| a.value().attr("href").is_some_and(|h| h.contains(&next_target)))
    {
        return true;
    }

    anchors
        .iter()
        .any(|a| CONTINUATION_LABELS.contains(&element_text(*a).as_str()))
}

//! Page content signatures
//!
//! A page signature is the ordered sequence of data-row cell texts on one
//! fetched document, with header, pager chrome, and empty rows removed. Two
//! consecutive pages with equal signatures mean the server re-served the same
//! content, which is the ground-truth end-of-pagination signal.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Glyphs that only ever appear in pager cells
const PAGER_GLYPHS: &[&str] = &["...", "›", "»", "‹", "«", "<", ">", "|"];

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("static selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("static selector"));
static GRID_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table[class*="GridView"]"#).expect("static selector"));
static GRID_CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[id*="gvData"]"#).expect("static selector"));
static ANY_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("static selector"));

/// Trimmed cell texts of a single data row
pub type RowSignature = Vec<String>;

/// Ordered row signatures of one fetched document
///
/// Only ever compared for equality; the cell contents are never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignature {
    rows: Vec<RowSignature>,
}

impl PageSignature {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no data rows were found
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row signatures, in document order
    pub fn rows(&self) -> &[RowSignature] {
        &self.rows
    }
}

/// Reduce a document's data region to its page signature
///
/// The data grid is located by a fixed priority: a table whose class marks it
/// as the grid widget, then a container with a matching id fragment, then the
/// first table in the document. When none match, the signature is empty.
pub fn extract_page_signature(html: &str) -> PageSignature {
    let doc = Html::parse_document(html);
    let Some(grid) = locate_grid(&doc) else {
        return PageSignature::default();
    };

    let mut rows = Vec::new();
    for (index, row) in grid.select(&ROW_SELECTOR).enumerate() {
        // First row is the header
        if index == 0 {
            continue;
        }
        if inside_pager_row(row) {
            continue;
        }

        let cells: Vec<String> = row.select(&CELL_SELECTOR).map(element_text).collect();
        if cells.is_empty() || cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if is_pager_chrome(&cells) {
            continue;
        }

        rows.push(cells);
    }

    PageSignature { rows }
}

/// Classify a row's cells as pagination chrome
///
/// A row is chrome when strictly more than half of its non-empty cells are
/// purely numeric, a run of period characters, or one of the directional and
/// ellipsis glyphs. The threshold must not drift: duplicate detection relies
/// on identical filtering across pages.
pub fn is_pager_chrome(cells: &[String]) -> bool {
    let non_empty: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    if non_empty.is_empty() {
        return false;
    }

    let chrome = non_empty
        .iter()
        .filter(|c| looks_like_pager_cell(c))
        .count();
    2 * chrome > non_empty.len()
}

fn looks_like_pager_cell(cell: &str) -> bool {
    PAGER_GLYPHS.contains(&cell)
        || cell.chars().all(|c| c.is_ascii_digit())
        || cell.chars().all(|c| c == '.')
}

fn locate_grid<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    doc.select(&GRID_TABLE_SELECTOR)
        .next()
        .or_else(|| doc.select(&GRID_CONTAINER_SELECTOR).next())
        .or_else(|| doc.select(&ANY_TABLE_SELECTOR).next())
}

/// Whether the row sits inside a pager row of an enclosing table
fn inside_pager_row(row: ElementRef<'_>) -> bool {
    row.ancestors().filter_map(ElementRef::wrap).any(|el| {
        el.value().name() == "tr"
            && el
                .value()
                .attr("class")
                .is_some_and(|class| class.contains("Pager"))
    })
}

/// Concatenated, per-segment-trimmed text of an element
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

//! Grid row → class record conversion

use crate::document::element_text;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

static GRID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table[id*="gvData"]"#).expect("static selector"));
static DATA_ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.GridRow").expect("static selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("static selector"));

/// Date format the grid renders
const DATE_FORMAT: &str = "%d/%m/%Y";

/// One scheduled class, as rendered in the grid's eight columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class date
    pub date: NaiveDate,
    /// Weekday as rendered (e.g. `ב'`)
    pub day: String,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Course name
    pub course_name: String,
    /// Teachers column
    pub teachers: String,
    /// Room column
    pub room: String,
    /// Free-text note column
    pub note: String,
}

/// Extract the class records of a single page
///
/// Rows with fewer than eight cells, an empty date, an empty start time, or
/// an unparseable date are skipped.
pub fn extract_records(html: &str) -> Vec<ClassRecord> {
    let doc = Html::parse_document(html);
    let Some(grid) = doc.select(&GRID_SELECTOR).next() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for row in grid.select(&DATA_ROW_SELECTOR) {
        let cells: Vec<String> = row.select(&CELL_SELECTOR).map(element_text).collect();
        if cells.len() < 8 {
            continue;
        }
        if cells[0].is_empty() || cells[2].is_empty() {
            continue;
        }

        let date = match NaiveDate::parse_from_str(&cells[0], DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                warn!("could not parse date '{}', skipping row", cells[0]);
                continue;
            }
        };

        records.push(ClassRecord {
            date,
            day: cells[1].clone(),
            start_time: cells[2].clone(),
            end_time: cells[3].clone(),
            course_name: cells[4].clone(),
            teachers: cells[5].clone(),
            room: cells[6].clone(),
            note: cells[7].clone(),
        });
    }

    records
}

/// Extract the records of every page, in page order
///
/// Placeholder entries the portal renders with a `00:00` start time are
/// dropped from the combined result.
pub fn extract_all(pages: &[String]) -> Vec<ClassRecord> {
    let all: Vec<ClassRecord> = pages.iter().flat_map(|p| extract_records(p)).collect();

    let total = all.len();
    let kept: Vec<ClassRecord> = all
        .into_iter()
        .filter(|r| r.start_time != "00:00")
        .collect();
    let removed = total - kept.len();
    if removed > 0 {
        info!("filtered out {removed} placeholder record(s) with a 00:00 start time");
    }

    kept
}

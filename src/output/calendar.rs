//! Calendar file generation
//!
//! Renders records as an RFC 5545 calendar, one event per class. Times are
//! emitted as floating local times with the calendar's timezone declared via
//! `X-WR-TIMEZONE`, matching how the portal publishes its schedule. Colour
//! labels travel both as an `X-GOOGLE-CALENDAR-COLOR-ID` property and a
//! named category for other calendar apps.

use crate::error::{Error, Result};
use crate::extract::ClassRecord;
use crate::rules::{color_name, RuleSet};
use chrono::{NaiveTime, Utc};
use std::path::Path;
use tracing::{info, warn};

/// Maximum content-line length before folding, in octets
const FOLD_LIMIT: usize = 75;

/// Time format the grid renders
const TIME_FORMAT: &str = "%H:%M";

/// Calendar-level settings
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    /// Calendar display name
    pub name: String,
    /// Declared timezone for the floating event times
    pub timezone: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            name: "College Calendar".to_string(),
            timezone: "Asia/Jerusalem".to_string(),
        }
    }
}

/// Render records as an RFC 5545 calendar
///
/// Records whose start or end time does not parse are skipped with a
/// warning; everything else becomes one `VEVENT`.
pub fn generate_ics(records: &[ClassRecord], rules: &RuleSet, options: &CalendarOptions) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//gridscrape//Schedule Export//EN".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(&options.name)),
        format!("X-WR-TIMEZONE:{}", options.timezone),
    ];

    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let mut emitted = 0usize;

    for (index, record) in records.iter().enumerate() {
        let start = match NaiveTime::parse_from_str(&record.start_time, TIME_FORMAT) {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    "could not parse start time '{}' for '{}', skipping event",
                    record.start_time, record.course_name
                );
                continue;
            }
        };
        let end = match NaiveTime::parse_from_str(&record.end_time, TIME_FORMAT) {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    "could not parse end time '{}' for '{}', skipping event",
                    record.end_time, record.course_name
                );
                continue;
            }
        };

        let color = rules.assign_color(record);
        let date = record.date.format("%Y%m%d");

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!(
            "UID:{date}-{}-{index}@gridscrape",
            start.format("%H%M")
        ));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("DTSTART:{date}T{}", start.format("%H%M%S")));
        lines.push(format!("DTEND:{date}T{}", end.format("%H%M%S")));
        lines.push(format!(
            "SUMMARY:{}",
            escape_text(&clean_summary(&record.course_name))
        ));
        if !record.room.is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(&record.room)));
        }
        if let Some(description) = build_description(record) {
            lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        }
        lines.push(format!("CATEGORIES:{}", color_name(color)));
        lines.push(format!("X-GOOGLE-CALENDAR-COLOR-ID:{color}"));
        lines.push("END:VEVENT".to_string());
        emitted += 1;
    }

    lines.push("END:VCALENDAR".to_string());
    info!("generated calendar with {emitted} event(s)");

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Save a rendered calendar to disk
pub async fn save_calendar(path: impl AsRef<Path>, ics: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::output(format!(
                "failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    tokio::fs::write(path, ics)
        .await
        .map_err(|e| Error::output(format!("failed to write {}: {e}", path.display())))?;
    info!("calendar saved to {}", path.display());
    Ok(())
}

/// Strip the language and delivery-mode suffixes off a course name
fn clean_summary(course_name: &str) -> String {
    course_name
        .replace(" (ENG)", "")
        .replace("(ENG)", "")
        .replace(" (מקוון סינכרוני)", "")
        .replace("(מקוון סינכרוני)", "")
        .trim()
        .to_string()
}

/// Teacher and note, joined for the event description
fn build_description(record: &ClassRecord) -> Option<String> {
    let mut parts = Vec::new();
    if !record.teachers.is_empty() {
        parts.push(format!("מרצה: {}", record.teachers));
    }
    if !record.note.is_empty() {
        parts.push(format!("הערה: {}", record.note));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Escape TEXT values per RFC 5545 §3.3.11
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Fold a content line at 75 octets, continuation lines prefixed with a space
fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 8);
    let mut width = 0usize;
    for ch in line.chars() {
        let octets = ch.len_utf8();
        if width + octets > FOLD_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += octets;
    }
    out
}

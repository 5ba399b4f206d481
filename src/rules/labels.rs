//! Colour assignment

use crate::error::{Error, Result};
use crate::extract::ClassRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Colour for synchronous-online and Zoom classes
pub const COLOR_ONLINE: u8 = 9;
/// Colour for Monday classes
pub const COLOR_MONDAY: u8 = 5;
/// Colour for everything else
pub const COLOR_DEFAULT: u8 = 11;

/// Course-name marker of a synchronous-online class
const ONLINE_MARKER: &str = "מקוון סינכרוני";
/// Note marker of a Zoom class
const ZOOM_MARKER: &str = "זום";
/// Weekday string for Monday
const MONDAY: &str = "ב'";

/// Human-readable name for a calendar colour id
pub fn color_name(id: u8) -> &'static str {
    match id {
        1 => "Lavender",
        2 => "Sage",
        3 => "Grape",
        4 => "Flamingo",
        5 => "Yellow-Monday",
        6 => "Tangerine",
        7 => "Peacock",
        8 => "Graphite",
        9 => "Blue-Zoom",
        10 => "Basil",
        11 => "Tomato",
        _ => "Default",
    }
}

/// Assign a colour by the built-in priority rules
///
/// 1. Synchronous-online course → blue, even on Monday
/// 2. Note mentions Zoom → blue
/// 3. Monday → yellow
/// 4. Everything else → red
pub fn builtin_color(record: &ClassRecord) -> u8 {
    if record.course_name.contains(ONLINE_MARKER) {
        return COLOR_ONLINE;
    }
    if record.note.contains(ZOOM_MARKER) {
        return COLOR_ONLINE;
    }
    if record.day == MONDAY {
        return COLOR_MONDAY;
    }
    COLOR_DEFAULT
}

/// Labelling rules: built-ins plus per-course overrides
///
/// An override key matches a record when it is a substring of the course
/// name, so both exact names and stable name fragments work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Course key → colour id
    #[serde(default)]
    pub courses: BTreeMap<String, u8>,
}

impl RuleSet {
    /// A rule set with no overrides
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a rule set from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a rule set from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read rules file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Assign a colour to a record, overrides first
    pub fn assign_color(&self, record: &ClassRecord) -> u8 {
        for (key, color) in &self.courses {
            if record.course_name.contains(key.as_str()) {
                debug!(course = %record.course_name, key = %key, "override matched");
                return *color;
            }
        }
        builtin_color(record)
    }

    /// Check that every override matches at least one record
    ///
    /// Returns an error naming the stale keys, so a typo or a course that
    /// left the schedule is caught instead of silently ignored.
    pub fn validate(&self, records: &[ClassRecord]) -> Result<()> {
        let unmatched: Vec<&str> = self
            .courses
            .keys()
            .filter(|key| !records.iter().any(|r| r.course_name.contains(key.as_str())))
            .map(String::as_str)
            .collect();

        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(Error::rules(format!(
                "course overrides match no class: {}",
                unmatched.join(", ")
            )))
        }
    }
}

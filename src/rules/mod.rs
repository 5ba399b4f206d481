//! Record labelling rules
//!
//! Assigns a calendar colour to every class record: fixed priority rules for
//! the common cases, plus per-course overrides loaded from a YAML file.
//! Overrides are validated against the actual records so a typo in a course
//! name fails loudly instead of silently never matching.

mod labels;

pub use labels::{
    builtin_color, color_name, RuleSet, COLOR_DEFAULT, COLOR_MONDAY, COLOR_ONLINE,
};

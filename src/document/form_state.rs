//! Hidden form state extraction
//!
//! WebForms pages embed opaque state tokens in hidden inputs. The server
//! rejects any postback that does not echo back the tokens of the page it
//! most recently served, so every fetched document must be mined for them
//! before the next request can be built.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

/// Hidden fields recognized as per-request server state
pub const HIDDEN_STATE_FIELDS: &[&str] = &[
    "__VIEWSTATE",
    "__EVENTVALIDATION",
    "__PageDataKey",
    "tvMain_ExpandState",
    "tvMain_SelectedNode",
];

/// The field a postback cannot succeed without
pub const VIEW_STATE_FIELD: &str = "__VIEWSTATE";

static INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name]").expect("static selector"));
static SELECT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("select[name]").expect("static selector"));
static SELECTED_OPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[selected]").expect("static selector"));

/// Opaque per-request form state, always derived from the most recently
/// fetched document
///
/// Never constructed field-by-field by callers; [`extract_form_state`] is the
/// only producer. Between pages the state is merged, not replaced: keys the
/// newer document omits keep their previous value, keys it repeats are
/// overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: BTreeMap<String, String>,
}

impl FormState {
    /// Create an empty form state
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Merge a newer extraction into this state
    ///
    /// Every key present in `newer` overrides the current value; keys absent
    /// from `newer` are retained.
    pub fn merge(&mut self, newer: FormState) {
        self.fields.extend(newer.fields);
    }

    /// Whether the document carried a view-state token
    pub fn has_view_state(&self) -> bool {
        self.fields.contains_key(VIEW_STATE_FIELD)
    }

    /// Iterate over fields in deterministic order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were found
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FormState {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Extract the recognized hidden state fields and the selected value of every
/// selection control present in `html`
///
/// Fields absent from the document are simply omitted, never an error.
pub fn extract_form_state(html: &str) -> FormState {
    let doc = Html::parse_document(html);
    let mut state = FormState::new();

    for input in doc.select(&INPUT_SELECTOR) {
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        if HIDDEN_STATE_FIELDS.contains(&name) {
            state.insert(name, input.value().attr("value").unwrap_or(""));
        }
    }

    for select in doc.select(&SELECT_SELECTOR) {
        let Some(name) = select.value().attr("name") else {
            continue;
        };
        if let Some(option) = select.select(&SELECTED_OPTION_SELECTOR).next() {
            state.insert(name, option.value().attr("value").unwrap_or(""));
        }
    }

    state
}

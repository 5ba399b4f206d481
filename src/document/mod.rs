//! HTML document analysis
//!
//! Pure functions over fetched documents, no I/O:
//!
//! - **Form state extraction**: collects the hidden per-request state tokens
//!   (view state, event validation, page data key, tree state) and the
//!   selected value of every selection control
//! - **Page signatures**: reduces the data grid to an ordered sequence of
//!   row signatures for duplicate-page detection, dropping pager chrome
//! - **Pager scan**: decides from the pagination anchors whether the server
//!   advertises a next page
//!
//! The chrome classifier and the anchor scan are deliberately free functions
//! so their heuristics can be characterized in isolation.

mod form_state;
mod pager;
mod signature;

pub use form_state::{extract_form_state, FormState, HIDDEN_STATE_FIELDS, VIEW_STATE_FIELD};
pub use pager::{has_next_page, CONTINUATION_LABELS};
pub use signature::{extract_page_signature, is_pager_chrome, PageSignature, RowSignature};

pub(crate) use signature::element_text;

//! Pagination protocol state machine
//!
//! Drives the postback pagination loop of a WebForms data grid:
//!
//! ```text
//! Init → FirstFetch → (OptionalFilteredFetch) → PageLoop → Done
//! ```
//!
//! Every request depends on the form state extracted from the previous
//! response, so a run is strictly sequential and pages are fetched in
//! increasing order only. The loop ends when the document stops advertising
//! a next page, or when a page-advance request re-serves content identical
//! to the previous page; the duplicate check is the authoritative guard.

mod controller;
mod types;

pub use controller::{postback_body, PagerSettings, PaginationController};
pub use types::{PaginationState, RunError, RunReport, Termination};

#[cfg(test)]
mod tests;

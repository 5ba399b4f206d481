//! Pagination run types

use crate::document::{FormState, PageSignature};
use crate::error::Error;
use thiserror::Error;

/// Why a pagination run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The current document showed no evidence of a next page
    NoNextPage,
    /// A page-advance request re-served the previous page's content
    DuplicatePage,
}

/// Mutable state of one pagination run
///
/// Created when the run starts, mutated once per successful fetch, discarded
/// when the run ends. The form state always belongs to the most recently
/// fetched document; a stale state is never reused once a newer document has
/// been seen.
#[derive(Debug, Clone)]
pub struct PaginationState {
    /// Current page number, monotonically increasing from 1
    pub page: u32,
    /// Form state of the most recently fetched document
    pub form_state: FormState,
    /// Signature of the most recently appended page
    pub previous_signature: PageSignature,
}

impl PaginationState {
    /// Create the state for a freshly fetched first page
    pub fn new(form_state: FormState, previous_signature: PageSignature) -> Self {
        Self {
            page: 1,
            form_state,
            previous_signature,
        }
    }

    /// Advance to the next page number
    pub fn advance(&mut self) {
        self.page += 1;
    }
}

/// Result of a completed pagination run
#[derive(Debug)]
pub struct RunReport {
    /// The fetched documents, in page order, duplicates excluded
    pub pages: Vec<String>,
    /// How the run ended
    pub termination: Termination,
    /// Number of HTTP requests issued (may exceed `pages.len()`)
    pub requests: u32,
}

/// A failed run, carrying the pages already collected
///
/// Callers may persist the partial result rather than discard it.
#[derive(Error, Debug)]
#[error("run failed after collecting {} page(s): {source}", .pages.len())]
pub struct RunError {
    /// Pages collected before the failure
    pub pages: Vec<String>,
    /// The underlying failure
    #[source]
    pub source: Error,
}

impl RunError {
    /// Wrap an error together with the pages collected so far
    pub fn new(pages: Vec<String>, source: Error) -> Self {
        Self { pages, source }
    }
}

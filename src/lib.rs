//! # gridscrape
//!
//! Stateful scraper for legacy WebForms data grids with postback pagination.
//!
//! Legacy forms-based portals keep their pagination state server-side:
//! every page advance is a simulated control event carried by a POST that
//! must echo back the opaque state tokens of the page the server rendered
//! last. This crate drives that protocol to completion and turns the result
//! into structured records and calendar files.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ScrapeEngine                          │
//! │  check_session()    fetch_pages() → RunReport    run()       │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────┬───────────┬─────┴─────────┬───────────┬──────────┐
//! │ Session  │   HTTP    │  Pagination   │  Extract  │  Output  │
//! ├──────────┼───────────┼───────────────┼───────────┼──────────┤
//! │ Validate │ GET/POST  │ Form state    │ Records   │ Pages    │
//! │ Login    │ Retry     │ Signatures    │ Rules     │ JSON     │
//! │ Cookies  │ Backoff   │ Pager scan    │ Labels    │ ICS      │
//! │          │ Pacing    │ Termination   │           │          │
//! └──────────┴───────────┴───────────────┴───────────┴──────────┘
//! ```
//!
//! The pagination loop is strictly sequential: each request depends on the
//! form state extracted from the previous response. Its two termination
//! guards are the pager-anchor scan and, authoritatively, duplicate content
//! detection via page signatures.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// HTTP transport with retry and cookie persistence
pub mod http;

/// HTML document analysis (form state, signatures, pager scan)
pub mod document;

/// Session validation, login, and cookie persistence
pub mod session;

/// The pagination protocol state machine
pub mod pagination;

/// Record extraction from fetched pages
pub mod extract;

/// Record labelling rules
pub mod rules;

/// Output writers (pages, JSON, calendar)
pub mod output;

/// Pipeline orchestration
pub mod engine;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::RunConfig;
pub use engine::{ScrapeEngine, ScrapeReport};
pub use error::{Error, Result};
pub use pagination::{PaginationController, RunReport, Termination};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

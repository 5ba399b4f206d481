//! CLI module
//!
//! Command-line interface for running the scraper.
//!
//! # Commands
//!
//! - `login` - Log in and refresh the stored session cookies
//! - `check` - Confirm the stored session is still authenticated
//! - `fetch` - Fetch all pages of the grid and save them
//! - `parse` - Parse saved pages into structured records
//! - `calendar` - Generate a calendar file from parsed records
//! - `validate-rules` - Check rule overrides against parsed records
//! - `run` - Full pipeline: fetch, parse, label, emit

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;

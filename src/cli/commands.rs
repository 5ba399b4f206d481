//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scraper for legacy WebForms data grids with postback pagination
#[derive(Parser, Debug)]
#[command(name = "gridscrape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file (JSON)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Session cookie file
    #[arg(long, global = true, default_value = ".cookies.json")]
    pub cookies: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and refresh the stored session cookies
    Login {
        /// Login username (falls back to config, then GRIDSCRAPE_USERNAME)
        #[arg(long)]
        username: Option<String>,

        /// Login password (falls back to config, then GRIDSCRAPE_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Confirm the stored session is still authenticated
    Check,

    /// Fetch all pages of the grid and save them
    Fetch,

    /// Parse saved pages into structured records
    Parse,

    /// Generate a calendar file from parsed records
    Calendar {
        /// Output path (defaults to the configured calendar path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check rule overrides against parsed records
    ValidateRules,

    /// Full pipeline: fetch, parse, label, emit
    Run,
}

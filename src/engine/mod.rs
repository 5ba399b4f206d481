//! Scrape engine
//!
//! Ties the pipeline together: validate the session, drive the pagination
//! loop, extract records, label them, and write the output artifacts. The
//! stage commands of the CLI reuse the same pieces individually.

mod types;

pub use types::{RunStats, ScrapeReport};

use crate::config::RunConfig;
use crate::error::Result;
use crate::extract::extract_all;
use crate::http::HttpClient;
use crate::output::{generate_ics, save_calendar, save_pages, save_records, CalendarOptions};
use crate::pagination::{PagerSettings, PaginationController, RunReport};
use crate::rules::RuleSet;
use crate::session::SessionValidator;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

/// Orchestrates one scrape run end to end
pub struct ScrapeEngine {
    client: HttpClient,
    config: RunConfig,
}

impl ScrapeEngine {
    /// Build an engine from a run config, seeding the cookie jar with the
    /// configured session cookies
    pub fn new(config: RunConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_client_config()?);
        let url = Url::parse(&config.url)?;
        client.add_cookies(
            &url,
            config.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        Ok(Self { client, config })
    }

    /// The engine's HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The run config
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Confirm the session is still authenticated
    pub async fn check_session(&self) -> Result<()> {
        SessionValidator::new()
            .validate(&self.client, &self.config.url)
            .await
    }

    /// Validate the session and fetch every page of the grid
    ///
    /// On a mid-run failure the pages collected so far are persisted to the
    /// output directory before the error is surfaced, so partial progress is
    /// never lost.
    pub async fn fetch_pages(&self) -> Result<RunReport> {
        self.check_session().await?;

        let controller = PaginationController::new(&self.client, &self.config.url).with_settings(
            PagerSettings {
                event_target: self.config.event_target.clone(),
            },
        );

        match controller.run(self.config.form_data.as_ref()).await {
            Ok(report) => Ok(report),
            Err(run_err) => {
                if !run_err.pages.is_empty() {
                    warn!(
                        "run failed, persisting {} partial page(s)",
                        run_err.pages.len()
                    );
                    save_pages(self.config.output.pages_dir(), &run_err.pages).await?;
                }
                Err(run_err.source)
            }
        }
    }

    /// Run the full pipeline: fetch, extract, label, emit
    pub async fn run(&self) -> Result<ScrapeReport> {
        let start = Instant::now();

        let report = self.fetch_pages().await?;
        save_pages(self.config.output.pages_dir(), &report.pages).await?;

        let records = extract_all(&report.pages);

        let rules = match &self.config.rules_file {
            Some(path) => RuleSet::load(path)?,
            None => RuleSet::empty(),
        };
        rules.validate(&records)?;

        save_records(self.config.output.records_path(), &records).await?;

        let options = CalendarOptions {
            name: self.config.output.calendar_name.clone(),
            timezone: self.config.output.timezone.clone(),
        };
        let ics = generate_ics(&records, &rules, &options);
        save_calendar(self.config.output.calendar_path(), &ics).await?;

        let stats = RunStats {
            pages_fetched: report.pages.len(),
            requests_issued: report.requests,
            records_extracted: records.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            pages = stats.pages_fetched,
            records = stats.records_extracted,
            duration_ms = stats.duration_ms,
            "scrape run complete"
        );

        Ok(ScrapeReport {
            termination: report.termination,
            stats,
        })
    }
}

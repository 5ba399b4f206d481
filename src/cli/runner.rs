//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::RunConfig;
use crate::engine::ScrapeEngine;
use crate::error::{Error, Result};
use crate::extract::extract_all;
use crate::http::HttpClient;
use crate::output::{
    generate_ics, load_pages, load_records, save_calendar, save_pages, save_records,
    CalendarOptions,
};
use crate::rules::RuleSet;
use crate::session::{load_cookies, login, save_cookies, LoginConfig};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Login { username, password } => {
                self.login(username.as_deref(), password.as_deref()).await
            }
            Commands::Check => self.check().await,
            Commands::Fetch => self.fetch().await,
            Commands::Parse => self.parse().await,
            Commands::Calendar { output } => self.calendar(output.as_deref()).await,
            Commands::ValidateRules => self.validate_rules().await,
            Commands::Run => self.run_pipeline().await,
        }
    }

    /// Load the run config
    fn load_config(&self) -> Result<RunConfig> {
        RunConfig::from_file(&self.cli.config)
    }

    /// Load the run config and merge in the stored session cookies
    async fn load_config_with_cookies(&self) -> Result<RunConfig> {
        let mut config = self.load_config()?;
        if self.cli.cookies.exists() {
            let stored = load_cookies(&self.cli.cookies).await?;
            config.cookies.extend(stored);
        }
        if config.cookies.is_empty() {
            return Err(Error::config(
                "no session cookies available; run the login command or add cookies to the config",
            ));
        }
        Ok(config)
    }

    async fn login(&self, username: Option<&str>, password: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let settings = config
            .login
            .as_ref()
            .ok_or_else(|| Error::missing_field("login"))?;

        let username = username
            .map(str::to_string)
            .or_else(|| settings.username.clone())
            .or_else(|| std::env::var("GRIDSCRAPE_USERNAME").ok())
            .ok_or_else(|| {
                Error::config("username not provided (flag, config, or GRIDSCRAPE_USERNAME)")
            })?;
        let password = password
            .map(str::to_string)
            .or_else(|| settings.password.clone())
            .or_else(|| std::env::var("GRIDSCRAPE_PASSWORD").ok())
            .ok_or_else(|| {
                Error::config("password not provided (flag, config, or GRIDSCRAPE_PASSWORD)")
            })?;

        let client = HttpClient::with_config(config.http_client_config()?);
        let mut login_config = LoginConfig::new(&settings.login_url, username, password);
        if let Some(return_url) = &settings.return_url {
            login_config.return_url = return_url.clone();
        }

        let cookies = login(&client, &login_config).await?;
        save_cookies(&self.cli.cookies, &cookies).await?;

        println!(
            "Login successful; cookies saved to {}",
            self.cli.cookies.display()
        );
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let config = self.load_config_with_cookies().await?;
        let engine = ScrapeEngine::new(config)?;
        engine.check_session().await?;
        println!("Session OK");
        Ok(())
    }

    async fn fetch(&self) -> Result<()> {
        let config = self.load_config_with_cookies().await?;
        let engine = ScrapeEngine::new(config)?;
        let report = engine.fetch_pages().await?;
        save_pages(engine.config().output.pages_dir(), &report.pages).await?;

        println!(
            "Fetched {} page(s) in {} request(s) to {}",
            report.pages.len(),
            report.requests,
            engine.config().output.pages_dir().display()
        );
        Ok(())
    }

    async fn parse(&self) -> Result<()> {
        let config = self.load_config()?;
        let pages = load_pages(config.output.pages_dir()).await?;
        let records = extract_all(&pages);
        save_records(config.output.records_path(), &records).await?;

        println!(
            "Extracted {} record(s) from {} page(s)",
            records.len(),
            pages.len()
        );
        Ok(())
    }

    async fn calendar(&self, output: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let records = load_records(config.output.records_path()).await?;
        let rules = self.load_rules(&config)?;
        rules.validate(&records)?;

        let options = CalendarOptions {
            name: config.output.calendar_name.clone(),
            timezone: config.output.timezone.clone(),
        };
        let ics = generate_ics(&records, &rules, &options);

        let default_path = config.output.calendar_path();
        let path = output.unwrap_or(&default_path);
        save_calendar(path, &ics).await?;

        println!(
            "Calendar with {} record(s) written to {}",
            records.len(),
            path.display()
        );
        Ok(())
    }

    async fn validate_rules(&self) -> Result<()> {
        let config = self.load_config()?;
        let rules_file = config
            .rules_file
            .as_ref()
            .ok_or_else(|| Error::missing_field("rules_file"))?;
        let rules = RuleSet::load(rules_file)?;
        let records = load_records(config.output.records_path()).await?;

        rules.validate(&records)?;
        println!(
            "All {} course override(s) match the current schedule",
            rules.courses.len()
        );
        Ok(())
    }

    async fn run_pipeline(&self) -> Result<()> {
        let config = self.load_config_with_cookies().await?;
        let engine = ScrapeEngine::new(config)?;
        let report = engine.run().await?;

        println!(
            "Run complete: {} page(s), {} record(s) in {}ms ({:?})",
            report.stats.pages_fetched,
            report.stats.records_extracted,
            report.stats.duration_ms,
            report.termination
        );
        Ok(())
    }

    fn load_rules(&self, config: &RunConfig) -> Result<RuleSet> {
        match &config.rules_file {
            Some(path) => RuleSet::load(path),
            None => Ok(RuleSet::empty()),
        }
    }
}

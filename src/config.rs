//! Run configuration
//!
//! A scrape run is described by a JSON config file: the target URL, session
//! cookies (usually refreshed by the login command instead), optional search
//! filter fields, HTTP tuning, and output locations.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Complete configuration for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// URL of the grid page
    pub url: String,

    /// Session cookies to seed the run with
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,

    /// Search filter fields submitted once before pagination (e.g. a year
    /// selector or date range)
    #[serde(default)]
    pub form_data: Option<BTreeMap<String, String>>,

    /// Control id of the grid widget that owns pagination
    #[serde(default = "default_event_target")]
    pub event_target: String,

    /// HTTP client tuning
    #[serde(default)]
    pub http: HttpSettings,

    /// Output locations and calendar settings
    #[serde(default)]
    pub output: OutputSettings,

    /// Login flow settings (optional; cookies can be supplied directly)
    #[serde(default)]
    pub login: Option<LoginSettings>,

    /// Path to the YAML rules file with per-course colour overrides
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
}

fn default_event_target() -> String {
    "ctl00$ContentPlaceHolder1$gvData".to_string()
}

impl RunConfig {
    /// Load and validate a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for required fields
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::missing_field("url"));
        }
        Url::parse(&self.url)?;
        Ok(())
    }

    /// Derive the HTTP client configuration for this run
    ///
    /// The fixed header set includes a referer and origin pointing back at
    /// the target, which the portal expects on postbacks.
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        let url = Url::parse(&self.url)?;
        let origin = url.origin().ascii_serialization();

        Ok(HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_secs))
            .max_retries(self.http.max_retries)
            .rate_limit(RateLimiterConfig::new(self.http.requests_per_second, 1))
            .header("Referer", self.url.clone())
            .header("Origin", origin)
            .build())
    }
}

/// HTTP client tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Read timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Polite pacing between requests
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_requests_per_second() -> u32 {
    2
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Output locations and calendar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Root output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Calendar display name
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Declared timezone for event times
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_calendar_name() -> String {
    "College Calendar".to_string()
}

fn default_timezone() -> String {
    "Asia/Jerusalem".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            calendar_name: default_calendar_name(),
            timezone: default_timezone(),
        }
    }
}

impl OutputSettings {
    /// Directory the raw pages are written to
    pub fn pages_dir(&self) -> PathBuf {
        self.dir.join("html")
    }

    /// Path of the records JSON file
    pub fn records_path(&self) -> PathBuf {
        self.dir.join("json").join("classes.json")
    }

    /// Path of the calendar file
    pub fn calendar_path(&self) -> PathBuf {
        self.dir.join("calendar.ics")
    }
}

/// Settings for the credential login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSettings {
    /// URL of the login page
    pub login_url: String,

    /// `ReturnUrl` form field value
    #[serde(default)]
    pub return_url: Option<String>,

    /// Username; usually supplied via flag or environment instead
    #[serde(default)]
    pub username: Option<String>,

    /// Password; usually supplied via flag or environment instead
    #[serde(default)]
    pub password: Option<String>,
}

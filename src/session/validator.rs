//! Session validation
//!
//! An expired or rejected session does not fail loudly: the server answers
//! 200 and simply serves its login page, either via redirect or inline. The
//! validator issues one probe GET and inspects both the final URL and the
//! body before any pagination is attempted. A failed session is never
//! retried here; refreshing credentials is the caller's job.

use crate::error::{Error, Result};
use crate::http::Transport;
use tracing::debug;
use url::Url;

/// Body fragments that identify the login page even under HTTP 200
pub const LOGIN_MARKERS: &[&str] = &["Login.aspx", "edtUsername", "edtPassword", "btnLogin"];

/// Checks that a session token is still authenticated before use
#[derive(Debug, Clone)]
pub struct SessionValidator {
    markers: Vec<String>,
}

impl Default for SessionValidator {
    fn default() -> Self {
        Self {
            markers: LOGIN_MARKERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SessionValidator {
    /// Create a validator with the default login-page markers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom login-page markers
    pub fn with_markers(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// Probe `url` with the current session; succeed silently or fail with a
    /// session error
    pub async fn validate(&self, transport: &dyn Transport, url: &str) -> Result<()> {
        let resp = transport.get(url).await?;

        if is_login_url(&resp.final_url)? {
            return Err(Error::session(format!(
                "redirected to login page: {}",
                resp.final_url
            )));
        }

        if let Some(marker) = self.markers.iter().find(|m| resp.body.contains(m.as_str())) {
            return Err(Error::session(format!(
                "login page marker '{marker}' present in response"
            )));
        }

        debug!(url, "session is valid");
        Ok(())
    }
}

/// Whether a final response URL points at the login page
pub(crate) fn is_login_url(final_url: &str) -> Result<bool> {
    let url = Url::parse(final_url)?;
    Ok(url.path().to_ascii_lowercase().contains("login"))
}

//! Cookie file persistence
//!
//! Session cookies are kept in a small JSON file between runs so the login
//! flow only needs to execute when the stored session has expired. Writes go
//! through a temp file and rename.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Load cookies from a JSON file
pub async fn load_cookies(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::config(format!("failed to read cookie file {}: {e}", path.display()))
    })?;
    let cookies: BTreeMap<String, String> = serde_json::from_str(&contents)?;
    debug!(path = %path.display(), count = cookies.len(), "loaded cookies");
    Ok(cookies)
}

/// Save cookies to a JSON file, atomically
pub async fn save_cookies(path: impl AsRef<Path>, cookies: &BTreeMap<String, String>) -> Result<()> {
    let path = path.as_ref();
    let contents = serde_json::to_string_pretty(cookies)?;

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &contents).await.map_err(|e| {
        Error::output(format!(
            "failed to write cookie file {}: {e}",
            temp_path.display()
        ))
    })?;
    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        Error::output(format!(
            "failed to rename cookie file into place at {}: {e}",
            path.display()
        ))
    })?;

    debug!(path = %path.display(), count = cookies.len(), "saved cookies");
    Ok(())
}

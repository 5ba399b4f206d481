//! Record JSON persistence

use crate::error::{Error, Result};
use crate::extract::ClassRecord;
use std::path::Path;
use tracing::info;

/// Save records as pretty-printed JSON
pub async fn save_records(path: impl AsRef<Path>, records: &[ClassRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::output(format!(
                "failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let contents = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::output(format!("failed to write {}: {e}", path.display())))?;

    info!("saved {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Load records from a JSON file
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<ClassRecord>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::config(format!("failed to read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

//! Raw page persistence
//!
//! Pages are written as `page_001.html`, `page_002.html`, … so the parse
//! stage can re-read them in fetch order without any index file.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Save raw page bodies to numbered HTML files under `dir`
pub async fn save_pages(dir: impl AsRef<Path>, pages: &[String]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        Error::output(format!(
            "failed to create page directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut paths = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(format!("page_{:03}.html", index + 1));
        tokio::fs::write(&path, page).await.map_err(|e| {
            Error::output(format!("failed to write {}: {e}", path.display()))
        })?;
        paths.push(path);
    }

    info!("saved {} page(s) to {}", pages.len(), dir.display());
    Ok(paths)
}

/// Load previously saved pages from `dir`, in page order
pub async fn load_pages(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        Error::config(format!(
            "failed to read page directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("page_") && name.ends_with(".html") {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        pages.push(tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::config(format!("failed to read {}: {e}", path.display()))
        })?);
    }
    Ok(pages)
}

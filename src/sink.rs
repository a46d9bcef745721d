//! Delivery of translated documents to the local filesystem
//!
//! The HTTP half of result delivery lives in the server module, which wraps
//! the same [`TranslationResult`] in a download response.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::errors::Result;
use crate::core::models::TranslationResult;

/// Write a translation result into a directory, returning the written path
///
/// The directory is created when missing; an existing file with the same
/// name is overwritten, matching the staging store's overwrite semantics.
pub async fn write_to_dir(result: &TranslationResult, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(&result.file_name);
    tokio::fs::write(&path, &result.bytes).await?;

    info!("Translated document written to {}", path.display());
    Ok(path)
}

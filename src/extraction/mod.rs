//! Archive extraction
//!
//! GitHub serves every artifact as a ZIP bundle, so that is the only format
//! handled here. Extraction is blocking and is run off the async runtime via
//! [`prepare_and_extract`].

mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use zip::ZipExtractor;

use crate::error::{Error, ExtractionError, Result};
use crate::utils::empty_directory_except;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// Empty `dest_path` and unpack `archive_path` into it
///
/// Both steps run in `spawn_blocking`. If the destination cannot be prepared
/// the archive is left untouched and extraction is not attempted. An archive
/// stored inside `dest_path` survives the cleanup.
pub async fn prepare_and_extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
    let archive_owned = archive_path.to_path_buf();
    let dest_owned = dest_path.to_path_buf();

    spawn_blocking(move || {
        if let Err(e) = empty_directory_except(&dest_owned, Some(&archive_owned)) {
            warn!(
                dest_path = ?dest_owned,
                error = %e,
                "skipping extraction due to issues with the target directory"
            );
            return Err(e);
        }

        info!(archive_path = ?archive_owned, dest_path = ?dest_owned, "extracting archive");
        ZipExtractor::extract(&archive_owned, &dest_owned)
    })
    .await
    .map_err(|e| {
        Error::Extraction(ExtractionError::ExtractionFailed {
            archive: archive_path.to_path_buf(),
            reason: format!("extraction task panicked: {}", e),
        })
    })?
}

use crate::error::{Error, ExtractionError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    /// Extract a single ZIP entry to disk, creating directories as needed
    fn extract_zip_entry(mut file: zip::read::ZipFile, dest_path: &Path) -> Result<Option<PathBuf>> {
        // Entries escaping the destination (absolute paths, `..`) are dropped
        let file_path = match file.enclosed_name() {
            Some(path) => dest_path.join(path),
            None => {
                warn!(entry = file.name(), "skipping entry with unsafe path");
                return Ok(None);
            }
        };

        if file.is_dir() {
            std::fs::create_dir_all(&file_path)?;
            return Ok(None);
        }

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = std::fs::File::create(&file_path)?;
        std::io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(mode))?;
        }

        Ok(Some(file_path))
    }

    /// Unpack every entry of `archive_path` into `dest_path`
    ///
    /// The destination is created if missing but is not cleared; callers
    /// wanting a clean tree should run [`crate::utils::empty_directory`] first.
    ///
    /// An archive that cannot be opened as ZIP yields
    /// [`ExtractionError::CorruptArchive`]; a failure partway through yields
    /// [`ExtractionError::ExtractionFailed`].
    pub fn extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "attempting ZIP extraction");

        std::fs::create_dir_all(dest_path)?;

        let file = std::fs::File::open(archive_path)?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            Error::Extraction(ExtractionError::CorruptArchive {
                archive: archive_path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;

        let failed = |reason: String| {
            Error::Extraction(ExtractionError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason,
            })
        };

        let mut extracted_files = Vec::new();

        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| failed(format!("failed to read ZIP entry {}: {}", i, e)))?;

            if let Some(file_path) = Self::extract_zip_entry(file, dest_path)
                .map_err(|e| failed(format!("failed to write ZIP entry {}: {}", i, e)))?
            {
                extracted_files.push(file_path);
            }
        }

        info!(
            ?archive_path,
            ?dest_path,
            extracted_count = extracted_files.len(),
            "ZIP extraction successful"
        );

        Ok(extracted_files)
    }
}

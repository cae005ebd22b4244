//! Filesystem helpers

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Prepare `path` as an empty directory
///
/// - Existing directory: every entry inside is removed (files unlinked,
///   subdirectories removed recursively); the directory itself stays.
/// - Missing path: the directory is created, including parents.
/// - Existing non-directory: [`Error::NotADirectory`].
///
/// Entries that cannot be removed are logged one by one and the remaining
/// entries are still attempted; the call then fails with
/// [`Error::DirectoryCleanup`].
///
/// # Examples
///
/// ```
/// use artifact_sync::utils::empty_directory;
///
/// let dir = std::env::temp_dir().join("artifact-sync-doc-example");
/// empty_directory(&dir).unwrap();
/// assert!(dir.is_dir());
/// ```
pub fn empty_directory(path: &Path) -> Result<()> {
    empty_directory_except(path, None)
}

/// Like [`empty_directory`], but leaves the file `keep` in place when it lives
/// somewhere under `path`
///
/// Subdirectories leading to `keep` are emptied rather than removed. Symlinks
/// are never followed when deciding what to keep.
pub fn empty_directory_except(path: &Path, keep: Option<&Path>) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(path)?;
            info!(?path, "created extraction directory");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Follow a symlink to a directory, but never treat a file as one
    let is_dir = metadata.is_dir() || (metadata.is_symlink() && path.is_dir());
    if !is_dir {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    debug!(?path, "emptying directory");

    let keep = keep.and_then(|keep| std::fs::canonicalize(keep).ok());

    let mut failed = 0usize;
    for entry in std::fs::read_dir(path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?path, error = %e, "failed to read directory entry");
                failed += 1;
                continue;
            }
        };
        let item_path = entry.path();

        if let Some(keep) = keep.as_deref() {
            match kept_entry(&entry, keep) {
                KeptEntry::No => {}
                KeptEntry::Exactly => {
                    debug!(path = ?item_path, "keeping downloaded archive");
                    continue;
                }
                KeptEntry::Inside => {
                    match empty_directory_except(&item_path, Some(keep)) {
                        Ok(()) => {}
                        Err(Error::DirectoryCleanup { failed: n, .. }) => failed += n,
                        Err(e) => {
                            warn!(path = ?item_path, error = %e, "failed to empty directory");
                            failed += 1;
                        }
                    }
                    continue;
                }
            }
        }

        // file_type() does not follow symlinks, so a link to a directory is
        // unlinked rather than having its target emptied
        let removal = match entry.file_type() {
            Ok(ft) if ft.is_dir() => std::fs::remove_dir_all(&item_path),
            Ok(_) => std::fs::remove_file(&item_path),
            Err(e) => Err(e),
        };

        if let Err(e) = removal {
            warn!(path = ?item_path, error = %e, "failed to remove item");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(Error::DirectoryCleanup {
            path: path.to_path_buf(),
            failed,
        });
    }

    info!(?path, "emptied extraction directory");
    Ok(())
}

enum KeptEntry {
    No,
    Exactly,
    Inside,
}

/// How a directory entry relates to the canonical path `keep`
fn kept_entry(entry: &std::fs::DirEntry, keep: &Path) -> KeptEntry {
    let Ok(file_type) = entry.file_type() else {
        return KeptEntry::No;
    };
    if file_type.is_symlink() {
        return KeptEntry::No;
    }
    let Ok(real) = std::fs::canonicalize(entry.path()) else {
        return KeptEntry::No;
    };

    if real == keep {
        KeptEntry::Exactly
    } else if file_type.is_dir() && keep.starts_with(&real) {
        KeptEntry::Inside
    } else {
        KeptEntry::No
    }
}

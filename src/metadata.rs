//! Persisted marker of the last artifact that was fetched successfully
//!
//! The marker is a two-field JSON document:
//!
//! ```json
//! {"run_id": 42, "artifact_id": 7}
//! ```
//!
//! It is read once at startup and overwritten only after a complete
//! download-and-extract. There is a single writer, so no locking is done.

use crate::error::Result;
use crate::types::{ArtifactId, ArtifactReference, RunId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The last artifact that was retrieved, if any
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadMarker {
    /// Run the artifact came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Artifact ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<ArtifactId>,
}

impl DownloadMarker {
    /// Marker recording the given artifact
    pub fn for_artifact(artifact: &ArtifactReference) -> Self {
        Self {
            run_id: Some(artifact.run_id),
            artifact_id: Some(artifact.artifact_id),
        }
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.run_id.is_none() && self.artifact_id.is_none()
    }

    /// Whether this marker already records `artifact`
    ///
    /// Both identifiers must match; a new artifact in the same run, or the
    /// same artifact ID under another run, counts as changed.
    pub fn matches(&self, artifact: &ArtifactReference) -> bool {
        self.run_id == Some(artifact.run_id) && self.artifact_id == Some(artifact.artifact_id)
    }
}

/// File-backed marker store
#[derive(Clone, Debug)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the marker file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the marker, surfacing every failure except a missing file
    ///
    /// A missing file is the first-run case and yields an empty marker.
    pub fn read(&self) -> Result<DownloadMarker> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no marker file, starting fresh");
                return Ok(DownloadMarker::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&content)?)
    }

    /// Read the marker, falling back to an empty one on any failure
    ///
    /// The cause (unreadable file vs. invalid JSON) is logged so that a
    /// corrupt marker is not mistaken for a first run.
    pub fn load(&self) -> DownloadMarker {
        match self.read() {
            Ok(marker) => marker,
            Err(e) => {
                warn!(
                    path = ?self.path,
                    error = %e,
                    "ignoring unusable marker file, treating artifact as never downloaded"
                );
                DownloadMarker::default()
            }
        }
    }

    /// Overwrite the marker file
    pub fn save(&self, marker: &DownloadMarker) -> Result<()> {
        let json = serde_json::to_vec(marker)?;
        std::fs::write(&self.path, json)?;
        debug!(path = ?self.path, ?marker, "marker saved");
        Ok(())
    }
}

//! One sync pass: locate, compare, fetch, record
//!
//! The pass has two states. If the stored marker matches the located
//! artifact nothing happens. Otherwise the artifact is downloaded (and
//! extracted, if configured) and the marker is rewritten only when every step
//! succeeded, so a failed pass is retried by the next invocation.

use crate::config::Config;
use crate::error::Result;
use crate::extraction::prepare_and_extract;
use crate::github::{ArtifactSource, locate_artifact};
use crate::metadata::{DownloadMarker, MetadataStore};
use crate::types::{ArtifactReference, SyncOutcome};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Drives a sync pass against an [`ArtifactSource`]
pub struct ArtifactSync<S> {
    source: S,
    artifact_name: String,
    output_filename: PathBuf,
    extract_path: Option<PathBuf>,
}

impl<S: ArtifactSource> ArtifactSync<S> {
    /// Sync the artifact named in `config` from `source`
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            artifact_name: config.artifact_name.clone(),
            output_filename: config.output_filename.clone(),
            extract_path: config.extract_path.clone(),
        }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    /// Download `artifact` and, when an extraction path is set, unpack it there
    ///
    /// Returns the number of extracted files (0 when extraction is disabled).
    /// The downloaded zip stays on disk even when extraction fails.
    pub async fn download_and_extract(&self, artifact: &ArtifactReference) -> Result<usize> {
        let bytes = self
            .source
            .download_artifact(artifact, &self.output_filename)
            .await?;

        info!(
            artifact = %artifact.name,
            artifact_id = %artifact.artifact_id,
            path = ?self.output_filename,
            bytes,
            "downloaded artifact"
        );

        let Some(extract_path) = &self.extract_path else {
            return Ok(0);
        };

        let files = prepare_and_extract(&self.output_filename, extract_path).await?;
        Ok(files.len())
    }

    /// Run one pass, reading and updating `store`
    ///
    /// Never fails: every problem is logged and reflected in the outcome.
    pub async fn run(&self, store: &MetadataStore) -> SyncOutcome {
        let marker = store.load();

        info!(artifact = %self.artifact_name, "checking artifact");

        let located = locate_artifact(&self.source, &self.artifact_name).await;
        let Some(artifact) = located.artifact else {
            info!(artifact = %self.artifact_name, "could not find the artifact");
            return SyncOutcome::NotFound;
        };

        if marker.matches(&artifact) {
            info!(
                run_id = %artifact.run_id,
                artifact_id = %artifact.artifact_id,
                "artifact unchanged since last download, skipping"
            );
            return SyncOutcome::Unchanged(artifact);
        }

        info!(
            run_id = %artifact.run_id,
            artifact_id = %artifact.artifact_id,
            previous_run_id = ?marker.run_id.map(|id| id.get()),
            previous_artifact_id = ?marker.artifact_id.map(|id| id.get()),
            "artifact changed or not downloaded before, downloading"
        );

        match self.download_and_extract(&artifact).await {
            Ok(extracted_files) => {
                if let Err(e) = store.save(&DownloadMarker::for_artifact(&artifact)) {
                    error!(
                        path = ?store.path(),
                        error = %e,
                        "failed to save marker, artifact will be fetched again next run"
                    );
                }
                SyncOutcome::Downloaded {
                    artifact,
                    archive: self.output_filename.clone(),
                    extracted_files,
                }
            }
            Err(e) => {
                warn!(
                    artifact = %artifact.name,
                    artifact_id = %artifact.artifact_id,
                    error = %e,
                    "download or extraction failed, marker left unchanged"
                );
                SyncOutcome::Failed(artifact)
            }
        }
    }
}

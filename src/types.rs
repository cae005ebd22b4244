//! Core types for artifact-sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Provider-assigned workflow run identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub i64);

impl RunId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RunId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-assigned artifact identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub i64);

impl ArtifactId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ArtifactId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workflow run as returned by `GET /repos/{owner}/{repo}/actions/runs`
///
/// Only the fields the sync pass looks at are deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    /// Run ID
    pub id: RunId,
    /// Workflow name
    #[serde(default)]
    pub name: Option<String>,
    /// Run status ("completed", "in_progress", ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Run conclusion ("success", "failure", ...), absent until completed
    #[serde(default)]
    pub conclusion: Option<String>,
    /// Branch the run was triggered on
    #[serde(default)]
    pub head_branch: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Whether the provider reports a conclusion other than success
    pub fn is_unsuccessful(&self) -> bool {
        self.conclusion.as_deref().is_some_and(|c| c != "success")
    }
}

/// Envelope of the workflow run listing
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkflowRunList {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

/// A build artifact as returned by `GET .../actions/runs/{run_id}/artifacts`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    /// Artifact ID
    pub id: ArtifactId,
    /// Artifact name
    pub name: String,
    /// Compressed size in bytes
    #[serde(default)]
    pub size_in_bytes: Option<u64>,
    /// Whether the artifact has passed its retention period
    #[serde(default)]
    pub expired: bool,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Envelope of the artifact listing
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArtifactList {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// A specific artifact belonging to a specific workflow run
///
/// Produced fresh on every sync pass and never mutated. Its identifier pair is
/// what gets persisted in the marker file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactReference {
    /// Run the artifact belongs to
    pub run_id: RunId,
    /// Artifact ID
    pub artifact_id: ArtifactId,
    /// Artifact name
    pub name: String,
}

impl ArtifactReference {
    /// Build a reference from a run ID and one of its artifacts
    pub fn new(run_id: RunId, artifact: &Artifact) -> Self {
        Self {
            run_id,
            artifact_id: artifact.id,
            name: artifact.name.clone(),
        }
    }
}

/// Result of one sync pass
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No successful run, no matching artifact, or the API could not be reached
    NotFound,
    /// The stored marker already matches the latest artifact
    Unchanged(ArtifactReference),
    /// The artifact was downloaded (and extracted, if configured) and the marker updated
    Downloaded {
        /// The artifact that was fetched
        artifact: ArtifactReference,
        /// Path of the downloaded zip file
        archive: PathBuf,
        /// Files written to the extraction directory
        extracted_files: usize,
    },
    /// Download or extraction failed; the marker was left untouched
    Failed(ArtifactReference),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_run_list_deserialize() {
        let json = r#"{
            "total_count": 1,
            "workflow_runs": [{
                "id": 42,
                "name": "CI",
                "status": "completed",
                "conclusion": "success",
                "head_branch": "main",
                "created_at": "2024-05-01T12:00:00Z",
                "run_number": 7
            }]
        }"#;
        let list: WorkflowRunList = serde_json::from_str(json).unwrap();
        assert_eq!(list.workflow_runs.len(), 1);
        let run = &list.workflow_runs[0];
        assert_eq!(run.id, RunId(42));
        assert_eq!(run.head_branch.as_deref(), Some("main"));
        assert!(run.created_at.is_some());
        assert!(!run.is_unsuccessful());
    }

    #[test]
    fn test_workflow_run_list_missing_field_is_empty() {
        let list: WorkflowRunList = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(list.workflow_runs.is_empty());
    }

    #[test]
    fn test_unsuccessful_run_detection() {
        let run: WorkflowRun =
            serde_json::from_str(r#"{"id": 1, "conclusion": "failure"}"#).unwrap();
        assert!(run.is_unsuccessful());

        // No conclusion reported means we trust the query filter
        let run: WorkflowRun = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(!run.is_unsuccessful());
    }

    #[test]
    fn test_artifact_reference_from_artifact() {
        let artifact: Artifact = serde_json::from_str(
            r#"{"id": 7, "name": "build-y", "size_in_bytes": 1024, "expired": false}"#,
        )
        .unwrap();
        let reference = ArtifactReference::new(RunId(42), &artifact);
        assert_eq!(reference.run_id, RunId(42));
        assert_eq!(reference.artifact_id, ArtifactId(7));
        assert_eq!(reference.name, "build-y");
    }
}

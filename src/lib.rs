//! # artifact-sync
//!
//! Fetch the newest build artifact of a GitHub repository, but only when it
//! changed since the last time.
//!
//! Each invocation performs a single pass:
//!
//! 1. Load [`Config`] from the environment (and `.env`)
//! 2. Load the [`DownloadMarker`] recorded by the previous pass
//! 3. Find the named artifact in the latest successful workflow run
//! 4. If its run/artifact IDs differ from the marker, download the zip,
//!    replace the contents of the extraction directory, and record the new IDs
//!
//! Scheduling is left to the caller (cron, a systemd timer, a CI job). A
//! failed pass leaves the marker alone, so the next invocation retries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use artifact_sync::{ArtifactSync, Config, GithubClient, MetadataStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = MetadataStore::new(&config.metadata_file);
//!     let sync = ArtifactSync::new(GithubClient::new(&config)?, &config);
//!
//!     let outcome = sync.run(&store).await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// GitHub Actions API client and artifact lookup
pub mod github;
/// Persisted download marker
pub mod metadata;
/// Sync pass orchestration
pub mod sync;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, ExtractionError, Result};
pub use github::{ArtifactSource, GithubClient, LocatedArtifact, locate_artifact};
pub use metadata::{DownloadMarker, MetadataStore};
pub use sync::ArtifactSync;
pub use types::{Artifact, ArtifactId, ArtifactReference, RunId, SyncOutcome, WorkflowRun};

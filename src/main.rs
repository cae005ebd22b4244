//! Command-line entry point: one sync pass per invocation.
//!
//! Exit status is 1 when required configuration is missing and 0 otherwise,
//! including when the API is unreachable or the artifact is not found.

use std::process::ExitCode;

use artifact_sync::{ArtifactSync, Config, GithubClient, MetadataStore, SyncOutcome};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "missing configuration");
            eprintln!("Error: {}\n{}", e, Config::usage());
            return ExitCode::from(1);
        }
    };

    let client = match GithubClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create HTTP client");
            if e.is_fatal() {
                return ExitCode::from(1);
            }
            info!("finished checking artifact");
            return ExitCode::SUCCESS;
        }
    };

    let store = MetadataStore::new(&config.metadata_file);
    let sync = ArtifactSync::new(client, &config);

    match sync.run(&store).await {
        SyncOutcome::Downloaded {
            artifact,
            archive,
            extracted_files,
        } => info!(
            run_id = %artifact.run_id,
            artifact_id = %artifact.artifact_id,
            ?archive,
            extracted_files,
            "artifact updated"
        ),
        outcome => info!(?outcome, "nothing new retrieved"),
    }

    info!("finished checking artifact");
    ExitCode::SUCCESS
}

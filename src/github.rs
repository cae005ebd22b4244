//! GitHub Actions REST API access
//!
//! [`ArtifactSource`] is the seam between the sync pass and the provider.
//! [`GithubClient`] implements it over HTTP; tests substitute their own.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{
    Artifact, ArtifactList, ArtifactReference, RunId, WorkflowRun, WorkflowRunList,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Media type GitHub recommends for REST requests
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Pinned REST API version
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Source of workflow runs and their artifacts
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Most recent completed run with a successful conclusion, if any
    async fn latest_successful_run(&self) -> Result<Option<WorkflowRun>>;

    /// All artifacts produced by `run_id`
    async fn list_artifacts(&self, run_id: RunId) -> Result<Vec<Artifact>>;

    /// Stream the artifact's ZIP payload to `dest`, returning the byte count
    ///
    /// `dest` is truncated first; on failure it may hold a partial payload.
    async fn download_artifact(&self, artifact: &ArtifactReference, dest: &Path) -> Result<u64>;
}

/// HTTP client for one repository's Actions API
pub struct GithubClient {
    http: reqwest::Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Build a client for the repository named in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        // GitHub rejects requests without a User-Agent
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    /// `{base}/repos/{owner}/{repo}/actions/{segments...}`
    fn actions_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: format!("API URL '{}' cannot be a base", self.base_url),
                key: Some(crate::config::ENV_API_URL.to_string()),
            })?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "actions"])
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated GET and fail on non-2xx status
    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ArtifactSource for GithubClient {
    async fn latest_successful_run(&self) -> Result<Option<WorkflowRun>> {
        let mut url = self.actions_url(&["runs"])?;
        url.query_pairs_mut()
            .append_pair("per_page", "1")
            .append_pair("status", "completed")
            .append_pair("conclusion", "success")
            .append_pair("sort", "created")
            .append_pair("direction", "desc");

        let list: WorkflowRunList = self.get(url).await?.json().await?;
        Ok(list.workflow_runs.into_iter().next())
    }

    async fn list_artifacts(&self, run_id: RunId) -> Result<Vec<Artifact>> {
        let run_segment = run_id.to_string();
        let url = self.actions_url(&["runs", &run_segment, "artifacts"])?;

        let list: ArtifactList = self.get(url).await?.json().await?;
        Ok(list.artifacts)
    }

    async fn download_artifact(&self, artifact: &ArtifactReference, dest: &Path) -> Result<u64> {
        let artifact_segment = artifact.artifact_id.to_string();
        let url = self.actions_url(&["artifacts", &artifact_segment, "zip"])?;

        // The API redirects to blob storage; reqwest follows it and drops the
        // Authorization header on the cross-host hop
        let mut response = self.get(url).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Outcome of looking up the requested artifact
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocatedArtifact {
    /// Latest successful run, if one was found
    pub run_id: Option<RunId>,
    /// Matching artifact within that run, if one was found
    pub artifact: Option<ArtifactReference>,
}

/// Find the artifact named `artifact_name` in the latest successful run
///
/// Never fails: transport errors, HTTP errors and empty listings are logged
/// and reported as an empty (or run-only) result so a periodic caller can
/// simply try again next time.
pub async fn locate_artifact(source: &dyn ArtifactSource, artifact_name: &str) -> LocatedArtifact {
    let run = match source.latest_successful_run().await {
        Ok(Some(run)) if run.is_unsuccessful() => {
            warn!(
                run_id = %run.id,
                conclusion = run.conclusion.as_deref().unwrap_or_default(),
                "latest completed run did not succeed"
            );
            return LocatedArtifact::default();
        }
        Ok(Some(run)) => run,
        Ok(None) => {
            info!("no successful workflow runs found");
            return LocatedArtifact::default();
        }
        Err(e) => {
            warn!(error = %e, "error fetching workflow runs");
            return LocatedArtifact::default();
        }
    };

    debug!(
        run_id = %run.id,
        workflow = run.name.as_deref().unwrap_or_default(),
        branch = run.head_branch.as_deref().unwrap_or_default(),
        created_at = ?run.created_at,
        "found latest successful run"
    );

    let artifacts = match source.list_artifacts(run.id).await {
        Ok(artifacts) => artifacts,
        Err(e) => {
            warn!(run_id = %run.id, error = %e, "error fetching artifacts");
            return LocatedArtifact::default();
        }
    };

    if artifacts.is_empty() {
        info!(run_id = %run.id, "no artifacts found for run");
        return LocatedArtifact {
            run_id: Some(run.id),
            artifact: None,
        };
    }

    match artifacts.iter().find(|a| a.name == artifact_name) {
        Some(artifact) => {
            debug!(
                run_id = %run.id,
                artifact_id = %artifact.id,
                size_in_bytes = ?artifact.size_in_bytes,
                expired = artifact.expired,
                "found artifact"
            );
            LocatedArtifact {
                run_id: Some(run.id),
                artifact: Some(ArtifactReference::new(run.id, artifact)),
            }
        }
        None => {
            info!(
                run_id = %run.id,
                artifact_name,
                available = artifacts.len(),
                "artifact not found in the latest successful workflow run"
            );
            LocatedArtifact {
                run_id: Some(run.id),
                artifact: None,
            }
        }
    }
}

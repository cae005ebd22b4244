//! Configuration for artifact-sync
//!
//! Everything is read from environment variables, optionally seeded from a
//! `.env` file in the working directory.

use crate::error::{Error, Result};
use std::path::PathBuf;
use url::Url;

/// Repository owner (user or organization)
pub const ENV_OWNER: &str = "GITHUB_OWNER";
/// Repository name
pub const ENV_REPO: &str = "GITHUB_REPO";
/// Name of the artifact to fetch
pub const ENV_ARTIFACT_NAME: &str = "GITHUB_ARTIFACT_NAME";
/// Token used for bearer authentication
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
/// Where the downloaded zip is written
pub const ENV_OUTPUT_FILENAME: &str = "OUTPUT_FILENAME";
/// Directory the zip is unpacked into
pub const ENV_EXTRACT_PATH: &str = "EXTRACT_PATH";
/// API root, for GitHub Enterprise installs
pub const ENV_API_URL: &str = "GITHUB_API_URL";
/// Location of the marker file
pub const ENV_METADATA_FILE: &str = "METADATA_FILE";

/// Public GitHub API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Required keys, in the order they are checked
pub const REQUIRED_KEYS: [&str; 4] = [ENV_OWNER, ENV_REPO, ENV_ARTIFACT_NAME, ENV_TOKEN];

/// Settings for one sync pass
#[derive(Clone)]
pub struct Config {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Artifact name to look for in the latest successful run
    pub artifact_name: String,
    /// API token
    pub token: String,
    /// Zip output path (default: "artifact.zip")
    pub output_filename: PathBuf,
    /// Extraction directory; extraction is skipped when unset
    pub extract_path: Option<PathBuf>,
    /// API root (default: "https://api.github.com")
    pub api_base_url: Url,
    /// Marker file (default: "last_downloaded_artifact.json")
    pub metadata_file: PathBuf,
}

// Keep the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("artifact_name", &self.artifact_name)
            .field("token", &"<redacted>")
            .field("output_filename", &self.output_filename)
            .field("extract_path", &self.extract_path)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("metadata_file", &self.metadata_file)
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal case
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| Error::missing_key(key));

        let owner = require(ENV_OWNER)?;
        let repo = require(ENV_REPO)?;
        let artifact_name = require(ENV_ARTIFACT_NAME)?;
        let token = require(ENV_TOKEN)?;

        let raw_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = Url::parse(&raw_url).map_err(|e| Error::Config {
            message: format!("invalid {} '{}': {}", ENV_API_URL, raw_url, e),
            key: Some(ENV_API_URL.to_string()),
        })?;

        if api_base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("{} must be an http(s) URL", ENV_API_URL),
                key: Some(ENV_API_URL.to_string()),
            });
        }

        Ok(Self {
            owner,
            repo,
            artifact_name,
            token,
            output_filename: get(ENV_OUTPUT_FILENAME)
                .map(PathBuf::from)
                .unwrap_or_else(default_output_filename),
            extract_path: get(ENV_EXTRACT_PATH).map(PathBuf::from),
            api_base_url,
            metadata_file: get(ENV_METADATA_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(default_metadata_file),
        })
    }

    /// Usage text shown when required settings are missing
    pub fn usage() -> String {
        format!(
            "Please set {} in your environment or .env file.\n\
             Optionally, you can set {}, {}, {} and {}.",
            REQUIRED_KEYS.join(", "),
            ENV_OUTPUT_FILENAME,
            ENV_EXTRACT_PATH,
            ENV_API_URL,
            ENV_METADATA_FILE,
        )
    }
}

fn default_output_filename() -> PathBuf {
    PathBuf::from("artifact.zip")
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("last_downloaded_artifact.json")
}

//! Configuration constants and types for the GitHub VFS.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Media type requested from the contents API.
pub const ACCEPT_HEADER: &str = "application/vnd.github+json";

/// User agent sent with every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("gh-vfs/", env!("CARGO_PKG_VERSION"));

/// Name of the placeholder object that marks a directory.
pub const DIR_MARKER: &str = ".keep";

/// Scrypt parameters for key derivation.
pub mod scrypt_params {
    /// log2 of the CPU/memory cost N (N = 16384).
    pub const LOG_N: u8 = 14;

    /// Block size.
    pub const R: u32 = 8;

    /// Parallelism factor.
    pub const P: u32 = 1;

    /// Upper bound accepted for log2(N).
    pub const MAX_LOG_N: u8 = 24;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// Salt length in bytes.
    pub const SALT_LENGTH: usize = 16;
}

/// Default commit messages per operation.
pub mod messages {
    pub const CREATE_DIR: &str = "Creating directory";
    pub const MOVE_FILE: &str = "Moving file";
    pub const COPY_FILE: &str = "Copying file";
}

/// Identity attached to every commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

impl Committer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Default for Committer {
    fn default() -> Self {
        Self::new("Default Committer", "default@example.com")
    }
}

/// Scrypt cost parameters.
///
/// The envelope does not record these, so every reader of a repository must
/// use the same values the writer used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl KdfParams {
    pub fn new(log_n: u8, r: u32, p: u32) -> Self {
        Self { log_n, r, p }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.log_n == 0 || self.log_n > scrypt_params::MAX_LOG_N {
            return Err(format!(
                "scrypt log_n must be between 1 and {}",
                scrypt_params::MAX_LOG_N
            ));
        }
        if self.r == 0 || self.p == 0 {
            return Err("scrypt r and p must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: scrypt_params::LOG_N,
            r: scrypt_params::R,
            p: scrypt_params::P,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Configuration for connecting a VFS to a repository.
#[derive(Clone, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Personal access token. Empty means anonymous access.
    #[serde(default)]
    pub auth_token: String,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Identity used for commits.
    #[serde(default)]
    pub committer: Committer,

    /// Shared secret all file contents are encrypted with.
    pub encryption_secret: String,

    /// Branch to read from and commit to. `None` uses the repository default.
    #[serde(default)]
    pub branch: Option<String>,

    /// REST endpoint, overridable for GitHub Enterprise.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Key derivation cost.
    #[serde(default)]
    pub kdf: KdfParams,
}

impl VfsConfig {
    /// Create a configuration with default committer, branch, endpoint and KDF cost.
    pub fn new(
        auth_token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        encryption_secret: impl Into<String>,
    ) -> Self {
        Self {
            auth_token: auth_token.into(),
            owner: owner.into(),
            repo: repo.into(),
            committer: Committer::default(),
            encryption_secret: encryption_secret.into(),
            branch: None,
            api_url: default_api_url(),
            kdf: KdfParams::default(),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::InvalidConfig("owner must not be empty".to_string()));
        }
        if self.repo.trim().is_empty() {
            return Err(Error::InvalidConfig("repo must not be empty".to_string()));
        }
        if self.encryption_secret.is_empty() {
            return Err(Error::InvalidConfig(
                "encryption secret must not be empty".to_string(),
            ));
        }
        if matches!(&self.branch, Some(b) if b.trim().is_empty()) {
            return Err(Error::InvalidConfig("branch must not be blank".to_string()));
        }
        self.kdf.validate().map_err(Error::InvalidConfig)?;
        url::Url::parse(&self.api_url)?;
        Ok(())
    }
}

impl fmt::Debug for VfsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VfsConfig")
            .field("auth_token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("committer", &self.committer)
            .field("encryption_secret", &"<redacted>")
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("kdf", &self.kdf)
            .finish()
    }
}

//! Error types for the GitHub VFS.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for GitHub VFS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in GitHub VFS operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No object exists at the path.
    #[error("File '{0}' does not exist")]
    NotFound(String),

    /// The store rejected a write or delete because the revision was stale or missing.
    #[error("Conflicting update to '{path}': {reason}")]
    Conflict { path: String, reason: String },

    /// Decryption error (wrong secret, tampered or corrupted data).
    #[error("Decryption failed: wrong secret or corrupted data")]
    Decryption,

    /// Envelope could not be parsed.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Operation requires a target that is missing or empty.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Path addresses a single object where a collection was expected.
    #[error("Path '{0}' is not a directory")]
    NotADirectory(String),

    /// Path addresses a collection where a single object was expected.
    #[error("Path '{0}' is not a file")]
    NotAFile(String),

    /// Network-level failure talking to the store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status.
    #[error("Remote store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Base64 transport encoding error.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Decrypted content is not valid UTF-8.
    #[error("Content of '{0}' is not valid UTF-8")]
    Utf8(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("Cannot read configuration {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for the not-found condition, as opposed to any other failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the store rejected a stale revision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// True for every failure to open an envelope.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Error::Decryption | Error::InvalidEnvelope(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Encoding(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidConfig(format!("bad API URL: {}", e))
    }
}

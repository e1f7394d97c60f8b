//! GitHub Virtual File System
//!
//! An encrypted file system layered on a GitHub repository's contents API.
//! The repository only knows flat path-to-blob mappings with content-hash
//! revisions; this crate adds directories, transparent encryption and
//! revision-checked writes on top.
//!
//! # Features
//!
//! - **Encrypted blobs**: AES-256-GCM with a scrypt-derived key and a fresh salt per write
//! - **Directories**: emulated with `.keep` marker objects and recursive deletion
//! - **Optimistic concurrency**: updates and deletes carry the revision they were based on
//! - **CLI Interface**: `gh-vfs` command-line tool
//!
//! # Architecture
//!
//! ```text
//! Plaintext → Seal (scrypt + AES-256-GCM) → Base64 → PUT /contents/{path}
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_vfs::{GitHubVfs, VfsConfig};
//!
//! # async fn demo() -> gh_vfs::Result<()> {
//! let config = VfsConfig::new("ghp_token", "octocat", "vault", "correct horse");
//! let vfs = GitHubVfs::new(config)?;
//!
//! vfs.write_file("notes/secret.txt", b"Hidden data", None).await?;
//! let data = vfs.read_file("notes/secret.txt").await?;
//! assert_eq!(data, b"Hidden data");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod vfs;

pub use config::{Committer, KdfParams, VfsConfig};
pub use error::{Error, Result};
pub use vfs::GitHubVfs;

//! VFS operations - the main interface.

use crate::config::{messages, Committer, VfsConfig};
use crate::crypto::Codec;
use crate::error::{Error, Result};
use crate::storage::{
    ContentStore, DeleteRequest, GitHubContents, ObjectKind, ObjectMetadata, PutRequest,
};
use crate::vfs::path::VirtualPath;
use crate::vfs::types::{DeleteReport, DirEntry};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use tracing::{debug, info};

/// Commit message used when the caller supplies none.
fn timestamp_message() -> String {
    chrono::Local::now()
        .format("%a %b %d %Y %H:%M:%S GMT%z")
        .to_string()
}

/// Decode base64 as served by the contents API, which wraps lines.
fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// The encrypted file system over a content store.
///
/// Holds no state besides its collaborators; every call is a fresh
/// lookup, transform and mutate sequence against the store.
pub struct GitHubVfs {
    /// Backing object store.
    store: Arc<dyn ContentStore>,
    /// Seals and opens file contents.
    codec: Codec,
    /// Identity attached to every commit.
    committer: Committer,
}

impl GitHubVfs {
    /// Connect to the repository described by `config`.
    pub fn new(config: VfsConfig) -> Result<Self> {
        config.validate()?;
        let store = GitHubContents::new(&config)?;
        info!(
            owner = %config.owner,
            repo = %config.repo,
            branch = config.branch.as_deref().unwrap_or("<default>"),
            "opened repository"
        );

        Ok(Self {
            store: Arc::new(store),
            codec: Codec::new(config.encryption_secret, config.kdf),
            committer: config.committer,
        })
    }

    /// Use an arbitrary store, e.g. [`crate::storage::MemoryStore`].
    pub fn with_store(store: Arc<dyn ContentStore>, codec: Codec) -> Self {
        Self {
            store,
            codec,
            committer: Committer::default(),
        }
    }

    /// Override the commit identity for this instance.
    pub fn with_committer(mut self, committer: Committer) -> Self {
        self.committer = committer;
        self
    }

    pub fn committer(&self) -> &Committer {
        &self.committer
    }

    /// Check whether anything exists at `path`.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.store.get(path).await?.is_some())
    }

    /// Check whether `path` carries a directory marker.
    pub async fn is_dir(&self, path: &str) -> Result<bool> {
        self.exists(VirtualPath::new(path).marker().as_str()).await
    }

    /// Encrypt and store `contents` at `path`, creating or replacing it.
    ///
    /// Returns the metadata of the new revision. A concurrent writer that
    /// commits between the lookup and the put makes this fail with
    /// [`Error::Conflict`]; there is no retry.
    pub async fn write_file(
        &self,
        path: &str,
        contents: &[u8],
        message: Option<&str>,
    ) -> Result<ObjectMetadata> {
        let message = message.map_or_else(timestamp_message, str::to_string);

        let current = self.store.metadata(path).await?;
        let sha = current.map(|meta| meta.sha);

        let envelope = self.codec.seal(contents)?;
        let encoded = STANDARD.encode(envelope.as_bytes());

        let meta = self
            .store
            .put(PutRequest {
                path,
                content: &encoded,
                sha: sha.as_deref(),
                message: &message,
                committer: &self.committer,
            })
            .await?;

        info!(path, revision = %meta.sha, created = sha.is_none(), "wrote file");
        Ok(meta)
    }

    /// Read and decrypt the file at `path`.
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let meta = self
            .store
            .metadata(path)
            .await?
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        let encoded = meta
            .content
            .ok_or_else(|| Error::Encoding(format!("no inline content for '{}'", path)))?;
        let raw = decode_content(&encoded)?;
        let envelope = String::from_utf8(raw)
            .map_err(|_| Error::InvalidEnvelope("envelope is not UTF-8".to_string()))?;

        let plaintext = self.codec.open(&envelope)?;
        debug!(path, revision = %meta.sha, bytes = plaintext.len(), "read file");
        Ok(plaintext)
    }

    /// Read a file as UTF-8 text.
    pub async fn read_to_string(&self, path: &str) -> Result<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes).map_err(|_| Error::Utf8(path.to_string()))
    }

    /// Delete the file at `path` at its current revision.
    pub async fn delete_file(&self, path: &str, message: Option<&str>) -> Result<()> {
        let message = message.map_or_else(timestamp_message, str::to_string);

        let meta = self
            .store
            .metadata(path)
            .await?
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        self.store
            .delete(DeleteRequest {
                path,
                sha: &meta.sha,
                message: &message,
                committer: &self.committer,
            })
            .await?;

        info!(path, revision = %meta.sha, "deleted file");
        Ok(())
    }

    /// Create a directory by writing its marker object.
    pub async fn create_dir(&self, path: &str, message: Option<&str>) -> Result<ObjectMetadata> {
        let marker = VirtualPath::new(path).marker();
        self.write_file(
            marker.as_str(),
            b"",
            Some(message.unwrap_or(messages::CREATE_DIR)),
        )
        .await
    }

    /// List the immediate children of `path`. `None` if nothing is there.
    pub async fn read_dir(&self, path: &str) -> Result<Option<Vec<DirEntry>>> {
        let entries = self.store.list(path).await?;
        Ok(entries.map(|entries| entries.into_iter().map(DirEntry::from).collect()))
    }

    /// Recursively delete everything under `path`, markers included.
    ///
    /// Walks an explicit stack of directories. A child is descended into when
    /// the listing reports it as a directory or its marker exists; anything
    /// else is deleted as a file. An empty or missing directory anywhere in
    /// the walk is an error. Objects already deleted stay deleted on failure.
    pub async fn delete_dir(&self, path: &str, message: Option<&str>) -> Result<DeleteReport> {
        let message = message.map_or_else(timestamp_message, str::to_string);
        let mut report = DeleteReport {
            root: path.to_string(),
            ..DeleteReport::default()
        };

        let mut pending = vec![VirtualPath::new(path)];
        while let Some(dir) = pending.pop() {
            let entries = self.store.list(dir.as_str()).await?.unwrap_or_default();
            if entries.is_empty() {
                return Err(Error::Precondition(format!(
                    "Directory '{}' is empty or does not exist",
                    dir
                )));
            }
            report.directories += 1;

            for entry in entries {
                let child = dir.join(&entry.name);
                let nested = match entry.kind {
                    ObjectKind::Dir => true,
                    _ => self.is_dir(child.as_str()).await?,
                };

                if nested {
                    pending.push(child);
                } else {
                    self.delete_file(child.as_str(), Some(&message)).await?;
                    report.removed.push(child.to_string());
                }
            }
        }

        info!(
            path,
            removed = report.removed.len(),
            directories = report.directories,
            "deleted directory"
        );
        Ok(report)
    }

    /// Move a file: write to `dest`, then delete `src`.
    ///
    /// Not atomic. If the delete fails both copies remain.
    pub async fn move_file(&self, src: &str, dest: &str, message: Option<&str>) -> Result<()> {
        let message = message.unwrap_or(messages::MOVE_FILE);

        let contents = self.read_file(src).await?;
        self.write_file(dest, &contents, Some(message)).await?;
        self.delete_file(src, Some(&format!("Deleted after move: {}", message)))
            .await?;

        info!(src, dest, "moved file");
        Ok(())
    }

    /// Copy a file to `dest`, replacing whatever is there.
    pub async fn copy_file(&self, src: &str, dest: &str, message: Option<&str>) -> Result<()> {
        let contents = self.read_file(src).await?;
        self.write_file(dest, &contents, Some(message.unwrap_or(messages::COPY_FILE)))
            .await?;
        Ok(())
    }
}

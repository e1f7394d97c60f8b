//! The content store interface the VFS is written against.

use crate::error::{Error, Result};
use crate::storage::types::{DeleteRequest, ObjectMetadata, PutRequest, RemoteEntry, RemoteObject};
use async_trait::async_trait;

/// Path-addressed object store with per-object revisions.
///
/// Implementations perform no content transformation. Not-found is reported
/// as `Ok(None)` from the read operations and as [`Error::NotFound`] from the
/// mutating ones; nothing else may use those signals.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve `path` to a file or a collection. `None` when nothing is there.
    async fn get(&self, path: &str) -> Result<Option<RemoteObject>>;

    /// Create or update a file. A stale or missing revision on an existing
    /// object must fail with [`Error::Conflict`].
    async fn put(&self, request: PutRequest<'_>) -> Result<ObjectMetadata>;

    /// Delete a file at the given revision.
    async fn delete(&self, request: DeleteRequest<'_>) -> Result<()>;

    /// List the immediate children of a collection.
    async fn list(&self, path: &str) -> Result<Option<Vec<RemoteEntry>>> {
        match self.get(path).await? {
            None => Ok(None),
            Some(RemoteObject::Directory(entries)) => Ok(Some(entries)),
            Some(RemoteObject::File(_)) => Err(Error::NotADirectory(path.to_string())),
        }
    }

    /// Metadata of a single file. Collections are rejected.
    async fn metadata(&self, path: &str) -> Result<Option<ObjectMetadata>> {
        match self.get(path).await? {
            None => Ok(None),
            Some(RemoteObject::File(meta)) => Ok(Some(meta)),
            Some(RemoteObject::Directory(_)) => Err(Error::NotAFile(path.to_string())),
        }
    }
}

//! In-process content store.
//!
//! Behaves like the contents API for the operations the VFS uses: flat
//! path keys, directories implied by key prefixes, content-hash revisions
//! and conditional writes.

use crate::config::Committer;
use crate::error::{Error, Result};
use crate::storage::store::ContentStore;
use crate::storage::types::{
    DeleteRequest, ObjectKind, ObjectMetadata, PutRequest, RemoteEntry, RemoteObject,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A stored blob and its revision.
#[derive(Debug, Clone)]
struct Blob {
    data: Vec<u8>,
    sha: String,
}

/// Kind of mutation recorded in the commit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOp {
    Put,
    Delete,
}

/// One accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub op: CommitOp,
    pub path: String,
    pub message: String,
    pub committer: Committer,
}

#[derive(Debug, Default)]
struct State {
    blobs: BTreeMap<String, Blob>,
    commits: Vec<CommitRecord>,
}

/// Content store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored file paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().blobs.keys().cloned().collect()
    }

    /// Raw stored bytes of a file (the envelope, not the plaintext).
    pub fn raw(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().blobs.get(path).map(|b| b.data.clone())
    }

    /// Overwrite stored bytes without a revision check.
    pub fn insert_raw(&self, path: &str, data: Vec<u8>) {
        let sha = revision_of(&data);
        self.state
            .lock()
            .blobs
            .insert(path.to_string(), Blob { data, sha });
    }

    /// Every accepted mutation, oldest first.
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.state.lock().commits.clone()
    }

    fn children(blobs: &BTreeMap<String, Blob>, path: &str) -> Vec<RemoteEntry> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut children: BTreeMap<String, ObjectKind> = BTreeMap::new();
        for key in blobs.keys().filter(|k| k.starts_with(&prefix)) {
            let rest = &key[prefix.len()..];
            match rest.split_once('/') {
                Some((dir, _)) => {
                    children.insert(dir.to_string(), ObjectKind::Dir);
                }
                None => {
                    children.insert(rest.to_string(), ObjectKind::File);
                }
            }
        }

        children
            .into_iter()
            .map(|(name, kind)| RemoteEntry {
                path: format!("{}{}", prefix, name),
                name,
                kind,
            })
            .collect()
    }

    fn file_ancestor(blobs: &BTreeMap<String, Blob>, path: &str) -> Option<String> {
        let mut end = 0;
        while let Some(pos) = path[end..].find('/') {
            end += pos;
            let ancestor = &path[..end];
            if blobs.contains_key(ancestor) {
                return Some(ancestor.to_string());
            }
            end += 1;
        }
        None
    }
}

/// Git-style content hash: digest of `blob <len>\0<data>`.
fn revision_of(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", data.len()).as_bytes());
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn conflict(path: &str, reason: &str) -> Error {
    Error::Conflict {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<RemoteObject>> {
        let state = self.state.lock();
        let path = path.trim_end_matches('/');

        if let Some(blob) = state.blobs.get(path) {
            return Ok(Some(RemoteObject::File(ObjectMetadata {
                path: path.to_string(),
                sha: blob.sha.clone(),
                content: Some(STANDARD.encode(&blob.data)),
                kind: ObjectKind::File,
            })));
        }

        let children = Self::children(&state.blobs, path);
        if children.is_empty() {
            Ok(None)
        } else {
            Ok(Some(RemoteObject::Directory(children)))
        }
    }

    async fn put(&self, request: PutRequest<'_>) -> Result<ObjectMetadata> {
        let compact: String = request
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let data = STANDARD.decode(compact)?;

        let mut state = self.state.lock();
        let path = request.path;

        if !Self::children(&state.blobs, path).is_empty() {
            return Err(Error::NotAFile(path.to_string()));
        }
        if let Some(ancestor) = Self::file_ancestor(&state.blobs, path) {
            return Err(Error::Api {
                status: 422,
                message: format!("'{}' is a file", ancestor),
            });
        }

        match (state.blobs.get(path), request.sha) {
            (Some(_), None) => return Err(conflict(path, "sha wasn't supplied")),
            (Some(current), Some(sha)) if current.sha != sha => {
                return Err(conflict(path, "sha does not match"))
            }
            (None, Some(_)) => return Err(conflict(path, "object no longer exists")),
            _ => {}
        }

        let sha = revision_of(&data);
        state.blobs.insert(
            path.to_string(),
            Blob {
                data,
                sha: sha.clone(),
            },
        );
        state.commits.push(CommitRecord {
            op: CommitOp::Put,
            path: path.to_string(),
            message: request.message.to_string(),
            committer: request.committer.clone(),
        });

        Ok(ObjectMetadata {
            path: path.to_string(),
            sha,
            content: None,
            kind: ObjectKind::File,
        })
    }

    async fn delete(&self, request: DeleteRequest<'_>) -> Result<()> {
        let mut state = self.state.lock();
        let path = request.path;

        let current = state
            .blobs
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        if current.sha != request.sha {
            return Err(conflict(path, "sha does not match"));
        }

        state.blobs.remove(path);
        state.commits.push(CommitRecord {
            op: CommitOp::Delete,
            path: path.to_string(),
            message: request.message.to_string(),
            committer: request.committer.clone(),
        });
        Ok(())
    }
}

//! VFS types: directory entries and operation reports.

use crate::storage::{ObjectKind, RemoteEntry};
use serde::{Deserialize, Serialize};

/// Directory entry for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Name of the entry.
    pub name: String,
    /// Full path in the repository.
    pub path: String,
    /// Kind reported by the store.
    pub kind: ObjectKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

impl From<RemoteEntry> for DirEntry {
    fn from(entry: RemoteEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            kind: entry.kind,
        }
    }
}

/// Outcome of a recursive directory delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Directory the delete started from.
    pub root: String,
    /// Every object removed, in deletion order.
    pub removed: Vec<String>,
    /// Number of directories visited, including the root.
    pub directories: usize,
}

impl DeleteReport {
    /// Human-readable summary.
    pub fn message(&self) -> String {
        format!(
            "Deleted all files and directory placeholder at '{}'",
            self.root
        )
    }
}

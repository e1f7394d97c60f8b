//! Metadata types shared by every content store.

use crate::config::Committer;
use serde::{Deserialize, Serialize};

/// Kind of object reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

impl ObjectKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, ObjectKind::Dir)
    }
}

/// Metadata of a single stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub path: String,
    /// Content hash; must be echoed back to update or delete the object.
    pub sha: String,
    /// Base64 content as returned by the store. Absent in write responses.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
}

/// One child in a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
}

/// What a path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteObject {
    File(ObjectMetadata),
    Directory(Vec<RemoteEntry>),
}

/// A conditional create-or-update.
#[derive(Debug, Clone)]
pub struct PutRequest<'a> {
    pub path: &'a str,
    /// Base64 encoded payload.
    pub content: &'a str,
    /// Current revision; `None` creates the object.
    pub sha: Option<&'a str>,
    pub message: &'a str,
    pub committer: &'a Committer,
}

/// A conditional delete.
#[derive(Debug, Clone)]
pub struct DeleteRequest<'a> {
    pub path: &'a str,
    pub sha: &'a str,
    pub message: &'a str,
    pub committer: &'a Committer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        let kinds: Vec<ObjectKind> =
            serde_json::from_str(r#"["file", "dir", "symlink", "submodule"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                ObjectKind::File,
                ObjectKind::Dir,
                ObjectKind::Symlink,
                ObjectKind::Submodule
            ]
        );
        assert!(ObjectKind::Dir.is_dir());
        assert!(!ObjectKind::File.is_dir());
    }
}

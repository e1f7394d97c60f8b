//! VFS path handling.
//!
//! Paths are opaque keys into the remote namespace. Nothing here resolves
//! `.` or `..` or canonicalizes slashes; only the trailing slash is trimmed
//! when joining so `join` never produces `//`.

use crate::config::DIR_MARKER;
use std::fmt;

/// A slash-delimited key in the remote object namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the repository root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Join a child name.
    pub fn join(&self, name: &str) -> Self {
        let base = self.0.trim_end_matches('/');
        if base.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{}", base, name))
        }
    }

    /// Path of the marker object that makes this path a directory.
    pub fn marker(&self) -> Self {
        self.join(DIR_MARKER)
    }

    /// Check if this path names a directory marker.
    pub fn is_marker(&self) -> bool {
        self.name() == DIR_MARKER
    }

    /// Get the last component.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for VirtualPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(VirtualPath::new("docs").join("a.txt").as_str(), "docs/a.txt");
        assert_eq!(VirtualPath::new("docs/").join("a.txt").as_str(), "docs/a.txt");
        assert_eq!(VirtualPath::new("").join("a.txt").as_str(), "a.txt");
    }

    #[test]
    fn test_marker() {
        let marker = VirtualPath::new("docs/sub").marker();
        assert_eq!(marker.as_str(), "docs/sub/.keep");
        assert!(marker.is_marker());
        assert!(!VirtualPath::new("docs/keep").is_marker());
    }

    #[test]
    fn test_no_normalization() {
        let path = VirtualPath::new("./a/../b");
        assert_eq!(path.as_str(), "./a/../b");
        assert_eq!(path.name(), "b");
        assert_eq!(path.join("c").as_str(), "./a/../b/c");
    }

    #[test]
    fn test_root() {
        assert!(VirtualPath::new("").is_root());
        assert!(!VirtualPath::new("a").is_root());
        assert_eq!(VirtualPath::new("").marker().as_str(), ".keep");
    }
}

//! Virtual File System over a remote content store.
//!
//! Provides file and directory semantics on top of a flat, revisioned
//! path-to-blob store, encrypting every blob on the way in.

mod operations;
mod path;
mod types;

pub use operations::GitHubVfs;
pub use path::VirtualPath;
pub use types::{DeleteReport, DirEntry};

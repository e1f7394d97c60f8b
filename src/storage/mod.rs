//! Remote content storage.
//!
//! This module provides:
//! - The `ContentStore` trait: get, conditional put, conditional delete, list
//! - `GitHubContents`, the adapter for the GitHub repository contents API
//! - `MemoryStore`, an in-process store with the same revision rules

mod github;
mod memory;
mod store;
mod types;

pub use github::GitHubContents;
pub use memory::{CommitOp, CommitRecord, MemoryStore};
pub use store::ContentStore;
pub use types::{DeleteRequest, ObjectKind, ObjectMetadata, PutRequest, RemoteEntry, RemoteObject};

//! Resilience tests: tampering, conflicting writers and partial failures.

use async_trait::async_trait;
use gh_vfs::config::{Committer, KdfParams};
use gh_vfs::crypto::{Codec, Envelope};
use gh_vfs::storage::{
    ContentStore, DeleteRequest, MemoryStore, ObjectMetadata, PutRequest, RemoteObject,
};
use gh_vfs::vfs::GitHubVfs;
use gh_vfs::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn codec() -> Codec {
    Codec::new("resilience", KdfParams::new(4, 8, 1))
}

/// Store that lets another writer commit between a caller's lookup and put.
struct RacingStore {
    inner: Arc<MemoryStore>,
    raced: AtomicBool,
}

#[async_trait]
impl ContentStore for RacingStore {
    async fn get(&self, path: &str) -> Result<Option<RemoteObject>> {
        self.inner.get(path).await
    }

    async fn put(&self, request: PutRequest<'_>) -> Result<ObjectMetadata> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let rival = Committer::new("rival", "rival@example.com");
            let current = self.inner.metadata(request.path).await?;
            self.inner
                .put(PutRequest {
                    path: request.path,
                    content: "cml2YWw=",
                    sha: current.as_ref().map(|m| m.sha.as_str()),
                    message: "rival write",
                    committer: &rival,
                })
                .await?;
        }
        self.inner.put(request).await
    }

    async fn delete(&self, request: DeleteRequest<'_>) -> Result<()> {
        self.inner.delete(request).await
    }
}

/// Store whose deletes fail with a server error.
struct FailingDeletes {
    inner: Arc<MemoryStore>,
    attempts: AtomicUsize,
}

#[async_trait]
impl ContentStore for FailingDeletes {
    async fn get(&self, path: &str) -> Result<Option<RemoteObject>> {
        self.inner.get(path).await
    }

    async fn put(&self, request: PutRequest<'_>) -> Result<ObjectMetadata> {
        self.inner.put(request).await
    }

    async fn delete(&self, _request: DeleteRequest<'_>) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        })
    }
}

#[tokio::test]
async fn test_update_race_surfaces_conflict() {
    let inner = Arc::new(MemoryStore::new());
    let setup = GitHubVfs::with_store(inner.clone(), codec());
    setup.write_file("shared.txt", b"v1", None).await.unwrap();

    let racing = Arc::new(RacingStore {
        inner: inner.clone(),
        raced: AtomicBool::new(false),
    });
    let vfs = GitHubVfs::with_store(racing, codec());

    let err = vfs.write_file("shared.txt", b"v2", None).await.unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {:?}", err);

    // the rival's write stands; nothing was retried
    assert_eq!(inner.raw("shared.txt").unwrap(), b"rival");
    assert_eq!(inner.commits().len(), 2);
}

#[tokio::test]
async fn test_create_race_surfaces_conflict() {
    let inner = Arc::new(MemoryStore::new());
    let racing = Arc::new(RacingStore {
        inner: inner.clone(),
        raced: AtomicBool::new(false),
    });
    let vfs = GitHubVfs::with_store(racing, codec());

    let err = vfs.write_file("new.txt", b"mine", None).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(inner.raw("new.txt").unwrap(), b"rival");
}

#[tokio::test]
async fn test_stale_revision_delete_conflicts() {
    let store = Arc::new(MemoryStore::new());
    let vfs = GitHubVfs::with_store(store.clone(), codec());
    let old = vfs.write_file("a.txt", b"1", None).await.unwrap();
    vfs.write_file("a.txt", b"2", None).await.unwrap();

    let who = Committer::default();
    let err = store
        .delete(DeleteRequest {
            path: "a.txt",
            sha: &old.sha,
            message: "stale",
            committer: &who,
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(vfs.read_file("a.txt").await.unwrap(), b"2");
}

#[tokio::test]
async fn test_tampered_blob_fails_closed() {
    let store = Arc::new(MemoryStore::new());
    let vfs = GitHubVfs::with_store(store.clone(), codec());
    vfs.write_file("secret.txt", b"attack at dawn", None)
        .await
        .unwrap();

    let stored = String::from_utf8(store.raw("secret.txt").unwrap()).unwrap();
    let mut envelope: Envelope = stored.parse().unwrap();
    envelope.ciphertext[3] ^= 0x10;
    store.insert_raw("secret.txt", envelope.to_string().into_bytes());

    let err = vfs.read_file("secret.txt").await.unwrap_err();
    assert!(matches!(err, Error::Decryption));
}

#[tokio::test]
async fn test_tampered_tag_fails_closed() {
    let store = Arc::new(MemoryStore::new());
    let vfs = GitHubVfs::with_store(store.clone(), codec());
    vfs.write_file("secret.txt", b"x", None).await.unwrap();

    let stored = String::from_utf8(store.raw("secret.txt").unwrap()).unwrap();
    let mut envelope: Envelope = stored.parse().unwrap();
    envelope.tag[0] ^= 0x01;
    store.insert_raw("secret.txt", envelope.to_string().into_bytes());

    assert!(vfs
        .read_file("secret.txt")
        .await
        .unwrap_err()
        .is_decryption_failure());
}

#[tokio::test]
async fn test_plaintext_blob_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    store.insert_raw("legacy.txt", b"committed without encryption".to_vec());
    let vfs = GitHubVfs::with_store(store, codec());

    let err = vfs.read_file("legacy.txt").await.unwrap_err();
    assert!(matches!(err, Error::InvalidEnvelope(_)));
}

#[tokio::test]
async fn test_binary_blob_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    store.insert_raw("image.png", vec![0x89, 0x50, 0x4E, 0x47, 0xFF, 0xFE]);
    let vfs = GitHubVfs::with_store(store, codec());

    assert!(vfs
        .read_file("image.png")
        .await
        .unwrap_err()
        .is_decryption_failure());
}

#[tokio::test]
async fn test_move_interrupted_leaves_both_copies() {
    let inner = Arc::new(MemoryStore::new());
    let setup = GitHubVfs::with_store(inner.clone(), codec());
    setup.write_file("a.txt", b"payload", None).await.unwrap();

    let failing = Arc::new(FailingDeletes {
        inner: inner.clone(),
        attempts: AtomicUsize::new(0),
    });
    let vfs = GitHubVfs::with_store(failing.clone(), codec());

    let err = vfs.move_file("a.txt", "b.txt", None).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, .. }));
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);

    assert_eq!(setup.read_file("a.txt").await.unwrap(), b"payload");
    assert_eq!(setup.read_file("b.txt").await.unwrap(), b"payload");
}

#[tokio::test]
async fn test_delete_dir_stops_at_first_failure() {
    let inner = Arc::new(MemoryStore::new());
    let setup = GitHubVfs::with_store(inner.clone(), codec());
    setup.create_dir("d", None).await.unwrap();
    setup.write_file("d/a.txt", b"a", None).await.unwrap();

    let failing = Arc::new(FailingDeletes {
        inner: inner.clone(),
        attempts: AtomicUsize::new(0),
    });
    let vfs = GitHubVfs::with_store(failing.clone(), codec());

    assert!(vfs.delete_dir("d", None).await.is_err());
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(inner.paths().len(), 2);
}

#[tokio::test]
async fn test_many_writes_same_path() {
    let store = Arc::new(MemoryStore::new());
    let vfs = GitHubVfs::with_store(store.clone(), codec());

    for i in 0..10 {
        vfs.write_file("counter.txt", i.to_string().as_bytes(), None)
            .await
            .unwrap();
    }

    assert_eq!(vfs.read_to_string("counter.txt").await.unwrap(), "9");
    assert_eq!(store.commits().len(), 10);
}

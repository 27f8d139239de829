//! File lifecycle store: at-most-once delivery of extraction artifacts.
//!
//! Every produced audio file is registered here under a token (its file
//! name). A token can be claimed exactly once; the claim hands back a
//! [`ServeGuard`] that deletes the backing file when dropped, whether the
//! response stream completed, failed, or was abandoned midway. Any further
//! lookup of the token fails.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

/// Lifecycle state of a registered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    /// Registered and never claimed.
    Available,
    /// A claim is live; the response is (or is about to be) streaming.
    Serving,
    /// The serve finished and the backing file has been removed.
    Deleted,
}

#[derive(Debug)]
struct FileEntry {
    path: PathBuf,
    display_name: String,
    content_type: String,
    state: FileState,
}

/// Registry of files available for one-time retrieval.
///
/// Cloning is cheap; all clones share the same registry. Claims on distinct
/// tokens proceed independently; claims on the same token are serialized by
/// the map's shard lock, so two concurrent callers can never both observe
/// `Available`.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: Arc<DashMap<String, FileEntry>>,
}

impl FileStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as available for exactly one retrieval.
    ///
    /// Returns the token clients use to fetch it: the file's name component.
    pub fn register(
        &self,
        path: PathBuf,
        display_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> String {
        let token = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        self.files.insert(
            token.clone(),
            FileEntry {
                path,
                display_name: display_name.into(),
                content_type: content_type.into(),
                state: FileState::Available,
            },
        );
        token
    }

    /// Atomically transition `token` from Available to Serving.
    ///
    /// Returns `None` when the token is unknown, already serving, or already
    /// deleted. The returned guard owns the deletion obligation: dropping it
    /// removes the file and retires the token for good.
    pub fn claim(&self, token: &str) -> Option<ServeGuard> {
        let mut entry = self.files.get_mut(token)?;
        if entry.state != FileState::Available {
            return None;
        }
        entry.state = FileState::Serving;

        Some(ServeGuard {
            files: Arc::clone(&self.files),
            token: token.to_owned(),
            path: entry.path.clone(),
            display_name: entry.display_name.clone(),
            content_type: entry.content_type.clone(),
        })
    }

    /// Number of tokens currently available for retrieval.
    pub fn available(&self) -> usize {
        self.files
            .iter()
            .filter(|e| e.state == FileState::Available)
            .count()
    }
}

/// Live claim on a registered file.
///
/// Dropping the guard deletes the backing file (best-effort; failures are
/// logged, not surfaced, since the response has already gone out) and marks
/// the token Deleted.
#[derive(Debug)]
pub struct ServeGuard {
    files: Arc<DashMap<String, FileEntry>>,
    token: String,
    path: PathBuf,
    display_name: String,
    content_type: String,
}

impl ServeGuard {
    /// Path of the file being served.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Human-readable name recorded at registration.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// MIME type recorded at registration.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl Drop for ServeGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove served file");
            }
        }
        if let Some(mut entry) = self.files.get_mut(&self.token) {
            entry.state = FileState::Deleted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_audio(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("audiofetch-store-tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"ID3fakeaudio").unwrap();
        path
    }

    #[test]
    fn register_then_claim_once() {
        let store = FileStore::new();
        let path = tmp_audio("claim-once.mp3");
        let token = store.register(path.clone(), "Claim Once", "audio/mpeg");
        assert_eq!(token, "claim-once.mp3");

        let guard = store.claim(&token).expect("first claim succeeds");
        assert_eq!(guard.path(), path.as_path());
        assert_eq!(guard.content_type(), "audio/mpeg");
        assert_eq!(guard.display_name(), "Claim Once");

        // Second claim while serving fails.
        assert!(store.claim(&token).is_none());

        drop(guard);
        assert!(!path.exists(), "file removed after guard drop");

        // And still fails after deletion.
        assert!(store.claim(&token).is_none());
    }

    #[test]
    fn unknown_token_is_none() {
        let store = FileStore::new();
        assert!(store.claim("nope.mp3").is_none());
    }

    #[test]
    fn concurrent_claims_exactly_one_wins() {
        let store = FileStore::new();
        let path = tmp_audio("race.mp3");
        let token = store.register(path, "Race", "audio/mpeg");

        let winners: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let token = token.clone();
                    scope.spawn(move || store.claim(&token).is_some())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(
            winners.iter().filter(|w| **w).count(),
            1,
            "exactly one concurrent claim must win"
        );
    }

    #[test]
    fn deletion_is_best_effort() {
        let store = FileStore::new();
        // Register a path that does not exist; the drop must not panic.
        let token = store.register(PathBuf::from("/nonexistent/ghost.mp3"), "Ghost", "audio/mpeg");
        let guard = store.claim(&token).unwrap();
        drop(guard);
        assert!(store.claim(&token).is_none());
    }

    #[test]
    fn distinct_tokens_serve_independently() {
        let store = FileStore::new();
        let a = store.register(tmp_audio("indep-a.mp3"), "A", "audio/mpeg");
        let b = store.register(tmp_audio("indep-b.mp3"), "B", "audio/mpeg");

        let ga = store.claim(&a).unwrap();
        let gb = store.claim(&b).unwrap();
        drop(ga);

        // Consuming one token does not affect the other.
        assert!(store.claim(&a).is_none());
        assert_eq!(gb.display_name(), "B");
    }

    #[test]
    fn available_counts_unclaimed_only() {
        let store = FileStore::new();
        let a = store.register(tmp_audio("count-a.mp3"), "A", "audio/mpeg");
        store.register(tmp_audio("count-b.mp3"), "B", "audio/mpeg");
        assert_eq!(store.available(), 2);

        let _guard = store.claim(&a).unwrap();
        assert_eq!(store.available(), 1);
    }
}

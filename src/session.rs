//! Session state: the bearer credential and the signed-in identity.
//!
//! The store carries an epoch counter that changes whenever the identity
//! changes. Requests remember the epoch they were issued under, and a late
//! unauthorized response only signs out the session it belongs to
//! (see [`SessionStore::clear_if_epoch`]).

use crate::models::User;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

/// Process-wide credential and identity.
pub trait SessionStore: Send + Sync {
    /// Bearer token to attach to the next request.
    fn current_credential(&self) -> Option<String>;

    fn user(&self) -> Option<User>;

    /// Counter bumped on every identity change.
    fn epoch(&self) -> u64;

    /// Replaces the session after a successful sign-in.
    fn set_auth(&self, user: Option<User>, access_token: String);

    /// Updates the identity without touching the credential.
    fn set_user(&self, user: User);

    /// Forgets credential and identity. Returns `false` if there was nothing to clear.
    fn clear_session(&self) -> bool;

    /// Clears only if no sign-in or sign-out happened since `epoch` was read.
    fn clear_if_epoch(&self, epoch: u64) -> bool;

    fn is_signed_in(&self) -> bool {
        self.current_credential().is_some()
    }
}

/// Serialized form of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl SessionSnapshot {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.user.is_none()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    snapshot: SessionSnapshot,
    epoch: u64,
}

/// Session kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            state: RwLock::new(SessionState { snapshot, epoch: 0 }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state
            .read()
            .map(|s| s.snapshot.clone())
            .unwrap_or_default()
    }

    // Returns whether the state changed.
    fn update(&self, f: impl FnOnce(&mut SessionState) -> bool) -> bool {
        match self.state.write() {
            Ok(mut state) => f(&mut state),
            Err(_) => {
                warn!("session lock poisoned; update skipped");
                false
            }
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn current_credential(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.snapshot.access_token.clone())
    }

    fn user(&self) -> Option<User> {
        self.state.read().ok().and_then(|s| s.snapshot.user.clone())
    }

    fn epoch(&self) -> u64 {
        self.state.read().map(|s| s.epoch).unwrap_or(0)
    }

    fn set_auth(&self, user: Option<User>, access_token: String) {
        self.update(|state| {
            state.snapshot = SessionSnapshot {
                access_token: Some(access_token),
                user,
            };
            state.epoch += 1;
            true
        });
    }

    fn set_user(&self, user: User) {
        self.update(|state| {
            state.snapshot.user = Some(user);
            true
        });
    }

    fn clear_session(&self) -> bool {
        self.update(|state| {
            if state.snapshot.is_empty() {
                return false;
            }
            state.snapshot = SessionSnapshot::default();
            state.epoch += 1;
            true
        })
    }

    fn clear_if_epoch(&self, epoch: u64) -> bool {
        self.update(|state| {
            if state.epoch != epoch {
                debug!(
                    request_epoch = epoch,
                    current_epoch = state.epoch,
                    "ignoring sign-out from a stale session"
                );
                return false;
            }
            if state.snapshot.is_empty() {
                return false;
            }
            state.snapshot = SessionSnapshot::default();
            state.epoch += 1;
            true
        })
    }
}

/// Session persisted as JSON on disk, in the `auth-storage` layout.
///
/// The file is read once on open and rewritten after every change. Write
/// failures are logged; the in-memory session stays authoritative.
///
/// A change and its write happen under one lock, so the file always ends up
/// holding the last in-memory state.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    inner: MemorySessionStore,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Opens the store, loading any session already on disk.
    ///
    /// A missing file starts an empty session. An unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => SessionSnapshot::default(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionSnapshot::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            inner: MemorySessionStore::with_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Callers hold the write lock.
    fn persist(&self) {
        let snapshot = self.inner.snapshot();
        let result = serde_json::to_string_pretty(&snapshot)
            .map_err(std::io::Error::from)
            .and_then(|text| {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(&self.path, text)
            });
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

impl SessionStore for FileSessionStore {
    fn current_credential(&self) -> Option<String> {
        self.inner.current_credential()
    }

    fn user(&self) -> Option<User> {
        self.inner.user()
    }

    fn epoch(&self) -> u64 {
        self.inner.epoch()
    }

    fn set_auth(&self, user: Option<User>, access_token: String) {
        let _writes = self.lock_writes();
        self.inner.set_auth(user, access_token);
        self.persist();
    }

    fn set_user(&self, user: User) {
        let _writes = self.lock_writes();
        self.inner.set_user(user);
        self.persist();
    }

    fn clear_session(&self) -> bool {
        let _writes = self.lock_writes();
        let cleared = self.inner.clear_session();
        if cleared {
            self.persist();
        }
        cleared
    }

    fn clear_if_epoch(&self, epoch: u64) -> bool {
        let _writes = self.lock_writes();
        let cleared = self.inner.clear_if_epoch(epoch);
        if cleared {
            self.persist();
        }
        cleared
    }
}

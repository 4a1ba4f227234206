// ── Session context ──
//
// One injectable handle on "who is signed in". Front ends clone the
// context freely; every clone sees the same session. Persistence goes
// through a `SessionStore` so tests can stay in memory while the CLI and
// TUI share a file or keyring entry across runs.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// An authenticated session. The token is opaque and never inspected.
///
/// A backend may accept credentials without handing out a token. That
/// session still counts as signed in; only token-gated calls such as the
/// profile picture are unavailable.
#[derive(Clone)]
pub struct Session {
    token: Option<SecretString>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: Option<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            username,
            created_at: Utc::now(),
        }
    }

    /// A session the backend opened without issuing a token.
    pub fn without_token(username: Option<String>) -> Self {
        Self {
            token: None,
            username,
            created_at: Utc::now(),
        }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// On-disk / keyring representation.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session
                .token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            username: session.username.clone(),
            created_at: session.created_at,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: stored.token.map(SecretString::from),
            username: stored.username,
            created_at: stored.created_at,
        }
    }
}

fn session_error(message: impl fmt::Display) -> CoreError {
    CoreError::Session {
        message: message.to_string(),
    }
}

// ── Stores ──────────────────────────────────────────────────────────

/// Where a session survives between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, CoreError>;
    fn save(&self, session: &Session) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
    /// Short human-readable location, e.g. a file path.
    fn describe(&self) -> String;
}

/// Keeps the session for the lifetime of the process only.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        Ok(self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

/// JSON file, readable only by the owner on Unix.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(session_error(format!("{}: {e}", self.path.display()))),
        };
        let stored: StoredSession = serde_json::from_str(&raw)
            .map_err(|e| session_error(format!("{}: {e}", self.path.display())))?;
        Ok(Some(stored.into()))
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(session_error)?;
        }
        let json =
            serde_json::to_string_pretty(&StoredSession::from(session)).map_err(session_error)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            // Owner-only from the moment the file exists.
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(session_error)?;

        // `mode` only applies on creation; tighten a file left by an older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(session_error)?;
        }
        file.write_all(json.as_bytes()).map_err(session_error)?;

        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_error(e)),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// System keyring entry, one per profile.
pub struct KeyringSessionStore {
    service: String,
    account: String,
}

impl KeyringSessionStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| session_error(format!("failed to access keyring: {e}")))
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        let raw = match self.entry()?.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(session_error(format!("failed to read keyring: {e}"))),
        };
        let stored: StoredSession = serde_json::from_str(&raw).map_err(session_error)?;
        Ok(Some(stored.into()))
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        let json = serde_json::to_string(&StoredSession::from(session)).map_err(session_error)?;
        self.entry()?
            .set_password(&json)
            .map_err(|e| session_error(format!("failed to write keyring: {e}")))
    }

    fn clear(&self) -> Result<(), CoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(session_error(format!("failed to clear keyring: {e}"))),
        }
    }

    fn describe(&self) -> String {
        format!("keyring ({}/{})", self.service, self.account)
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Shared, cloneable view of the current session.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    /// Restore whatever session `store` holds.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        let session = store.load()?;
        debug!(
            store = %store.describe(),
            restored = session.is_some(),
            "session context loaded"
        );
        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            store,
        })
    }

    /// Empty context backed by a [`MemorySessionStore`].
    pub fn in_memory() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store: Arc::new(MemorySessionStore::default()),
        }
    }

    /// Persist `session` and make it current.
    pub fn begin(&self, session: Session) -> Result<(), CoreError> {
        self.store.save(&session)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Forget the session locally and in the store.
    pub fn end(&self) -> Result<(), CoreError> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.store.clear()
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.current().and_then(|s| s.token)
    }

    pub fn username(&self) -> Option<String> {
        self.current().and_then(|s| s.username)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn require_token(&self) -> Result<SecretString, CoreError> {
        self.token().ok_or(CoreError::NotAuthenticated)
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .field("store", &self.store.describe())
            .finish()
    }
}

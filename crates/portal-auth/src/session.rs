//! The process-wide session handle.
//!
//! [`Session`] wraps the injected [`SessionStore`] and [`Navigator`] and owns
//! the single path that ends a session after an HTTP 401.
//!
//! Many requests can be in flight when a token is revoked, and each of them
//! reports its own 401. Only the first one may clear storage and navigate:
//! a 401 counts only when the token it was sent with is still the stored
//! token. A 401 on a request that carried no token counts once until the
//! next login. Both checks run under one lock shared with [`Session::begin`],
//! so a stale 401 can never wipe a login that happened after it was sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use portal_rbac::AccessSnapshot;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::navigator::{LogNavigator, Navigator, LOGIN_PATH};
use crate::store::{MemorySessionStore, SessionStore, StorageKey};
use crate::user::{SessionCredential, UserInfo};

/// Shared session state for one process.
pub struct Session {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    transition: Mutex<()>,
    redirected: AtomicBool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("redirected", &self.redirected.load(Ordering::SeqCst))
            .finish()
    }
}

impl Session {
    /// Create a session over an injected store and navigator.
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            transition: Mutex::new(()),
            redirected: AtomicBool::new(false),
        }
    }

    /// In-memory session that only logs navigation. Useful for tools and tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), Arc::new(LogNavigator))
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current bearer token, if any.
    ///
    /// Storage failures are logged and read as "no token", so requests go
    /// out unauthenticated instead of failing.
    pub fn access_token(&self) -> Option<String> {
        self.read(StorageKey::AuthToken)
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(StorageKey::RefreshToken)
    }

    /// Whether a bearer token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// The signed-in user, if stored.
    pub fn user_info(&self) -> SessionResult<Option<UserInfo>> {
        match self.store.get(StorageKey::UserInfo)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Permission/role snapshot of the signed-in user; empty when anonymous.
    pub fn access(&self) -> AccessSnapshot {
        match self.user_info() {
            Ok(Some(user)) => user.access(),
            Ok(None) => AccessSnapshot::empty(),
            Err(e) => {
                warn!(error = %e, "Stored user info is unreadable, treating session as anonymous");
                AccessSnapshot::empty()
            }
        }
    }

    /// Store a new session after login.
    pub fn begin(&self, credential: &SessionCredential, user: Option<&UserInfo>) -> SessionResult<()> {
        let _guard = self.transition.lock().map_err(|_| SessionError::Poisoned)?;

        self.store.clear()?;
        self.store.set(StorageKey::AuthToken, &credential.access_token)?;
        if let Some(ref refresh) = credential.refresh_token {
            self.store.set(StorageKey::RefreshToken, refresh)?;
        }
        if let Some(user) = user {
            self.store.set(StorageKey::UserInfo, &serde_json::to_string(user)?)?;
        }
        self.redirected.store(false, Ordering::SeqCst);

        info!(user_id = ?user.map(|u| u.id), "Session started");
        Ok(())
    }

    /// Replace the access token, e.g. after a refresh. The user stays signed in.
    pub fn rotate(&self, credential: &SessionCredential) -> SessionResult<()> {
        let _guard = self.transition.lock().map_err(|_| SessionError::Poisoned)?;
        self.store.set(StorageKey::AuthToken, &credential.access_token)?;
        if let Some(ref refresh) = credential.refresh_token {
            self.store.set(StorageKey::RefreshToken, refresh)?;
        }
        debug!("Session token rotated");
        Ok(())
    }

    /// Store profile details shown by the host application.
    pub fn set_profile(&self, profile: &serde_json::Value) -> SessionResult<()> {
        let _guard = self.transition.lock().map_err(|_| SessionError::Poisoned)?;
        self.store.set(StorageKey::UserProfile, &profile.to_string())
    }

    /// Stored profile details, if any.
    pub fn profile(&self) -> SessionResult<Option<serde_json::Value>> {
        match self.store.get(StorageKey::UserProfile)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Explicit logout: clear every session key. Navigation is left to the caller.
    pub fn end(&self) -> SessionResult<()> {
        let _guard = self.transition.lock().map_err(|_| SessionError::Poisoned)?;
        self.store.clear()?;
        info!("Session ended");
        Ok(())
    }

    /// React to an HTTP 401 for a request sent with `sent_token`.
    ///
    /// Returns `true` when this call cleared the session and navigated to
    /// the login screen, `false` when the 401 was stale or already handled.
    ///
    /// The navigator runs after the lock is released, so it may call back
    /// into the session.
    pub fn handle_unauthorized(&self, sent_token: Option<&str>) -> bool {
        {
            let _guard = match self.transition.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            let current = self.access_token();
            let should_handle = match (sent_token, current.as_deref()) {
                (Some(sent), Some(current)) => sent == current,
                (Some(_), None) => false,
                (None, _) => !self.redirected.load(Ordering::SeqCst),
            };

            if !should_handle {
                debug!("Ignoring stale 401");
                return false;
            }

            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear session after 401");
            }
            self.redirected.store(true, Ordering::SeqCst);
        }

        info!(path = LOGIN_PATH, "Session rejected by server, redirecting to login");
        self.navigator.navigate(LOGIN_PATH);
        true
    }

    fn read(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "Failed to read session value");
                None
            }
        }
    }
}

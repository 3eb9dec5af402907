//! Session store: the single source of truth for who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The route guard, the layout chrome, and every data page read the session
//! from here. Only this module mutates it; everything else subscribes.
//!
//! STATE MACHINE
//! =============
//! `Unknown` (before restoration) resolves exactly once to `Authenticated` or
//! `Unauthenticated` and never returns. Afterwards sign-in moves to
//! `Authenticated`; sign-out or a rejected token moves to `Unauthenticated`.
//!
//! Subscribers are invoked synchronously after the new state is stored and
//! before the mutating call returns, so a caller that awaits `sign_in` and
//! then asks the route guard sees the new session.
//!
//! TOKEN FAILURES
//! ==============
//! A rejection only ends the session it was issued for. Refreshes run one at
//! a time; callers queued behind a refresh reuse the session it produced, so
//! a rotated single-use refresh token is never presented twice.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::net::auth::{AuthBackend, SignUpResponse, SupabaseAuth};
use crate::net::error::{ApiError, AuthError};
use crate::net::types::{Session, User, UserUpdate};
use crate::util::storage;
use crate::util::time::now_secs;

/// `localStorage` key holding the serialized [`Session`].
pub const SESSION_STORAGE_KEY: &str = "crm.auth.session";

/// Refresh the access token when it expires within this many seconds.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Current authentication status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted session not yet restored.
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }
}

/// Result of a successful sign-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Account created and signed in.
    SignedIn,
    /// Account created; the user must follow the emailed link first.
    ConfirmationRequired { email: String },
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Where the session survives page reloads.
pub trait SessionPersistence {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Browser `localStorage` persistence (no-op outside the browser).
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStoragePersistence;

impl SessionPersistence for LocalStoragePersistence {
    fn load(&self) -> Option<Session> {
        storage::load_json(SESSION_STORAGE_KEY)
    }

    fn save(&self, session: &Session) {
        storage::save_json(SESSION_STORAGE_KEY, session);
    }

    fn clear(&self) {
        storage::remove(SESSION_STORAGE_KEY);
    }
}

/// In-memory persistence, shared between clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(session))) }
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Option<Session> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, session: &Session) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct Inner<B, P> {
    backend: B,
    persistence: P,
    state: RwLock<SessionState>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    refresh_lock: futures::lock::Mutex<()>,
}

/// Observable session container. Clones share the same state.
pub struct SessionStore<B, P> {
    inner: Arc<Inner<B, P>>,
}

impl<B, P> Clone for SessionStore<B, P> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

/// The store as wired in the browser app.
pub type AppSessionStore = SessionStore<SupabaseAuth, LocalStoragePersistence>;

impl<B: AuthBackend, P: SessionPersistence> SessionStore<B, P> {
    #[must_use]
    pub fn new(backend: B, persistence: P) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                persistence,
                state: RwLock::new(SessionState::Unknown),
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                refresh_lock: futures::lock::Mutex::new(()),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.current().user().cloned()
    }

    /// Register `observer`; it runs after every state change.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    /// Store `next`, then notify. Locks are released before observers run so
    /// an observer may read the store or (un)subscribe.
    fn transition(&self, next: SessionState) {
        *self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        let observers: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
    }

    fn establish(&self, session: Session) {
        log::info!("session established for user {}", session.user.id);
        self.inner.persistence.save(&session);
        self.transition(SessionState::Authenticated(session));
    }

    fn clear(&self) {
        self.inner.persistence.clear();
        self.transition(SessionState::Unauthenticated);
    }

    /// Resolve the initial `Unknown` state from persistence.
    pub async fn restore(&self) -> SessionState {
        self.restore_at(now_secs()).await
    }

    /// [`Self::restore`] with an explicit clock.
    pub async fn restore_at(&self, now: i64) -> SessionState {
        if self.current().is_resolved() {
            return self.current();
        }

        let resolved = match self.inner.persistence.load() {
            None => None,
            Some(session) if !session.expires_within(now, REFRESH_MARGIN_SECS) => Some(session),
            Some(stale) => match self.inner.backend.refresh_session(&stale.refresh_token).await {
                Ok(fresh) => Some(fresh),
                Err(err) => {
                    log::info!("stored session could not be refreshed: {err}");
                    None
                }
            },
        };

        // Another operation may have resolved the state while we awaited.
        if self.current().is_resolved() {
            return self.current();
        }
        match resolved {
            Some(session) => self.establish(session),
            None => self.clear(),
        }
        self.current()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`AuthError`]; the session is left unchanged.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let session = self.inner.backend.sign_in_with_password(email.trim(), password).await?;
        let user = session.user.clone();
        self.establish(session);
        Ok(user)
    }

    /// Create an account. Signs in only when the provider returns a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserAlreadyExists`], [`AuthError::WeakPassword`],
    /// or a transport error.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpOutcome, AuthError> {
        let email = email.trim();
        match self.inner.backend.sign_up(email, password, name.trim()).await? {
            SignUpResponse::Session(session) => {
                self.establish(session);
                Ok(SignUpOutcome::SignedIn)
            }
            SignUpResponse::ConfirmationRequired(_) => {
                Ok(SignUpOutcome::ConfirmationRequired { email: email.to_owned() })
            }
        }
    }

    /// Clear the session locally, then revoke it remotely. Always succeeds:
    /// the local clear is authoritative and a failed revoke is only logged.
    pub async fn sign_out(&self) {
        let token = match self.current() {
            SessionState::Authenticated(session) => Some(session.access_token),
            _ => None,
        };
        self.clear();
        log::info!("signed out");

        if let Some(token) = token {
            if let Err(err) = self.inner.backend.sign_out(&token).await {
                log::warn!("remote sign-out failed: {err}");
            }
        }
    }

    /// Trigger a reset email. Provider-side rejections are reported as
    /// success so the form cannot reveal which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] when the request itself fails.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self.inner.backend.recover_password(email.trim()).await {
            Ok(()) => Ok(()),
            Err(AuthError::Network(detail)) => Err(AuthError::Network(detail)),
            Err(err) => {
                log::debug!("password reset request rejected upstream: {err}");
                Ok(())
            }
        }
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session, or the
    /// provider's policy error; the session is unchanged on failure.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        self.update_user(&UserUpdate::password(new_password)).await.map(|_| ())
    }

    /// Persist a new display name on the auth user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session.
    pub async fn update_profile(&self, display_name: &str) -> Result<User, AuthError> {
        self.update_user(&UserUpdate::display_name(display_name)).await
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, AuthError> {
        let session = self.authenticated()?;
        let user = self
            .inner
            .backend
            .update_user(&session.access_token, update)
            .await
            .inspect_err(|err| {
                if matches!(err, AuthError::SessionExpired) {
                    self.expire_session(&session.access_token);
                }
            })?;
        self.replace_user(&session.access_token, user.clone());
        Ok(user)
    }

    /// Set a new password using the one-time token from a recovery link.
    /// The recovery token never becomes the app session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] for a used or expired link, or
    /// the provider's policy error.
    pub async fn complete_password_recovery(&self, recovery_token: &str, new_password: &str) -> Result<(), AuthError> {
        self.inner
            .backend
            .update_user(recovery_token, &UserUpdate::password(new_password))
            .await?;
        if let Err(err) = self.inner.backend.sign_out(recovery_token).await {
            log::debug!("recovery token revoke failed: {err}");
        }
        Ok(())
    }

    /// Swap in `user` if the session that made the update is still current.
    fn replace_user(&self, access_token: &str, user: User) {
        if let SessionState::Authenticated(mut session) = self.current() {
            if session.access_token == access_token {
                session.user = user;
                self.inner.persistence.save(&session);
                self.transition(SessionState::Authenticated(session));
            }
        }
    }

    fn authenticated(&self) -> Result<Session, AuthError> {
        match self.current() {
            SessionState::Authenticated(session) => Ok(session),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Drop the session that owns `access_token` after the backend rejected
    /// it. A newer session is left alone.
    pub fn expire_session(&self, access_token: &str) {
        self.expire_if(|session| session.access_token == access_token);
    }

    fn expire_if(&self, owns_rejected_token: impl Fn(&Session) -> bool) {
        match self.current() {
            SessionState::Authenticated(session) if owns_rejected_token(&session) => {
                log::info!("session expired; signing out locally");
                self.clear();
            }
            SessionState::Authenticated(_) => {
                log::debug!("ignoring token rejection for a replaced session");
            }
            _ => {}
        }
    }

    /// Access token valid for at least [`REFRESH_MARGIN_SECS`], refreshing
    /// first when needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] without a session, or
    /// [`AuthError::SessionExpired`] when the refresh is rejected.
    pub async fn access_token_at(&self, now: i64) -> Result<String, AuthError> {
        let session = self.authenticated()?;
        if !session.expires_within(now, REFRESH_MARGIN_SECS) {
            return Ok(session.access_token);
        }

        let _refreshing = self.inner.refresh_lock.lock().await;
        // Whoever held the lock before us may already have refreshed.
        let session = self.authenticated()?;
        if !session.expires_within(now, REFRESH_MARGIN_SECS) {
            return Ok(session.access_token);
        }

        let used_refresh = session.refresh_token;
        match self.inner.backend.refresh_session(&used_refresh).await {
            Ok(fresh) => match self.current() {
                SessionState::Authenticated(current) if current.refresh_token == used_refresh => {
                    let token = fresh.access_token.clone();
                    self.establish(fresh);
                    Ok(token)
                }
                // Signed in again while the refresh was in flight.
                SessionState::Authenticated(current) => Ok(current.access_token),
                _ => Err(AuthError::NotAuthenticated),
            },
            Err(AuthError::Network(detail)) => Err(AuthError::Network(detail)),
            Err(err) => {
                log::info!("token refresh rejected: {err}");
                self.expire_if(|current| current.refresh_token == used_refresh);
                Err(AuthError::SessionExpired)
            }
        }
    }

    /// Run an authenticated data call. A rejected token expires the session,
    /// which the route guard turns into a login redirect.
    ///
    /// # Errors
    ///
    /// Returns the call's [`ApiError`], or [`ApiError::Unauthorized`] when no
    /// usable token exists.
    pub async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self.access_token_at(now_secs()).await?;
        let result = call(token.clone()).await;
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.expire_session(&token);
        }
        result
    }
}

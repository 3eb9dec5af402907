use std::sync::atomic::AtomicUsize;
use std::task::Poll;

use futures::executor::block_on;
use futures::future::{join, join_all};

use super::*;
use crate::net::types::UserMetadata;
use crate::routing::{GuardDecision, RouteTable, decide};

const NOW: i64 = 1_700_000_000;

fn user(email: &str) -> User {
    User {
        id: format!("id-{email}"),
        email: Some(email.to_owned()),
        user_metadata: UserMetadata::default(),
        email_confirmed_at: Some("2024-01-01T00:00:00Z".to_owned()),
        created_at: None,
        last_sign_in_at: None,
    }
}

fn session(email: &str, token: &str, expires_at: i64) -> Session {
    Session {
        access_token: token.to_owned(),
        refresh_token: format!("refresh-{token}"),
        expires_at,
        user: user(email),
    }
}

// =============================================================
// Fake backend
// =============================================================

#[derive(Default)]
struct FakeState {
    accounts: Vec<(String, String)>,
    confirm_signups: bool,
    offline: bool,
    refresh: Option<Result<Session, AuthError>>,
    recover_error: Option<AuthError>,
    update_error: Option<AuthError>,
    /// When set, refresh tokens are single-use: only this one is accepted,
    /// and each refresh yields once before answering.
    valid_refresh: Option<String>,
    issued: usize,
    calls: Vec<String>,
}

/// Return `Pending` once so concurrently joined futures interleave.
async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(move |cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}

#[derive(Clone, Default)]
struct FakeBackend(Arc<Mutex<FakeState>>);

impl FakeBackend {
    fn with_account(email: &str, password: &str) -> Self {
        let fake = Self::default();
        fake.state().accounts.push((email.to_owned(), password.to_owned()));
        fake
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.0.lock().unwrap()
    }

    fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

impl AuthBackend for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut state = self.state();
        state.calls.push(format!("sign_in:{email}"));
        if state.offline {
            return Err(AuthError::Network("offline".to_owned()));
        }
        if state.accounts.iter().any(|(e, p)| e == email && p == password) {
            Ok(session(email, "access-1", NOW + 3600))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn sign_up(&self, email: &str, password: &str, _name: &str) -> Result<SignUpResponse, AuthError> {
        let mut state = self.state();
        state.calls.push(format!("sign_up:{email}"));
        if state.accounts.iter().any(|(e, _)| e == email) {
            return Err(AuthError::UserAlreadyExists);
        }
        state.accounts.push((email.to_owned(), password.to_owned()));
        if state.confirm_signups {
            Ok(SignUpResponse::ConfirmationRequired(user(email)))
        } else {
            Ok(SignUpResponse::Session(session(email, "access-new", NOW + 3600)))
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let rotating = {
            let mut state = self.state();
            state.calls.push(format!("refresh:{refresh_token}"));
            state.valid_refresh.is_some()
        };
        if !rotating {
            return self.state().refresh.clone().unwrap_or(Err(AuthError::SessionExpired));
        }

        yield_now().await;
        let mut state = self.state();
        if state.valid_refresh.as_deref() != Some(refresh_token) {
            return Err(AuthError::SessionExpired);
        }
        let fresh = session("a@b.com", &format!("fresh{}", state.issued), NOW + 7200);
        state.issued += 1;
        state.valid_refresh = Some(fresh.refresh_token.clone());
        Ok(fresh)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.state();
        state.calls.push(format!("sign_out:{access_token}"));
        if state.offline {
            return Err(AuthError::Network("offline".to_owned()));
        }
        Ok(())
    }

    async fn recover_password(&self, email: &str) -> Result<(), AuthError> {
        let mut state = self.state();
        state.calls.push(format!("recover:{email}"));
        match state.recover_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError> {
        let mut state = self.state();
        state.calls.push(format!("update:{access_token}"));
        if let Some(err) = state.update_error.clone() {
            return Err(err);
        }
        if let Some(password) = update.password.as_deref() {
            crate::util::validation::validate_password_policy("password", password)
                .map_err(|err| AuthError::WeakPassword(err.message))?;
        }
        let mut updated = user("a@b.com");
        if let Some(data) = update.data.clone() {
            updated.user_metadata = data;
        }
        Ok(updated)
    }
}

type TestStore = SessionStore<FakeBackend, MemoryPersistence>;

fn store_with(backend: FakeBackend, persistence: MemoryPersistence) -> TestStore {
    SessionStore::new(backend, persistence)
}

/// Store already resolved to `Authenticated` for `a@b.com`.
fn signed_in_store(expires_at: i64) -> (TestStore, FakeBackend, MemoryPersistence) {
    let backend = FakeBackend::default();
    let persistence = MemoryPersistence::with_session(session("a@b.com", "access-0", expires_at));
    let store = store_with(backend.clone(), persistence.clone());
    block_on(store.restore_at(NOW.min(expires_at - REFRESH_MARGIN_SECS - 1)));
    (store, backend, persistence)
}

fn record_states(store: &TestStore) -> Arc<Mutex<Vec<SessionState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state| sink.lock().unwrap().push(state.clone()));
    seen
}

// =============================================================
// Restoration
// =============================================================

#[test]
fn new_store_starts_unknown() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    assert_eq!(store.current(), SessionState::Unknown);
    assert!(!store.current().is_resolved());
}

#[test]
fn restore_without_persisted_session_is_unauthenticated() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    let seen = record_states(&store);
    let state = block_on(store.restore_at(NOW));
    assert_eq!(state, SessionState::Unauthenticated);
    assert_eq!(*seen.lock().unwrap(), vec![SessionState::Unauthenticated]);
}

#[test]
fn restore_fresh_session_skips_refresh() {
    let backend = FakeBackend::default();
    let persisted = session("a@b.com", "access-0", NOW + 3600);
    let store = store_with(backend.clone(), MemoryPersistence::with_session(persisted.clone()));
    let state = block_on(store.restore_at(NOW));
    assert_eq!(state, SessionState::Authenticated(persisted));
    assert!(backend.calls().is_empty());
}

#[test]
fn restore_expired_session_refreshes_and_persists() {
    let backend = FakeBackend::default();
    let fresh = session("a@b.com", "access-2", NOW + 3600);
    backend.state().refresh = Some(Ok(fresh.clone()));
    let persistence = MemoryPersistence::with_session(session("a@b.com", "access-0", NOW - 10));
    let store = store_with(backend.clone(), persistence.clone());

    let state = block_on(store.restore_at(NOW));
    assert_eq!(state, SessionState::Authenticated(fresh.clone()));
    assert_eq!(backend.calls(), vec!["refresh:refresh-access-0".to_owned()]);
    assert_eq!(persistence.load(), Some(fresh));
}

#[test]
fn restore_with_rejected_refresh_clears_persistence() {
    let persistence = MemoryPersistence::with_session(session("a@b.com", "access-0", NOW - 10));
    let store = store_with(FakeBackend::default(), persistence.clone());
    assert_eq!(block_on(store.restore_at(NOW)), SessionState::Unauthenticated);
    assert_eq!(persistence.load(), None);
}

#[test]
fn restore_resolves_only_once() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    let seen = record_states(&store);
    block_on(store.restore_at(NOW));
    block_on(store.restore_at(NOW));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

// =============================================================
// Sign-in / sign-up
// =============================================================

#[test]
fn sign_in_notifies_before_returning() {
    let store = store_with(FakeBackend::with_account("a@b.com", "Passw0rd"), MemoryPersistence::default());
    block_on(store.restore_at(NOW));

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    store.subscribe(move |state| {
        if state.is_authenticated() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let user = block_on(store.sign_in(" a@b.com ", "Passw0rd")).unwrap();
    assert_eq!(user.email.as_deref(), Some("a@b.com"));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert!(store.current().is_authenticated());
}

#[test]
fn sign_in_on_login_page_leads_to_dashboard_redirect() {
    let store = store_with(FakeBackend::with_account("a@b.com", "Passw0rd"), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    let table = RouteTable::crm();
    assert!(matches!(decide(&table, "/login", &store.current()), GuardDecision::Render(_)));

    block_on(store.sign_in("a@b.com", "Passw0rd")).unwrap();
    assert_eq!(decide(&table, "/login", &store.current()), GuardDecision::RedirectToDashboard);
}

#[test]
fn sign_in_failure_leaves_state_untouched() {
    let persistence = MemoryPersistence::default();
    let store = store_with(FakeBackend::with_account("a@b.com", "Passw0rd"), persistence.clone());
    block_on(store.restore_at(NOW));
    let seen = record_states(&store);

    let err = block_on(store.sign_in("a@b.com", "wrong")).unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(store.current(), SessionState::Unauthenticated);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(persistence.load(), None);
}

#[test]
fn sign_in_network_failure_is_not_retried() {
    let backend = FakeBackend::with_account("a@b.com", "Passw0rd");
    backend.state().offline = true;
    let store = store_with(backend.clone(), MemoryPersistence::default());
    block_on(store.restore_at(NOW));

    let err = block_on(store.sign_in("a@b.com", "Passw0rd")).unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
    assert_eq!(backend.calls().len(), 1);
}

#[test]
fn sign_up_with_confirmation_keeps_unauthenticated() {
    let backend = FakeBackend::default();
    backend.state().confirm_signups = true;
    let store = store_with(backend, MemoryPersistence::default());
    block_on(store.restore_at(NOW));

    let outcome = block_on(store.sign_up("new@b.com", "Passw0rd", "New")).unwrap();
    assert_eq!(outcome, SignUpOutcome::ConfirmationRequired { email: "new@b.com".to_owned() });
    assert_eq!(store.current(), SessionState::Unauthenticated);
}

#[test]
fn sign_up_with_immediate_session_signs_in() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    assert_eq!(block_on(store.sign_up("new@b.com", "Passw0rd", "New")), Ok(SignUpOutcome::SignedIn));
    assert!(store.current().is_authenticated());
}

#[test]
fn sign_up_duplicate_email_fails() {
    let store = store_with(FakeBackend::with_account("a@b.com", "x"), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    assert_eq!(
        block_on(store.sign_up("a@b.com", "Passw0rd", "A")),
        Err(AuthError::UserAlreadyExists)
    );
}

// =============================================================
// Sign-out
// =============================================================

#[test]
fn sign_out_clears_even_when_revoke_fails() {
    let (store, backend, persistence) = signed_in_store(NOW + 3600);
    backend.state().offline = true;
    let seen = record_states(&store);

    block_on(store.sign_out());
    assert_eq!(store.current(), SessionState::Unauthenticated);
    assert_eq!(persistence.load(), None);
    assert_eq!(*seen.lock().unwrap(), vec![SessionState::Unauthenticated]);
    assert!(backend.calls().contains(&"sign_out:access-0".to_owned()));
}

#[test]
fn sign_out_without_session_skips_revoke() {
    let backend = FakeBackend::default();
    let store = store_with(backend.clone(), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    block_on(store.sign_out());
    assert_eq!(store.current(), SessionState::Unauthenticated);
    assert!(backend.calls().is_empty());
}

// =============================================================
// Password reset / update
// =============================================================

#[test]
fn password_reset_hides_provider_rejection() {
    let backend = FakeBackend::default();
    backend.state().recover_error = Some(AuthError::Provider { status: 400, message: "User not found".to_owned() });
    let store = store_with(backend, MemoryPersistence::default());
    assert_eq!(block_on(store.request_password_reset("nobody@b.com")), Ok(()));
}

#[test]
fn password_reset_reports_transport_failure() {
    let backend = FakeBackend::default();
    backend.state().recover_error = Some(AuthError::Network("offline".to_owned()));
    let store = store_with(backend, MemoryPersistence::default());
    assert!(matches!(block_on(store.request_password_reset("a@b.com")), Err(AuthError::Network(_))));
}

#[test]
fn update_password_requires_session() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    assert_eq!(block_on(store.update_password("Passw0rd")), Err(AuthError::NotAuthenticated));
}

#[test]
fn update_password_policy_failure_keeps_session() {
    let (store, _backend, _persistence) = signed_in_store(NOW + 3600);
    let before = store.current();
    let seen = record_states(&store);

    let err = block_on(store.update_password("short")).unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(_)));
    assert_eq!(store.current(), before);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn update_password_success_notifies() {
    let (store, backend, _persistence) = signed_in_store(NOW + 3600);
    let seen = record_states(&store);
    assert_eq!(block_on(store.update_password("Passw0rd")), Ok(()));
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(backend.calls().contains(&"update:access-0".to_owned()));
}

#[test]
fn update_profile_replaces_user_and_persists() {
    let (store, _backend, persistence) = signed_in_store(NOW + 3600);
    let user = block_on(store.update_profile("  Ada Lovelace ")).unwrap();
    assert_eq!(user.user_metadata.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(store.user().unwrap().display_name(), "Ada Lovelace");
    assert_eq!(persistence.load().unwrap().user.user_metadata.name.as_deref(), Some("Ada Lovelace"));
}

#[test]
fn update_with_rejected_token_expires_session() {
    let (store, backend, _persistence) = signed_in_store(NOW + 3600);
    backend.state().update_error = Some(AuthError::SessionExpired);
    assert_eq!(block_on(store.update_password("Passw0rd")), Err(AuthError::SessionExpired));
    assert_eq!(store.current(), SessionState::Unauthenticated);
}

#[test]
fn password_recovery_does_not_establish_session() {
    let backend = FakeBackend::default();
    let store = store_with(backend.clone(), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    assert_eq!(block_on(store.complete_password_recovery("recovery-tok", "Passw0rd")), Ok(()));
    assert_eq!(store.current(), SessionState::Unauthenticated);
    assert_eq!(
        backend.calls(),
        vec!["update:recovery-tok".to_owned(), "sign_out:recovery-tok".to_owned()]
    );
}

// =============================================================
// Tokens for data calls
// =============================================================

#[test]
fn access_token_is_returned_while_fresh() {
    let (store, backend, _persistence) = signed_in_store(NOW + 3600);
    assert_eq!(block_on(store.access_token_at(NOW)), Ok("access-0".to_owned()));
    assert!(backend.calls().is_empty());
}

#[test]
fn access_token_refreshes_near_expiry() {
    let (store, backend, _persistence) = signed_in_store(NOW + 3600);
    backend.state().refresh = Some(Ok(session("a@b.com", "access-9", NOW + 7200)));
    assert_eq!(block_on(store.access_token_at(NOW + 3590)), Ok("access-9".to_owned()));
    assert!(store.current().is_authenticated());
}

#[test]
fn access_token_rejected_refresh_expires_session() {
    let (store, _backend, _persistence) = signed_in_store(NOW + 3600);
    assert_eq!(block_on(store.access_token_at(NOW + 3590)), Err(AuthError::SessionExpired));
    assert_eq!(store.current(), SessionState::Unauthenticated);
}

#[test]
fn authorized_unauthorized_response_redirects_to_login() {
    let (store, _backend, _persistence) = signed_in_store(i64::MAX / 2);
    let result: Result<(), ApiError> = block_on(store.authorized(|_token| async { Err(ApiError::Unauthorized) }));
    assert_eq!(result, Err(ApiError::Unauthorized));
    assert_eq!(store.current(), SessionState::Unauthenticated);
    assert_eq!(
        decide(&RouteTable::crm(), "/contacts", &store.current()),
        GuardDecision::RedirectToLogin
    );
}

#[test]
fn concurrent_refreshes_share_one_rotation() {
    let (store, backend, persistence) = signed_in_store(NOW + 3600);
    backend.state().valid_refresh = Some("refresh-access-0".to_owned());

    let results = block_on(join_all((0..4).map(|_| store.access_token_at(NOW + 3590))));
    assert_eq!(results, vec![Ok("fresh0".to_owned()); 4]);
    assert!(store.current().is_authenticated());
    assert_eq!(backend.calls(), vec!["refresh:refresh-access-0".to_owned()]);
    assert_eq!(persistence.load().map(|s| s.access_token).as_deref(), Some("fresh0"));
}

#[test]
fn rejected_refresh_for_replaced_session_keeps_new_session() {
    let (store, backend, _persistence) = signed_in_store(NOW + 3600);
    {
        let mut state = backend.state();
        state.valid_refresh = Some("refresh-elsewhere".to_owned());
        state.accounts.push(("a@b.com".to_owned(), "Passw0rd".to_owned()));
    }

    let refresh = store.access_token_at(NOW + 3590);
    let relogin = async {
        store.sign_out().await;
        store.sign_in("a@b.com", "Passw0rd").await
    };
    let (token, signed_in) = block_on(join(refresh, relogin));

    assert_eq!(token, Err(AuthError::SessionExpired));
    assert!(signed_in.is_ok());
    assert!(matches!(store.current(), SessionState::Authenticated(ref s) if s.access_token == "access-1"));
}

#[test]
fn late_unauthorized_for_old_token_keeps_new_session() {
    let (store, backend, _persistence) = signed_in_store(i64::MAX / 2);
    backend.state().accounts.push(("a@b.com".to_owned(), "Passw0rd".to_owned()));

    let stale = store.authorized(|token| async move {
        assert_eq!(token, "access-0");
        yield_now().await;
        Err::<(), _>(ApiError::Unauthorized)
    });
    let relogin = async {
        store.sign_out().await;
        store.sign_in("a@b.com", "Passw0rd").await
    };
    let (result, signed_in) = block_on(join(stale, relogin));

    assert_eq!(result, Err(ApiError::Unauthorized));
    assert!(signed_in.is_ok());
    assert!(matches!(store.current(), SessionState::Authenticated(ref s) if s.access_token == "access-1"));
}

#[test]
fn expire_session_ignores_other_tokens() {
    let (store, _backend, _persistence) = signed_in_store(NOW + 3600);
    store.expire_session("access-old");
    assert!(store.current().is_authenticated());
    store.expire_session("access-0");
    assert_eq!(store.current(), SessionState::Unauthenticated);
}

#[test]
fn authorized_passes_token_to_call() {
    let (store, _backend, _persistence) = signed_in_store(i64::MAX / 2);
    let result = block_on(store.authorized(|token| async move { Ok::<_, ApiError>(token) }));
    assert_eq!(result, Ok("access-0".to_owned()));
}

#[test]
fn authorized_without_session_is_unauthorized() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    let result: Result<(), ApiError> = block_on(store.authorized(|_token| async { Ok(()) }));
    assert_eq!(result, Err(ApiError::Unauthorized));
}

// =============================================================
// Subscriptions
// =============================================================

#[test]
fn unsubscribe_stops_notifications() {
    let store = store_with(FakeBackend::default(), MemoryPersistence::default());
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let id = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    store.unsubscribe(id);
    block_on(store.restore_at(NOW));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn observer_reads_new_state_from_store() {
    let store = store_with(FakeBackend::with_account("a@b.com", "Passw0rd"), MemoryPersistence::default());
    block_on(store.restore_at(NOW));
    let observed = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&observed);
    let reader = store.clone();
    store.subscribe(move |_| *slot.lock().unwrap() = Some(reader.current()));

    block_on(store.sign_in("a@b.com", "Passw0rd")).unwrap();
    assert!(observed.lock().unwrap().as_ref().is_some_and(SessionState::is_authenticated));
}

//! Session state: bearer token and signed-in user's profile.
//!
//! The in-memory session is a mirror of the persistent store's `token` and
//! `userInfo` entries; every mutation writes through before returning.
//! `is_logged_in` and `is_admin` are derived on read and never stored.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use teamall_core::{Envelope, UserProfile};

use crate::error::ClientError;
use crate::policy::TokenSource;
use crate::router::SessionView;
use crate::storage::{PersistentStore, StorageError, keys};

/// Whether `token` can be sent as a credential.
///
/// Rejects the empty string and the strings `"undefined"` and `"null"`, which
/// end up in storage when an absent value gets stringified.
#[must_use]
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token != "undefined" && token != "null"
}

/// Source of the signed-in user's profile (`GET /users/info`).
pub trait UserInfoSource {
    fn fetch_user_info(
        &self,
    ) -> impl Future<Output = Result<Envelope<UserProfile>, ClientError>> + Send;
}

#[derive(Default)]
struct Session {
    token: Option<SecretString>,
    user: UserProfile,
}

/// Token and profile of the current user.
pub struct SessionState {
    store: Arc<dyn PersistentStore>,
    inner: RwLock<Session>,
}

impl SessionState {
    /// Hydrate the session from `store`.
    ///
    /// - Missing or invalid stored token: both `token` and `userInfo` are
    ///   removed from the store and the session starts empty.
    /// - Valid token, `userInfo` that fails to parse: only `userInfo` is
    ///   removed; the token is kept and the profile starts empty.
    #[must_use]
    pub fn initialize(store: Arc<dyn PersistentStore>) -> Self {
        let mut session = Session::default();

        match store.get(keys::TOKEN).filter(|t| is_valid_token(t)) {
            Some(token) => {
                session.token = Some(SecretString::from(token));
                session.user = load_user_info(store.as_ref());
            }
            None => {
                discard(store.as_ref(), keys::TOKEN);
                discard(store.as_ref(), keys::USER_INFO);
            }
        }

        tracing::debug!(logged_in = session.token.is_some(), "Session hydrated");

        Self {
            store,
            inner: RwLock::new(session),
        }
    }

    /// Current token, if the user is logged in.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read().token.clone()
    }

    /// Current profile; empty when signed out.
    #[must_use]
    pub fn user_info(&self) -> UserProfile {
        self.read().user.clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read()
            .token
            .as_ref()
            .is_some_and(|t| is_valid_token(t.expose_secret()))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read().user.is_admin()
    }

    /// Replace the token. `None` or an invalid token clears it.
    pub fn set_token(&self, token: Option<&str>) {
        let mut session = self.write();
        match token.filter(|t| is_valid_token(t)) {
            Some(token) => {
                session.token = Some(SecretString::from(token.to_owned()));
                persist(self.store.set(keys::TOKEN, token), keys::TOKEN);
                tracing::debug!("Token stored");
            }
            None => {
                session.token = None;
                discard(self.store.as_ref(), keys::TOKEN);
                tracing::debug!("Token cleared");
            }
        }
    }

    /// Replace the profile. `None` clears it.
    pub fn set_user_info(&self, user: Option<UserProfile>) {
        let mut session = self.write();
        match user {
            Some(user) => {
                match serde_json::to_string(&user) {
                    Ok(json) => persist(self.store.set(keys::USER_INFO, &json), keys::USER_INFO),
                    Err(e) => persist(Err(e.into()), keys::USER_INFO),
                }
                session.user = user;
                tracing::debug!("User info stored");
            }
            None => {
                session.user = UserProfile::default();
                discard(self.store.as_ref(), keys::USER_INFO);
            }
        }
    }

    /// Re-fetch the profile from the backend.
    ///
    /// Returns `None` when signed out (the profile is cleared) or when the
    /// fetch fails for any reason. A 401 additionally logs the session out.
    pub async fn refresh_user_info<S>(&self, source: &S) -> Option<UserProfile>
    where
        S: UserInfoSource + Sync,
    {
        if !self.is_logged_in() {
            self.set_user_info(None);
            return None;
        }

        match source.fetch_user_info().await {
            Ok(envelope) if envelope.is_success() => {
                let user = envelope.data?;
                self.set_user_info(Some(user.clone()));
                Some(user)
            }
            Ok(envelope) => {
                tracing::warn!(code = envelope.code, "User info refresh refused");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh user info");
                if e.is_unauthorized() {
                    self.logout();
                }
                None
            }
        }
    }

    /// Clear token and profile from memory and the store. Idempotent.
    pub fn logout(&self) {
        {
            let mut session = self.write();
            *session = Session::default();
        }
        discard(self.store.as_ref(), keys::TOKEN);
        discard(self.store.as_ref(), keys::USER_INFO);
        tracing::info!("Logged out, token and user info cleared");
    }

    /// Whether a stored session is still accepted by the backend.
    pub async fn check_login_state<S>(&self, source: &S) -> bool
    where
        S: UserInfoSource + Sync,
    {
        if !self.is_logged_in() {
            tracing::debug!("No valid token found");
            return false;
        }
        let valid = self.refresh_user_info(source).await.is_some();
        tracing::debug!(valid, "Login state checked");
        valid
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenSource for SessionState {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token()
    }

    fn rotate_token(&self, token: &str) {
        self.set_token(Some(token));
    }
}

impl SessionView for SessionState {
    fn is_logged_in(&self) -> bool {
        Self::is_logged_in(self)
    }

    fn is_admin(&self) -> bool {
        Self::is_admin(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn load_user_info(store: &dyn PersistentStore) -> UserProfile {
    let Some(raw) = store
        .get(keys::USER_INFO)
        .filter(|raw| raw != "undefined" && raw != "null")
    else {
        return UserProfile::default();
    };

    match serde_json::from_str(&raw) {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse stored user info");
            discard(store, keys::USER_INFO);
            UserProfile::default()
        }
    }
}

fn discard(store: &dyn PersistentStore, key: &str) {
    persist(store.remove(key), key);
}

fn persist(result: Result<(), StorageError>, key: &str) {
    if let Err(e) = result {
        tracing::error!(key, error = %e, "Failed to persist session state");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use teamall_core::{UserId, UserRole};

    use super::*;
    use crate::storage::MemoryStore;

    struct StubSource(Result<Envelope<UserProfile>, fn() -> ClientError>);

    impl UserInfoSource for StubSource {
        async fn fetch_user_info(&self) -> Result<Envelope<UserProfile>, ClientError> {
            match &self.0 {
                Ok(envelope) => Ok(envelope.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn profile(id: i64, role: UserRole) -> UserProfile {
        UserProfile {
            id: Some(UserId::new(id)),
            username: Some("oolong".to_string()),
            role: Some(role),
            ..UserProfile::default()
        }
    }

    fn ok_source(user: UserProfile) -> StubSource {
        StubSource(Ok(Envelope {
            code: 200,
            message: None,
            data: Some(user),
        }))
    }

    fn session_with(entries: &[(&str, &str)]) -> (Arc<MemoryStore>, SessionState) {
        let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        let session = SessionState::initialize(store.clone());
        (store, session)
    }

    #[test]
    fn test_initialize_token_without_user_info() {
        let (_, session) = session_with(&[(keys::TOKEN, "abc")]);
        assert!(session.is_logged_in());
        assert!(session.user_info().is_empty());
    }

    #[test]
    fn test_initialize_discards_stringified_null_token() {
        for bad in ["undefined", "null", ""] {
            let (store, session) = session_with(&[(keys::TOKEN, bad), (keys::USER_INFO, "{}")]);
            assert!(!session.is_logged_in());
            assert_eq!(store.get(keys::TOKEN), None);
            assert_eq!(store.get(keys::USER_INFO), None);
        }
    }

    #[test]
    fn test_initialize_discards_only_corrupt_user_info() {
        let (store, session) = session_with(&[(keys::TOKEN, "abc"), (keys::USER_INFO, "{oops")]);
        assert!(session.is_logged_in());
        assert!(session.user_info().is_empty());
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("abc"));
        assert_eq!(store.get(keys::USER_INFO), None);
    }

    #[test]
    fn test_initialize_loads_profile() {
        let stored = json!({"id": 3, "role": "ROLE_ADMIN"}).to_string();
        let (_, session) = session_with(&[(keys::TOKEN, "abc"), (keys::USER_INFO, &stored)]);
        assert!(session.is_admin());
        assert_eq!(session.user_info().id, Some(UserId::new(3)));
    }

    #[test]
    fn test_set_token_rejects_placeholders() {
        for bad in [Some("null"), Some("undefined"), Some(""), None] {
            let (store, session) = session_with(&[(keys::TOKEN, "abc")]);
            session.set_token(bad);
            assert!(!session.is_logged_in());
            assert!(session.token().is_none());
            assert_eq!(store.get(keys::TOKEN), None);
        }
    }

    #[test]
    fn test_set_token_persists() {
        let (store, session) = session_with(&[]);
        session.set_token(Some("jwt-1"));
        assert!(session.is_logged_in());
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("jwt-1"));
        assert_eq!(session.token().unwrap().expose_secret(), "jwt-1");
    }

    #[test]
    fn test_set_user_info_round_trips_through_store() {
        let (store, session) = session_with(&[(keys::TOKEN, "abc")]);
        let user = profile(5, UserRole::User);
        session.set_user_info(Some(user.clone()));

        let stored: UserProfile =
            serde_json::from_str(&store.get(keys::USER_INFO).unwrap()).unwrap();
        assert_eq!(stored, user);

        session.set_user_info(None);
        assert!(session.user_info().is_empty());
        assert_eq!(store.get(keys::USER_INFO), None);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (store, session) = session_with(&[(keys::TOKEN, "abc"), (keys::USER_INFO, "{}")]);
        session.logout();
        session.logout();
        assert!(!session.is_logged_in());
        assert_eq!(store.get(keys::TOKEN), None);
        assert_eq!(store.get(keys::USER_INFO), None);
    }

    #[tokio::test]
    async fn test_refresh_user_info_when_signed_out() {
        let (_, session) = session_with(&[]);
        let source = ok_source(profile(1, UserRole::User));
        assert!(session.refresh_user_info(&source).await.is_none());
        assert!(!session.check_login_state(&source).await);
    }

    #[tokio::test]
    async fn test_refresh_user_info_stores_payload() {
        let (store, session) = session_with(&[(keys::TOKEN, "abc")]);
        let user = profile(7, UserRole::Admin);

        let refreshed = session.refresh_user_info(&ok_source(user.clone())).await;
        assert_eq!(refreshed, Some(user));
        assert!(session.is_admin());
        assert!(store.get(keys::USER_INFO).is_some());
    }

    #[tokio::test]
    async fn test_refresh_without_payload_is_empty() {
        let (_, session) = session_with(&[(keys::TOKEN, "abc")]);
        let source = StubSource(Ok(Envelope {
            code: 200,
            message: None,
            data: None,
        }));
        assert!(session.refresh_user_info(&source).await.is_none());
        assert!(!session.check_login_state(&source).await);
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_unauthorized_logs_out() {
        let (store, session) = session_with(&[(keys::TOKEN, "abc")]);
        let source = StubSource(Err(|| ClientError::Unauthorized));

        assert!(!session.check_login_state(&source).await);
        assert!(!session.is_logged_in());
        assert_eq!(store.get(keys::TOKEN), None);
    }

    #[tokio::test]
    async fn test_refresh_other_failure_keeps_session() {
        let (_, session) = session_with(&[(keys::TOKEN, "abc")]);
        let source = StubSource(Err(|| ClientError::Network("refused".to_string())));

        assert!(session.refresh_user_info(&source).await.is_none());
        assert!(session.is_logged_in());
    }
}

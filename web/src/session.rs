//! Cookie-backed sessions for the authorization flow.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use oidc_auth::{
    error::{session_error, Error, SessionErrorKind},
    oauth::AuthenticatedIdentity,
    session::SessionStore,
};
use serde::{de::DeserializeOwned, Serialize};
use service::config::Config;
use time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::{
    cookie::SameSite, session::Id, Expiry, Session, SessionManagerLayer,
    SessionStore as SessionBackend,
};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "oauth-session";

/// Session key holding the signed-in user's identity.
pub const IDENTITY_SESSION_KEY: &str = "user";

/// Build the session layer for the router.
///
/// `SameSite=Lax` is required: the callback arrives as a cross-site
/// top-level navigation from Keycloak and must carry the cookie.
pub fn session_layer<B: SessionBackend + Clone>(config: &Config, backend: B) -> SessionManagerLayer<B> {
    SessionManagerLayer::new(backend)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.session_expiry_seconds as i64,
        )))
}

/// Adapter exposing a `tower_sessions::Session` to the authorization flow.
#[derive(Clone, Debug)]
pub struct FlowSession(Session);

impl FlowSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// The identity stored by a completed sign-in, if any.
    pub async fn identity(&self) -> Result<Option<AuthenticatedIdentity>, Error> {
        self.get(IDENTITY_SESSION_KEY).await
    }
}

#[async_trait]
impl SessionStore for FlowSession {
    async fn get<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        self.0
            .get(key)
            .await
            .map_err(|e| session_error(SessionErrorKind::Load, e))
    }

    async fn insert<T>(&self, key: &str, value: T) -> Result<(), Error>
    where
        T: Serialize + Send,
    {
        self.0
            .insert(key, value)
            .await
            .map_err(|e| session_error(SessionErrorKind::Store, e))
    }

    async fn remove<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        self.0
            .remove(key)
            .await
            .map_err(|e| session_error(SessionErrorKind::Load, e))
    }
}

/// Per-session locks serialising callback handling.
///
/// A session record is loaded per request, so two duplicated callbacks could
/// each see the same pending verifier. Holding this lock from load to save
/// makes the take of the verifier atomic across requests for one session.
#[derive(Clone, Default)]
pub struct SessionLocks {
    locks: Arc<DashMap<Id, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Wait for exclusive access to the session `id`.
    pub async fn lock(&self, id: Id) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry for `id` once nobody holds or awaits it.
    pub fn release(&self, id: &Id) {
        self.locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

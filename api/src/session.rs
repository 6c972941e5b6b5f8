use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::RwLock;

pub const COOKIE_NAME: &str = "session_id";

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not encode session value {key:?}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode session value {key:?}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value storage scoped per session id. Sessions expire `ttl` after
/// their last write.
pub trait SessionStore: Clone + Send + Sync + 'static {
    fn ttl(&self) -> Duration;

    fn contains(&self, session_id: &str) -> impl Future<Output = bool> + Send;

    fn get(&self, session_id: &str, key: &str) -> impl Future<Output = Option<Value>> + Send;

    /// Creates the session on first write and replaces any previous value
    /// under `key`.
    fn set(&self, session_id: &str, key: &str, value: Value) -> impl Future<Output = ()> + Send;
}

struct Entry {
    expires_at: Instant,
    values: HashMap<String, Value>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    /// Number of entries held, expired ones included until the next write
    /// sweeps them.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl SessionStore for MemorySessionStore {
    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn contains(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .is_some_and(|entry| entry.is_live(Instant::now()))
    }

    async fn get(&self, session_id: &str, key: &str) -> Option<Value> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|entry| entry.is_live(Instant::now()))?
            .values
            .get(key)
            .cloned()
    }

    async fn set(&self, session_id: &str, key: &str, value: Value) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.is_live(now));

        let entry = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| Entry {
                expires_at: now,
                values: HashMap::new(),
            });
        entry.expires_at = now + self.ttl;
        entry.values.insert(key.to_owned(), value);
    }
}

/// The caller's session. Extracting it never fails: an unknown or missing
/// cookie yields a fresh id that only reaches the store on the first `set`.
pub struct Session<S = MemorySessionStore> {
    id: String,
    store: S,
}

impl<S: SessionStore> Session<S> {
    pub fn new(id: impl Into<String>, store: S) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        let Some(value) = self.store.get(&self.id, key).await else {
            return Ok(None);
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| SessionError::Decode {
                key: key.to_owned(),
                source,
            })
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value).map_err(|source| SessionError::Encode {
            key: key.to_owned(),
            source,
        })?;

        self.store.set(&self.id, key, value).await;

        Ok(())
    }

    pub fn cookie(&self, secure: bool) -> Cookie<'static> {
        let max_age = time::Duration::try_from(self.store.ttl()).unwrap_or(time::Duration::MAX);

        Cookie::build((COOKIE_NAME, self.id.clone()))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}

impl<S, T> FromRequestParts<T> for Session<S>
where
    S: SessionStore + FromRef<T>,
    T: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &T) -> Result<Self, Self::Rejection> {
        let store = S::from_ref(state);
        let presented = CookieJar::from_headers(&parts.headers)
            .get(COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned());

        let id = match presented {
            Some(id) if store.contains(&id).await => id,
            _ => generate_session_id(),
        };

        Ok(Self::new(id, store))
    }
}

pub fn generate_session_id() -> String {
    let mut bytes = vec![0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

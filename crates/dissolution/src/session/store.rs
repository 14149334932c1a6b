use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::model::{Session, SessionId};

/// Error enumeration for session storage failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage abstraction so handlers can be exercised without a shared cache.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionError>;
    async fn save(&self, session: &Session) -> Result<(), SessionError>;
    async fn delete(&self, id: &SessionId) -> Result<(), SessionError>;
}

/// Process-local store used when no `CACHE_SERVER` is configured.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    fn poisoned<T>(_: T) -> SessionError {
        SessionError::Unavailable("session lock poisoned".to_string())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let guard = self.sessions.read().map_err(Self::poisoned)?;
        Ok(guard.get(id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut guard = self.sessions.write().map_err(Self::poisoned)?;
        guard.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.sessions.write().map_err(Self::poisoned)?;
        guard.remove(id);
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_store::RedisSessionStore;

#[cfg(feature = "redis")]
mod redis_store {
    use super::*;
    use redis::aio::ConnectionManager;
    use redis::AsyncCommands;

    const SESSION_TTL_SECS: u64 = 60 * 60;
    const KEY_PREFIX: &str = "session:";

    /// Sessions kept in the Redis cache shared with the accounts service.
    #[derive(Clone)]
    pub struct RedisSessionStore {
        connection: ConnectionManager,
    }

    impl RedisSessionStore {
        /// Connect to `CACHE_SERVER`, which may be a bare `host:port` or a full `redis://` URL.
        pub async fn connect(cache_server: &str) -> Result<Self, SessionError> {
            let client = redis::Client::open(redis_url(cache_server)).map_err(unavailable)?;
            let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
            Ok(Self { connection })
        }

        fn key(id: &SessionId) -> String {
            format!("{KEY_PREFIX}{}", id.as_str())
        }
    }

    fn redis_url(cache_server: &str) -> String {
        if cache_server.contains("://") {
            cache_server.to_string()
        } else {
            format!("redis://{cache_server}")
        }
    }

    fn unavailable(err: redis::RedisError) -> SessionError {
        SessionError::Unavailable(err.to_string())
    }

    #[async_trait]
    impl SessionStore for RedisSessionStore {
        async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
            let mut connection = self.connection.clone();
            let raw: Option<String> = connection.get(Self::key(id)).await.map_err(unavailable)?;
            raw.map(|value| serde_json::from_str(&value).map_err(SessionError::from))
                .transpose()
        }

        async fn save(&self, session: &Session) -> Result<(), SessionError> {
            let mut connection = self.connection.clone();
            let value = serde_json::to_string(session)?;
            connection
                .set_ex::<_, _, ()>(Self::key(&session.id), value, SESSION_TTL_SECS)
                .await
                .map_err(unavailable)
        }

        async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
            let mut connection = self.connection.clone();
            connection
                .del::<_, ()>(Self::key(id))
                .await
                .map_err(unavailable)
        }
    }

}

//! Shared key/value cache for provider access tokens.
//!
//! The cache is injected into the credential manager so every request served
//! by the process (or by several processes, with Redis) reuses one token.
//! Entries have no TTL; they are replaced when a provider rejects the token.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Errors from token cache backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command.
    #[error("token cache backend error: {0}")]
    Backend(String),
}

/// Key/value store holding access tokens.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Token cache shared across handlers.
pub type SharedTokenCache = Arc<dyn TokenCache>;

/// Process-local token cache.
#[derive(Debug, Default)]
pub struct InMemoryTokenCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryTokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(feature = "redis-cache")]
pub use redis_cache::RedisTokenCache;

#[cfg(feature = "redis-cache")]
mod redis_cache {
    use async_trait::async_trait;
    use redis::AsyncCommands;
    use tokio::sync::Mutex;

    use super::{CacheError, TokenCache};

    /// Token cache stored in Redis, shared between processes.
    pub struct RedisTokenCache {
        connection: Mutex<redis::aio::ConnectionManager>,
    }

    impl RedisTokenCache {
        /// Connect to the Redis server at `url`.
        ///
        /// # Errors
        ///
        /// Returns [`CacheError`] if the URL is invalid or the server is unreachable.
        pub async fn connect(url: &str) -> Result<Self, CacheError> {
            let client = redis::Client::open(url).map_err(backend)?;
            let manager = redis::aio::ConnectionManager::new(client)
                .await
                .map_err(backend)?;
            Ok(Self {
                connection: Mutex::new(manager),
            })
        }
    }

    #[async_trait]
    impl TokenCache for RedisTokenCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let mut conn = self.connection.lock().await;
            conn.get(key).await.map_err(backend)
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
            let mut conn = self.connection.lock().await;
            conn.set::<_, _, ()>(key, value).await.map_err(backend)
        }
    }

    fn backend(err: redis::RedisError) -> CacheError {
        CacheError::Backend(err.to_string())
    }
}

//! Redis-backed key-value storage.
//!
//! TTLs map directly onto Redis key expiry (`SET ... EX`), so retention is
//! enforced server-side and shared across bot instances.

#[cfg(feature = "redis")]
mod implementation {
    use crate::storage::KeyValueBackend;
    use crate::{Error, Result};
    use redis::aio::ConnectionManager;
    use redis::{AsyncCommands, Client};
    use std::time::Duration;

    /// Redis key-value backend.
    ///
    /// Holds a `ConnectionManager`, which multiplexes one connection and
    /// reconnects on failure; clones are cheap handles onto it.
    #[derive(Clone)]
    pub struct RedisBackend {
        conn: ConnectionManager,
    }

    impl RedisBackend {
        /// Connects to Redis.
        ///
        /// # Errors
        ///
        /// Returns an error if the URL is invalid or the connection fails.
        pub async fn connect(connection_url: &str) -> Result<Self> {
            let client = Client::open(connection_url).map_err(|e| Error::OperationFailed {
                operation: "redis_connect".to_string(),
                cause: e.to_string(),
            })?;
            let conn =
                ConnectionManager::new(client)
                    .await
                    .map_err(|e| Error::OperationFailed {
                        operation: "redis_connect".to_string(),
                        cause: e.to_string(),
                    })?;
            Ok(Self { conn })
        }

        /// Connects with default settings.
        ///
        /// # Errors
        ///
        /// Returns an error if the connection fails.
        pub async fn with_defaults() -> Result<Self> {
            Self::connect("redis://localhost:6379").await
        }
    }

    fn storage_error(operation: &str, error: &redis::RedisError) -> Error {
        Error::OperationFailed {
            operation: operation.to_string(),
            cause: error.to_string(),
        }
    }

    impl KeyValueBackend for RedisBackend {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let mut conn = self.conn.clone();
            let value: Option<String> = conn
                .get(key)
                .await
                .map_err(|e| storage_error("redis_get", &e))?;
            Ok(value)
        }

        async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
            let mut conn = self.conn.clone();
            match ttl {
                Some(ttl) => {
                    let () = conn
                        .set_ex(key, value, ttl.as_secs())
                        .await
                        .map_err(|e| storage_error("redis_set", &e))?;
                }
                None => {
                    let () = conn
                        .set(key, value)
                        .await
                        .map_err(|e| storage_error("redis_set", &e))?;
                }
            }
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            let mut conn = self.conn.clone();
            let () = conn
                .del(key)
                .await
                .map_err(|e| storage_error("redis_del", &e))?;
            Ok(())
        }
    }
}

#[cfg(feature = "redis")]
pub use implementation::RedisBackend;

#[cfg(not(feature = "redis"))]
mod stub {
    use crate::storage::KeyValueBackend;
    use crate::{Error, Result};
    use std::time::Duration;

    /// Stub Redis backend when the feature is not enabled.
    #[derive(Clone)]
    pub struct RedisBackend;

    impl RedisBackend {
        /// Connects to Redis (stub).
        ///
        /// # Errors
        ///
        /// Always returns an error because the feature is not enabled.
        pub async fn connect(_connection_url: &str) -> Result<Self> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        /// Connects with default settings (stub).
        ///
        /// # Errors
        ///
        /// Always returns an error because the feature is not enabled.
        pub async fn with_defaults() -> Result<Self> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }
    }

    impl KeyValueBackend for RedisBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<()> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(Error::FeatureNotEnabled("redis".to_string()))
        }
    }
}

#[cfg(not(feature = "redis"))]
pub use stub::RedisBackend;

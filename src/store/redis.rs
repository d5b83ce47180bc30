//! Redis store implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisResult, Script};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::retry::RetryPolicy;
use super::KeyValueStore;
use crate::error::{CacheError, Result};

/// Increments KEYS[1] and starts its window on creation, atomically.
const WINDOW_INCREMENT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Configuration for a Redis store
#[derive(Clone)]
pub struct RedisConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Password for AUTH, if any
    pub password: Option<String>,
    /// Logical database index
    pub db: i64,
    /// Deadline for establishing the connection
    pub connect_timeout: Duration,
    /// Deadline for each command
    pub command_timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("db", &self.db)
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

impl RedisConfig {
    /// Selects the logical database
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Sets the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Connection URL, e.g. `redis://:secret@127.0.0.1:6379/1`
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Redis-backed key-value store
///
/// Connects lazily on first use through a `ConnectionManager`, bounds every
/// connect and command with a timeout, and retries transient failures.
pub struct RedisStore {
    client: Client,
    connection: RwLock<Option<ConnectionManager>>,
    window_script: Script,
    config: RedisConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    /// Creates a store handle. No connection is opened until first use.
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url().as_str())
            .map_err(|e| CacheError::Connection(format!("Invalid Redis settings: {}", e)))?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            window_script: Script::new(WINDOW_INCREMENT_SCRIPT),
            config,
        })
    }

    /// Returns the live connection, opening it if needed.
    ///
    /// A single connect attempt bounded by `connect_timeout`; retries are
    /// left to [`run`](Self::run) and its `RetryPolicy`.
    async fn connection(&self) -> Result<ConnectionManager> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_connection_timeout(self.config.connect_timeout)
            .set_response_timeout(self.config.command_timeout);

        let conn = timeout(
            self.config.connect_timeout,
            ConnectionManager::new_with_config(self.client.clone(), manager_config),
        )
        .await
        .map_err(|_| {
            CacheError::Timeout(format!(
                "connecting to {}:{} exceeded {:?}",
                self.config.host, self.config.port, self.config.connect_timeout
            ))
        })??;

        info!(
            "Connected to Redis at {}:{} (db {})",
            self.config.host, self.config.port, self.config.db
        );
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Runs `command` against the connection with timeout and retry.
    async fn run<T, F, Fut>(&self, op: &'static str, mut command: F) -> Result<T>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let err = match self.connection().await {
                Ok(conn) => match timeout(self.config.command_timeout, command(conn)).await {
                    Ok(Ok(value)) => return Ok(value),
                    Ok(Err(e)) => CacheError::from(e),
                    Err(_) => CacheError::Timeout(format!(
                        "{} exceeded {:?}",
                        op, self.config.command_timeout
                    )),
                },
                Err(e) => e,
            };

            if !err.is_transient() || !self.config.retry.should_retry(attempt) {
                return Err(err);
            }

            let delay = self.config.retry.delay_for(attempt);
            warn!(
                "Redis {} failed (attempt {}/{}): {}; retrying in {:?}",
                op, attempt, self.config.retry.max_attempts, err, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn connect(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.connection.write().await.take().is_some() {
            info!(
                "Disconnected from Redis at {}:{} (db {})",
                self.config.host, self.config.port, self.config.db
            );
        }
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        let reply: String = self
            .run("PING", |mut conn| async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;
        Ok(reply == "PONG")
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run("GET", |mut conn| async move {
            conn.get::<_, Option<String>>(key).await
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.run("SET", |mut conn| async move {
            conn.set::<_, _, ()>(key, value).await
        })
        .await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let ttl_secs = ttl_secs.max(1);
        self.run("SETEX", |mut conn| async move {
            conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let deleted: i64 = self
            .run("DEL", |mut conn| async move { conn.del::<_, i64>(key).await })
            .await?;
        Ok(deleted > 0)
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        self.run("INCR", |mut conn| async move {
            conn.incr::<_, _, i64>(key, 1).await
        })
        .await
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let ttl_secs = ttl_secs.max(1) as i64;
        self.run("EXPIRE", |mut conn| async move {
            conn.expire::<_, bool>(key, ttl_secs).await
        })
        .await
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let ttl_secs: i64 = self
            .run("TTL", |mut conn| async move { conn.ttl::<_, i64>(key).await })
            .await?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(ttl_secs as u64))
        }
    }

    async fn increment_window(&self, key: &str, window_secs: u64) -> Result<i64> {
        let window_secs = window_secs.max(1);
        let script = &self.window_script;
        let count: i64 = self
            .run("INCR_WINDOW", |mut conn| async move {
                script.key(key).arg(window_secs).invoke_async(&mut conn).await
            })
            .await?;

        if count == 1 {
            debug!("Started {}s window for '{}'", window_secs, key);
        }
        Ok(count)
    }
}

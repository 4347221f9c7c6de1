use crate::domain::Provider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const KEY_PREFIX: &str = "oauth:state:";

/// Single-use CSRF state tokens for the authorization-code flow
#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    /// Remember `state` as issued for `provider` until `ttl` elapses
    async fn save(&self, state: &str, provider: Provider, ttl: Duration) -> Result<()>;

    /// Remove and return the provider recorded for `state`.
    /// Returns `None` for unknown, expired or already consumed tokens.
    async fn take(&self, state: &str) -> Result<Option<Provider>>;
}

/// 64 hex characters from two random UUIDs
pub fn generate_state_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Redis-backed state store. Expiry is left to the key TTL.
#[derive(Clone)]
pub struct RedisStateStore {
    redis: ConnectionManager,
}

impl RedisStateStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(state: &str) -> String {
        format!("{}{}", KEY_PREFIX, state)
    }
}

#[async_trait]
impl OAuthStateStore for RedisStateStore {
    async fn save(&self, state: &str, provider: Provider, ttl: Duration) -> Result<()> {
        let mut conn = self.redis.clone();

        redis::cmd("SET")
            .arg(Self::key(state))
            .arg(provider.as_str())
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .context("Failed to store OAuth state in Redis")?;

        debug!(provider = %provider, ttl_secs = ttl.as_secs(), "OAuth state stored");
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<Provider>> {
        if state.is_empty() {
            return Ok(None);
        }

        let mut conn = self.redis.clone();
        let stored: Option<String> = redis::cmd("GETDEL")
            .arg(Self::key(state))
            .query_async(&mut conn)
            .await
            .context("Failed to consume OAuth state from Redis")?;

        match stored {
            Some(value) => match value.parse::<Provider>() {
                Ok(provider) => Ok(Some(provider)),
                Err(()) => {
                    warn!(value = %value, "Discarding OAuth state with unknown provider");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

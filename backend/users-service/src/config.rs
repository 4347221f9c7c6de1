/// Configuration management for users-service
///
/// Loads configuration from environment variables. `DATABASE_URL`,
/// `JWT_SECRET` and `REDIS_URL` are required.
use anyhow::{Context, Result};
use db_pool::{env_or, DbConfig};
use std::fmt;
use std::time::Duration;

pub const SERVICE_NAME: &str = "users-service";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub jwt: JwtConfig,
    pub grpc: GrpcConfig,
    pub redis: RedisConfig,
    pub oauth: OAuthConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    /// HTTP port for health checks
    pub http_port: u16,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of issued access tokens
    pub expiration_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Lifetime of an unused OAuth state token
    pub oauth_state_ttl_secs: u64,
}

#[derive(Clone, Default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

impl OAuthClientConfig {
    fn from_env(prefix: &str) -> Self {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}")).unwrap_or_default();
        Self {
            client_id: var("CLIENT_ID"),
            client_secret: var("CLIENT_SECRET"),
            redirect_url: var("REDIRECT_URL"),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub google: OAuthClientConfig,
    pub microsoft: OAuthClientConfig,
    /// Timeout applied to every outbound provider call
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8081),
        };

        let database =
            DbConfig::from_env(SERVICE_NAME).context("Failed to load database configuration")?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
            expiration_hours: env_or("JWT_EXPIRATION_HOURS", 24),
        };

        let grpc = GrpcConfig {
            port: env_or("GRPC_PORT", 50051),
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
            oauth_state_ttl_secs: env_or("OAUTH_STATE_TTL_SECS", 600),
        };

        let oauth = OAuthConfig {
            google: OAuthClientConfig::from_env("GOOGLE"),
            microsoft: OAuthClientConfig::from_env("MICROSOFT"),
            http_timeout: Duration::from_secs(env_or("OAUTH_HTTP_TIMEOUT_SECS", 10)),
        };

        Ok(Config {
            app,
            database,
            jwt,
            grpc,
            redis,
            oauth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("JWT_SECRET", "secret");
        std::env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
    }

    #[test]
    #[serial]
    fn test_default_values() {
        set_required();
        std::env::remove_var("PORT");
        std::env::remove_var("GRPC_PORT");
        std::env::remove_var("JWT_EXPIRATION_HOURS");
        std::env::remove_var("OAUTH_STATE_TTL_SECS");
        std::env::remove_var("OAUTH_HTTP_TIMEOUT_SECS");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.http_port, 8081);
        assert_eq!(config.grpc.port, 50051);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.redis.oauth_state_ttl_secs, 600);
        assert_eq!(config.oauth.http_timeout, Duration::from_secs(10));
        assert!(format!("{:?}", config.jwt).contains("REDACTED"));
    }

    #[test]
    #[serial]
    fn test_missing_redis_url() {
        set_required();
        std::env::remove_var("REDIS_URL");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("REDIS_URL"));
    }

    #[test]
    #[serial]
    fn test_oauth_client_secret_is_redacted() {
        set_required();
        std::env::set_var("GOOGLE_CLIENT_ID", "google-id");
        std::env::set_var("GOOGLE_CLIENT_SECRET", "google-secret");

        let config = Config::from_env().unwrap();
        let debug = format!("{:?}", config.oauth.google);

        assert!(config.oauth.google.is_configured());
        assert!(debug.contains("google-id"));
        assert!(!debug.contains("google-secret"));

        std::env::remove_var("GOOGLE_CLIENT_ID");
        std::env::remove_var("GOOGLE_CLIENT_SECRET");
    }
}

/// Configuration management for posts-service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use db_pool::{env_or, DbConfig};
use std::fmt;

pub const SERVICE_NAME: &str = "posts-service";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub jwt: JwtConfig,
    pub grpc: GrpcConfig,
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
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8082),
        };

        let database =
            DbConfig::from_env(SERVICE_NAME).context("Failed to load database configuration")?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        let grpc = GrpcConfig {
            port: env_or("GRPC_PORT", 50052),
        };

        Ok(Config {
            app,
            database,
            jwt,
            grpc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("JWT_SECRET", "secret");
        std::env::remove_var("PORT");
        std::env::remove_var("GRPC_PORT");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.http_port, 8082);
        assert_eq!(config.grpc.port, 50052);
        assert_eq!(config.database.service_name, SERVICE_NAME);
        assert!(format!("{:?}", config.jwt).contains("REDACTED"));
    }

    #[test]
    #[serial]
    fn test_missing_jwt_secret() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::remove_var("JWT_SECRET");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}

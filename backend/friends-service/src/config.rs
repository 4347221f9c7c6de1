/// Configuration management for friends-service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use db_pool::{env_or, DbConfig};
use std::fmt;

pub const SERVICE_NAME: &str = "friends-service";

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
            http_port: env_or("PORT", 8084),
        };

        let database =
            DbConfig::from_env(SERVICE_NAME).context("Failed to load database configuration")?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        let grpc = GrpcConfig {
            port: env_or("GRPC_PORT", 50054),
        };

        Ok(Config {
            app,
            database,
            jwt,
            grpc,
        })
    }
}

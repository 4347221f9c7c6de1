/// Configuration for the REST gateway
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use std::env;
use std::fmt;

pub const SERVICE_NAME: &str = "api-gateway";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub services: ServiceEndpoints,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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

/// gRPC endpoints of the backend services
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub users: String,
    pub posts: String,
    pub groups: String,
    pub friends: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            users: "http://127.0.0.1:50051".to_string(),
            posts: "http://127.0.0.1:50052".to_string(),
            groups: "http://127.0.0.1:50053".to_string(),
            friends: "http://127.0.0.1:50054".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        };

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?,
        };

        let defaults = ServiceEndpoints::default();
        let services = ServiceEndpoints {
            users: env::var("USERS_SERVICE_URL").unwrap_or(defaults.users),
            posts: env::var("POSTS_SERVICE_URL").unwrap_or(defaults.posts),
            groups: env::var("GROUPS_SERVICE_URL").unwrap_or(defaults.groups),
            friends: env::var("FRIENDS_SERVICE_URL").unwrap_or(defaults.friends),
        };

        Ok(Config {
            server,
            jwt,
            services,
        })
    }
}

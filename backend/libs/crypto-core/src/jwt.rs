/// Shared JWT module for the social backend
///
/// Tokens are signed with HS256 over a secret shared by the users service
/// (which issues them), the gateway and every backend service (which
/// validate them).
///
/// ## Claims
///
/// - `sub`: user id (UUID string)
/// - `iat`: issued at (Unix timestamp)
/// - `exp`: expiration (Unix timestamp), checked with zero leeway
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::JwtCodec;
/// use uuid::Uuid;
///
/// let codec = JwtCodec::new("change-me").unwrap();
/// let user_id = Uuid::new_v4();
/// let token = codec.issue_token(user_id).unwrap();
/// assert_eq!(codec.user_id_from_token(&token).unwrap(), user_id);
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates HS256 tokens for one shared secret
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCodec")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

impl JwtCodec {
    /// Build a codec from the shared secret.
    ///
    /// ## Errors
    ///
    /// Returns error if the secret is empty.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(anyhow!("JWT secret must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        })
    }

    /// Override the lifetime of issued tokens
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue an access token for `user_id`
    pub fn issue_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        self.encode_claims(&claims)
    }

    /// Sign arbitrary claims. Used by tests that need expired tokens.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate access token: {e}"))
    }

    /// Validate and decode a token (without the "Bearer " prefix)
    ///
    /// ## Errors
    ///
    /// Returns error if:
    /// - Token signature is invalid
    /// - Token is expired
    /// - Token format is malformed
    /// - Subject is empty
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))?;

        if data.claims.sub.is_empty() {
            return Err(anyhow!("Token validation failed: missing subject"));
        }

        Ok(data)
    }

    /// Extract the user ID from a validated token
    pub fn user_id_from_token(&self, token: &str) -> Result<Uuid> {
        let data = self.validate_token(token)?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

//! Identity of an authenticated caller

use crypto_core::Claims;
use uuid::Uuid;

/// Claims of a validated token, with the subject already parsed.
///
/// `JwtServerInterceptor` inserts this into request extensions; handlers
/// read it through `AccessPolicy` or `JwtClaimsExt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<&Claims> for JwtClaims {
    type Error = uuid::Error;

    /// Fails when `sub` is not a UUID
    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            iat: claims.iat,
            exp: claims.exp,
        })
    }
}

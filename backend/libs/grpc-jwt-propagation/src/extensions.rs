//! Request Extension Trait for JWT Claims Access
//!
//! Provides helpers for reading what `JwtServerInterceptor` stored on a request.

use crate::metadata::FriendIds;
use crate::server::CredentialRejection;
use crate::JwtClaims;
use tonic::{Request, Status};
use uuid::Uuid;

/// Extension trait for accessing JWT claims from gRPC requests
pub trait JwtClaimsExt {
    /// Extract JWT claims from request extensions
    ///
    /// ## Errors
    ///
    /// Returns `Status::unauthenticated` with the recorded rejection reason
    /// when a token was presented but refused, or "Missing authorization
    /// header" when no token was presented.
    fn jwt_claims(&self) -> Result<&JwtClaims, Status>;

    /// Claims if the caller presented a valid token; never fails
    fn optional_claims(&self) -> Option<&JwtClaims>;

    /// Friend ids forwarded by the gateway (empty when absent)
    fn friend_ids(&self) -> &[Uuid];
}

impl<T> JwtClaimsExt for Request<T> {
    fn jwt_claims(&self) -> Result<&JwtClaims, Status> {
        if let Some(claims) = self.extensions().get::<JwtClaims>() {
            return Ok(claims);
        }

        match self.extensions().get::<CredentialRejection>() {
            Some(rejection) => Err(Status::unauthenticated(rejection.0.clone())),
            None => Err(Status::unauthenticated("Missing authorization header")),
        }
    }

    fn optional_claims(&self) -> Option<&JwtClaims> {
        self.extensions().get::<JwtClaims>()
    }

    fn friend_ids(&self) -> &[Uuid] {
        self.extensions()
            .get::<FriendIds>()
            .map(FriendIds::as_slice)
            .unwrap_or(&[])
    }
}

//! Server-side JWT Interceptor
//!
//! Inspects the bearer token and friend ids of every incoming gRPC request,
//! storing the outcome in request extensions.

use crate::claims::JwtClaims;
use crate::metadata::{parse_friend_ids, FriendIds};
use crypto_core::JwtCodec;
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

/// Reason a presented credential was refused, kept in request extensions
///
/// The interceptor cannot see which method is being called, so it records the
/// rejection and lets `AccessPolicy` decide: public methods ignore it, every
/// other method turns it into `Status::unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRejection(pub String);

/// Server-side interceptor that validates JWT tokens and extracts claims
///
/// This interceptor:
/// 1. Reads the `authorization` header from gRPC metadata
/// 2. Validates the token with the shared-secret codec
/// 3. Stores `JwtClaims` (or a `CredentialRejection`) in request extensions
/// 4. Stores the caller's `FriendIds` parsed from `friend_ids` metadata
///
/// A request without an `authorization` header passes through as anonymous.
#[derive(Clone)]
pub struct JwtServerInterceptor {
    codec: Arc<JwtCodec>,
}

impl JwtServerInterceptor {
    pub fn new(codec: JwtCodec) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }

    /// Extract and validate the JWT token from request metadata
    ///
    /// Returns `Ok(None)` when no authorization header is present.
    ///
    /// ## Errors
    ///
    /// Returns `Status::unauthenticated` if:
    /// - Authorization header is not valid ASCII
    /// - Authorization header format is invalid (not "Bearer {token}")
    /// - Token signature is invalid or the token is expired
    /// - Token subject is not a user id
    fn extract_and_validate_jwt(&self, metadata: &MetadataMap) -> Result<Option<JwtClaims>, Status> {
        let Some(auth_header) = metadata.get("authorization") else {
            return Ok(None);
        };

        let auth_str = auth_header.to_str().map_err(|e| {
            warn!("Invalid authorization header encoding: {}", e);
            Status::unauthenticated("Invalid authorization header")
        })?;

        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Invalid authorization format (expected 'Bearer <token>')");
            Status::unauthenticated("Invalid authorization format")
        })?;

        debug!("Validating JWT token");

        let token_data = self.codec.validate_token(token).map_err(|e| {
            warn!("JWT validation failed: {}", e);
            Status::unauthenticated("Invalid or expired token")
        })?;

        let claims = JwtClaims::try_from(&token_data.claims).map_err(|e| {
            warn!("Failed to parse JWT claims: {}", e);
            Status::unauthenticated("Invalid token claims")
        })?;

        debug!(user_id = %claims.user_id, "JWT validated successfully");

        Ok(Some(claims))
    }
}

impl Interceptor for JwtServerInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let outcome = self.extract_and_validate_jwt(request.metadata());
        let friend_ids = parse_friend_ids(request.metadata());

        match outcome {
            Ok(Some(claims)) => {
                request.extensions_mut().insert(claims);
            }
            Ok(None) => {}
            Err(status) => {
                request
                    .extensions_mut()
                    .insert(CredentialRejection(status.message().to_string()));
            }
        }
        request.extensions_mut().insert(FriendIds(friend_ids));

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FRIEND_IDS_METADATA_KEY;
    use tonic::metadata::MetadataValue;
    use uuid::Uuid;

    const TEST_SECRET: &str = "interceptor-test-secret";

    fn interceptor() -> JwtServerInterceptor {
        JwtServerInterceptor::new(JwtCodec::new(TEST_SECRET).unwrap())
    }

    fn bearer(token: &str) -> MetadataValue<tonic::metadata::Ascii> {
        format!("Bearer {}", token).parse().unwrap()
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let result = interceptor().extract_and_validate_jwt(&MetadataMap::new());
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_invalid_format() {
        let mut metadata = MetadataMap::new();
        metadata.insert("authorization", MetadataValue::from_static("InvalidFormat"));

        let status = interceptor()
            .extract_and_validate_jwt(&metadata)
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(status.message().contains("Invalid authorization format"));
    }

    #[test]
    fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let token = JwtCodec::new(TEST_SECRET)
            .unwrap()
            .issue_token(user_id)
            .unwrap();

        let mut metadata = MetadataMap::new();
        metadata.insert("authorization", bearer(&token));

        let claims = interceptor()
            .extract_and_validate_jwt(&metadata)
            .unwrap()
            .expect("claims");
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let token = JwtCodec::new("someone-else")
            .unwrap()
            .issue_token(Uuid::new_v4())
            .unwrap();

        let mut metadata = MetadataMap::new();
        metadata.insert("authorization", bearer(&token));

        let status = interceptor()
            .extract_and_validate_jwt(&metadata)
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "Invalid or expired token");
    }

    #[test]
    fn test_interceptor_stores_claims_and_friend_ids() {
        let user_id = Uuid::new_v4();
        let friend = Uuid::new_v4();
        let token = JwtCodec::new(TEST_SECRET)
            .unwrap()
            .issue_token(user_id)
            .unwrap();

        let mut request = Request::new(());
        request.metadata_mut().insert("authorization", bearer(&token));
        request
            .metadata_mut()
            .insert(FRIEND_IDS_METADATA_KEY, friend.to_string().parse().unwrap());

        let request = interceptor().call(request).unwrap();

        let claims = request.extensions().get::<JwtClaims>().unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(
            request.extensions().get::<FriendIds>().unwrap().as_slice(),
            &[friend]
        );
        assert!(request.extensions().get::<CredentialRejection>().is_none());
    }

    #[test]
    fn test_interceptor_records_rejection() {
        let mut request = Request::new(());
        request.metadata_mut().insert("authorization", bearer("garbage"));

        let request = interceptor().call(request).unwrap();

        assert!(request.extensions().get::<JwtClaims>().is_none());
        let rejection = request.extensions().get::<CredentialRejection>().unwrap();
        assert_eq!(rejection.0, "Invalid or expired token");
    }
}

//! Client-side JWT Interceptor
//!
//! Forwards the caller's bearer token and friend ids on outgoing gRPC requests.

use crate::metadata::FRIEND_IDS_METADATA_KEY;
use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use uuid::Uuid;

/// Client-side interceptor used by the gateway
///
/// Holds a pre-formatted `authorization` value ("Bearer {token}") and an
/// optional comma-separated `friend_ids` value. An anonymous interceptor sends
/// neither header.
///
/// ```rust
/// use grpc_jwt_propagation::JwtClientInterceptor;
///
/// let interceptor = JwtClientInterceptor::new("eyJhbGciOiJIUzI1NiJ9.e30.sig").unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct JwtClientInterceptor {
    auth_header: Option<AsciiMetadataValue>,
    friend_ids: Option<AsciiMetadataValue>,
}

impl JwtClientInterceptor {
    /// Create an interceptor carrying `jwt_token` (without the "Bearer " prefix)
    ///
    /// ## Errors
    ///
    /// Returns `Status::unauthenticated` if the token is not valid header ASCII.
    pub fn new(jwt_token: impl AsRef<str>) -> Result<Self, Status> {
        let auth_header = format!("Bearer {}", jwt_token.as_ref())
            .parse::<AsciiMetadataValue>()
            .map_err(|_| Status::unauthenticated("Invalid authorization header"))?;

        Ok(Self::from_header(auth_header))
    }

    /// Interceptor for a caller without a token
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from an already-formatted authorization value
    pub fn from_header(auth_header: AsciiMetadataValue) -> Self {
        Self {
            auth_header: Some(auth_header),
            friend_ids: None,
        }
    }

    /// Attach the caller's friend ids; an empty list sends nothing
    pub fn with_friend_ids(mut self, friend_ids: &[Uuid]) -> Self {
        if friend_ids.is_empty() {
            self.friend_ids = None;
            return self;
        }

        let joined = friend_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");

        // UUID text is always valid ASCII
        self.friend_ids = joined.parse::<AsciiMetadataValue>().ok();
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth_header.is_none()
    }
}

impl Interceptor for JwtClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if let Some(auth_header) = &self.auth_header {
            request
                .metadata_mut()
                .insert("authorization", auth_header.clone());
        }
        if let Some(friend_ids) = &self.friend_ids {
            request
                .metadata_mut()
                .insert(FRIEND_IDS_METADATA_KEY, friend_ids.clone());
        }

        Ok(request)
    }
}

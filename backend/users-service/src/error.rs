/// Error types for users-service
use crate::oauth::OAuthError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    /// Bad service token, or a provider refused the presented credential
    #[error("{0}")]
    Unauthenticated(String),

    /// An identity provider could not be reached
    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Log a persistence failure and hide its detail from the caller
    pub fn storage(message: &str, err: anyhow::Error) -> Self {
        error!(error = %err, "{}", message);
        ServiceError::Internal(message.to_string())
    }
}

impl From<OAuthError> for ServiceError {
    fn from(err: OAuthError) -> Self {
        warn!(error = %err, "Identity provider call failed");
        match err {
            OAuthError::Network(_) => {
                ServiceError::Unavailable("identity provider unavailable".into())
            }
            OAuthError::Config(msg) => ServiceError::Internal(msg),
            OAuthError::Rejected { .. }
            | OAuthError::TokenExchange(_)
            | OAuthError::IncompleteProfile(_) => {
                ServiceError::Unauthenticated("failed to verify identity with provider".into())
            }
        }
    }
}

/// Convert ServiceError to tonic::Status for gRPC responses
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => tonic::Status::invalid_argument(msg),
            ServiceError::NotFound(msg) => tonic::Status::not_found(msg),
            ServiceError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ServiceError::Unauthenticated(msg) => tonic::Status::unauthenticated(msg),
            ServiceError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ServiceError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;

    #[test]
    fn test_provider_failures_map_to_status() {
        let status: tonic::Status = ServiceError::from(OAuthError::Rejected {
            provider: Provider::Google,
            status: 401,
        })
        .into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);

        let status: tonic::Status =
            ServiceError::from(OAuthError::Network("timed out".into())).into();
        assert_eq!(status.code(), tonic::Code::Unavailable);
        assert!(!status.message().contains("timed out"));
    }
}

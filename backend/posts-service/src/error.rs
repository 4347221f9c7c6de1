/// Error types for posts-service
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    AlreadyExists(String),

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

/// Convert ServiceError to tonic::Status for gRPC responses
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => tonic::Status::invalid_argument(msg),
            ServiceError::NotFound(msg) => tonic::Status::not_found(msg),
            ServiceError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ServiceError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ServiceError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

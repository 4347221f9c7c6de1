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

    /// The request is well formed but the group's state forbids it
    #[error("{0}")]
    FailedPrecondition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn storage(message: &str, err: anyhow::Error) -> Self {
        error!(error = %err, "{}", message);
        ServiceError::Internal(message.to_string())
    }
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => tonic::Status::invalid_argument(msg),
            ServiceError::NotFound(msg) => tonic::Status::not_found(msg),
            ServiceError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ServiceError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ServiceError::FailedPrecondition(msg) => tonic::Status::failed_precondition(msg),
            ServiceError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_precondition_mapping() {
        let status: tonic::Status =
            ServiceError::FailedPrecondition("creator cannot leave the group".into()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert_eq!(status.message(), "creator cannot leave the group");
    }
}

/// Error type for gateway handlers
///
/// Backend `tonic::Status` codes are translated to HTTP statuses and every
/// error body has the shape `{"error": message}`.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tonic::Code;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("authentication required".to_string())
    }
}

impl From<tonic::Status> for ApiError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::InvalidArgument | Code::FailedPrecondition => ApiError::BadRequest(message),
            Code::Unauthenticated => ApiError::Unauthorized(message),
            Code::PermissionDenied => ApiError::Forbidden(message),
            Code::NotFound => ApiError::NotFound(message),
            Code::AlreadyExists => ApiError::Conflict(message),
            Code::Unavailable => {
                error!(error = %message, "Backend service unavailable");
                ApiError::Unavailable("service unavailable".to_string())
            }
            code => {
                error!(code = ?code, error = %message, "Backend call failed");
                ApiError::Internal(message)
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Status;

    fn status_of(status: Status) -> StatusCode {
        ApiError::from(status).status_code()
    }

    #[test]
    fn test_grpc_status_mapping() {
        assert_eq!(status_of(Status::invalid_argument("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Status::failed_precondition("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Status::unauthenticated("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Status::permission_denied("x")), StatusCode::FORBIDDEN);
        assert_eq!(status_of(Status::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Status::already_exists("x")), StatusCode::CONFLICT);
        assert_eq!(status_of(Status::unavailable("x")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(Status::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(Status::deadline_exceeded("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_is_kept() {
        let err = ApiError::from(Status::not_found("post not found"));
        assert_eq!(err.to_string(), "post not found");
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = ApiError::Forbidden("not the author".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "not the author" }));
    }
}

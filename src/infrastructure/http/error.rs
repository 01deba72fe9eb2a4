//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ports::SynthesisError;
use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const QUOTA_EXCEEDED: i32 = 402;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const RATE_LIMITED: i32 = 429;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    RateLimited(String),
    QuotaExceeded(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg.clone())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg.clone())
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!(errno = errno::FORBIDDEN, error = %msg, "Forbidden");
                ErrorResponse::new(errno::FORBIDDEN, msg.clone())
            }
            ApiError::RateLimited(msg) => {
                tracing::warn!(errno = errno::RATE_LIMITED, error = %msg, "Provider rate limited");
                ErrorResponse::new(errno::RATE_LIMITED, msg.clone())
            }
            ApiError::QuotaExceeded(msg) => {
                tracing::error!(errno = errno::QUOTA_EXCEEDED, error = %msg, "Provider quota exceeded");
                ErrorResponse::new(errno::QUOTA_EXCEEDED, msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg.clone())
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource, key } => {
                ApiError::NotFound(format!("{} not found: {}", resource, key))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            // 合成错误保留子类型区分，可重试的分到 429/503
            ApplicationError::Synthesis(SynthesisError::RateLimited) => {
                ApiError::RateLimited("Provider rate limit hit, retry later".to_string())
            }
            ApplicationError::Synthesis(SynthesisError::QuotaExceeded) => {
                ApiError::QuotaExceeded("Provider quota exceeded".to_string())
            }
            ApplicationError::Synthesis(SynthesisError::InvalidVoice(voice_id)) => {
                ApiError::BadRequest(format!("Unknown voice: {}", voice_id))
            }
            ApplicationError::Synthesis(SynthesisError::ProviderUnavailable(msg)) => {
                ApiError::ServiceUnavailable(msg)
            }
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_errors_map_to_distinct_errno() {
        let rate: ApiError = ApplicationError::Synthesis(SynthesisError::RateLimited).into();
        assert!(matches!(rate, ApiError::RateLimited(_)));

        let quota: ApiError = ApplicationError::Synthesis(SynthesisError::QuotaExceeded).into();
        assert!(matches!(quota, ApiError::QuotaExceeded(_)));

        let voice: ApiError =
            ApplicationError::Synthesis(SynthesisError::InvalidVoice("v".into())).into();
        assert!(matches!(voice, ApiError::BadRequest(_)));

        let down: ApiError =
            ApplicationError::Synthesis(SynthesisError::ProviderUnavailable("x".into())).into();
        assert!(matches!(down, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_not_found_mapping() {
        let err: ApiError = ApplicationError::not_found("Cached audio", "abc").into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

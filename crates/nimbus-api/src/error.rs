//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping the core error taxonomy to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nimbus_ai::AiError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "upstream_timeout").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 422 Unprocessable Entity - the model produced unusable output.
    UnprocessableEntity(String),
    /// 429 Too Many Requests - upstream quota exhausted.
    TooManyRequests(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 502 Bad Gateway - upstream backend failed.
    BadGateway(String),
    /// 503 Service Unavailable - AI backend not configured.
    ServiceUnavailable(String),
    /// 504 Gateway Timeout - upstream backend timed out.
    GatewayTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "upstream_rate_limited", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "upstream_unavailable", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::GatewayTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AiError::UnparseableResponse(msg) => ApiError::UnprocessableEntity(msg),
            AiError::UpstreamRateLimited(msg) => ApiError::TooManyRequests(msg),
            AiError::UpstreamUnavailable(msg) => ApiError::BadGateway(msg),
            AiError::UpstreamTimeout(msg) => ApiError::GatewayTimeout(msg),
            AiError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(ApiError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::UnprocessableEntity("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ApiError::TooManyRequests("x".into())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(ApiError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ApiError::BadGateway("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::ServiceUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::GatewayTimeout("x".into())),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_ai_error_mapping() {
        assert!(matches!(
            ApiError::from(AiError::InvalidInput("x".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AiError::UnparseableResponse("x".into())),
            ApiError::UnprocessableEntity(_)
        ));
        assert!(matches!(
            ApiError::from(AiError::UpstreamRateLimited("x".into())),
            ApiError::TooManyRequests(_)
        ));
        assert!(matches!(
            ApiError::from(AiError::UpstreamUnavailable("x".into())),
            ApiError::BadGateway(_)
        ));
        assert!(matches!(
            ApiError::from(AiError::UpstreamTimeout("x".into())),
            ApiError::GatewayTimeout(_)
        ));
        assert!(matches!(
            ApiError::from(AiError::Internal("x".into())),
            ApiError::Internal(_)
        ));
    }
}

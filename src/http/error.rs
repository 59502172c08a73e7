//! API error types with `{error, detail}` JSON responses.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::http::pipeline::Rejection;
use crate::security::AuthFailure;
use crate::store::StoreError;

/// Error envelope returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid host header")]
    UntrustedHost,
    #[error("{0}")]
    Unauthorized(AuthFailure),
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UntrustedHost => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, detail) = match &self {
            ApiError::UntrustedHost => ("Bad Request", "Invalid host header".to_string()),
            ApiError::Unauthorized(failure) => ("Unauthorized", failure.to_string()),
            ApiError::RateLimited { retry_after } => (
                "Too Many Requests",
                format!("Rate limit exceeded. Try again in {retry_after} seconds."),
            ),
            ApiError::Validation(detail) => ("Unprocessable Entity", detail.clone()),
            ApiError::PayloadTooLarge => (
                "Payload Too Large",
                "Request body exceeds the configured limit".to_string(),
            ),
            ApiError::NotFound => (
                "Not Found",
                "The requested resource was not found".to_string(),
            ),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Document store operation failed");
                (
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let mut response = (status, Json(ErrorBody { error, detail })).into_response();
        match &self {
            ApiError::RateLimited { retry_after } => {
                if let Ok(val) = HeaderValue::from_str(&retry_after.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, val);
                }
            }
            ApiError::Unauthorized(_) => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            _ => {}
        }
        response
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::UntrustedHost { .. } => ApiError::UntrustedHost,
            Rejection::RateLimited {
                retry_after_secs, ..
            } => ApiError::RateLimited {
                retry_after: retry_after_secs,
            },
            Rejection::Unauthorized(failure) => ApiError::Unauthorized(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_returns_401_with_challenge() {
        let response = ApiError::Unauthorized(AuthFailure::MissingCredential).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("WWW-Authenticate").unwrap(), "Bearer");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Unauthorized");
        assert_eq!(json["detail"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_rate_limited_returns_429_with_retry_after() {
        let response = ApiError::RateLimited { retry_after: 60 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Too Many Requests");
    }

    #[tokio::test]
    async fn test_store_error_hides_details() {
        let err = ApiError::Store(StoreError::Unavailable("mongo at 10.0.0.5 refused".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["detail"], "An unexpected error occurred");
        assert!(!json.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not Found");
    }

    #[test]
    fn test_rejection_mapping() {
        let err: ApiError = Rejection::RateLimited {
            identifier: "1.2.3.4:deadbeef".into(),
            retry_after_secs: 30,
        }
        .into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);

        let err: ApiError = Rejection::UntrustedHost { host: None }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

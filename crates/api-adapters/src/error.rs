//! Maps `DomainError` onto HTTP status codes and the
//! `{"error": {"code", "message"}}` response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use tracing::{debug, error, warn};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Wire code for a response status.
pub fn code_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::CONFLICT => "CONFLICT",
        StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
        s if s.is_success() => "OK",
        _ => "INTERNAL_SERVER_ERROR",
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(..) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &err {
            DomainError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            DomainError::DatabaseUnavailable(detail) => {
                warn!(error = %detail, "storage unavailable");
                "service temporarily unavailable".to_string()
            }
            other => {
                debug!(error = %other, "request rejected");
                other.to_string()
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": code_for(self.status), "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_domain_error_has_a_distinct_status() {
        let cases = [
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::not_found("product", 1), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::DatabaseUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ApiError::from(DomainError::Internal("pq: relation missing".into()));
        assert_eq!(err.message, "internal server error");
        assert_eq!(code_for(err.status()), "INTERNAL_SERVER_ERROR");
    }
}

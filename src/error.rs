//! Error types for the gate service.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Body text returned with every rejected request.
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait before making more requests.";

/// Main error type for gate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// The client used up its window
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimitExceeded,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            GateError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// JSON body for error responses
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message() {
        assert_eq!(
            GateError::RateLimitExceeded.to_string(),
            "Rate limit exceeded. Please wait before making more requests."
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GateError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            GateError::Config("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limit_response() {
        let response = GateError::RateLimitExceeded.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}

//! Normalized tool responses

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Error};

/// Error classes reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NetworkError,
    AuthError,
    ValidationError,
    RateLimitError,
    NotFound,
    UnknownError,
}

impl ErrorCode {
    /// Parse one of the known wire codes, e.g. `NOT_FOUND`
    pub fn from_code(code: &str) -> Option<Self> {
        serde_json::from_value(Value::String(code.to_string())).ok()
    }

    pub fn suggestion(self) -> &'static str {
        match self {
            ErrorCode::NetworkError => {
                "Check your network connection and verify the Phabricator server is accessible"
            }
            ErrorCode::AuthError => {
                "Verify your PHABRICATOR_TOKEN environment variable or check token validity"
            }
            ErrorCode::ValidationError => {
                "Provide valid parameters according to the API documentation"
            }
            ErrorCode::RateLimitError => "Wait a few minutes before making additional requests",
            ErrorCode::NotFound => "Verify the resource identifier and check if it exists",
            ErrorCode::UnknownError => {
                "An unexpected error occurred. Please check the logs for details."
            }
        }
    }

    /// Classify a crate error
    pub fn classify(err: &Error) -> Self {
        match err {
            Error::Api(ApiError::Network(_)) => ErrorCode::NetworkError,
            Error::Api(ApiError::HttpStatus { status, .. }) => match status {
                401 | 403 => ErrorCode::AuthError,
                404 => ErrorCode::NotFound,
                429 => ErrorCode::RateLimitError,
                _ => ErrorCode::NetworkError,
            },
            Error::Api(ApiError::Remote { code, .. }) => {
                Self::from_code(code).unwrap_or(ErrorCode::UnknownError)
            }
            Error::Api(ApiError::InvalidResponse(_)) => ErrorCode::UnknownError,
            Error::Auth(_) => ErrorCode::AuthError,
            Error::Config(_) | Error::Json(_) | Error::Other(_) => ErrorCode::ValidationError,
            Error::Io(_) => ErrorCode::UnknownError,
        }
    }
}

/// Result envelope written back to the caller.
///
/// Success: `{"success": true, "result": ...}`. Failure carries `error`,
/// `error_code` and `suggestion`, plus `error_info` for remote Conduit errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<String>,
}

impl ToolResponse {
    pub fn success(result: Value) -> Self {
        Self {
            id: None,
            success: true,
            result: Some(result),
            error: None,
            error_code: None,
            suggestion: None,
            error_info: None,
        }
    }

    pub fn failure(err: &Error) -> Self {
        let code = ErrorCode::classify(err);
        let (error, error_info) = match err {
            Error::Api(ApiError::Remote { info, .. }) => (err.to_string(), Some(info.clone())),
            Error::Other(msg) => (format!("Parameter validation failed: {}", msg), None),
            _ => (err.to_string(), None),
        };

        Self {
            id: None,
            success: false,
            result: None,
            error: Some(error),
            error_code: Some(code),
            suggestion: Some(code.suggestion().to_string()),
            error_info,
        }
    }

    pub fn from_result(result: crate::error::Result<Value>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => {
                log::debug!("Tool call failed: {}", err);
                Self::failure(&err)
            }
        }
    }

    /// Echo the caller's correlation id
    pub fn with_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }
}

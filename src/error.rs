//! Error types for the Conduit client

use thiserror::Error;

/// Result type alias for Conduit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Api(api) if api.is_transient())
    }
}

/// Errors talking to the Conduit API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("API Error: {info}")]
    Remote { code: String, info: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Connection failures, timeouts and HTTP status errors are transient.
    /// Remote application errors and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::HttpStatus { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if let Some(status) = err.status() {
            ApiError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Credential errors. Caller mistakes, never retried.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Must provide X-PHABRICATOR-TOKEN header.")]
    MissingHeaderToken,

    #[error("PHABRICATOR_TOKEN is required. Set it in the environment or pass --token.")]
    MissingToken,

    #[error("Phabricator API token must be exactly 32 characters long (got {0})")]
    InvalidTokenLength(usize),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("PHABRICATOR_URL is required. Set it in the environment or pass --url.")]
    MissingUrl,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

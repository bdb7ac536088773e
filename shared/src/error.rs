//! Error types for the events API Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the events API Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing environment variable)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream rejected our credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Upstream database not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other upstream failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Unauthorized(_) => 401,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Short machine-readable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::Upstream(_) => "upstream_error",
            Error::Http(_) => "upstream_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Remediation hint surfaced to the caller, where one exists.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Unauthorized(_) => {
                Some("Check that NOTION_API_TOKEN is valid and has not been revoked")
            }
            Error::NotFound(_) => Some(
                "Check NOTION_DATABASE_ID and that the database is shared with the integration",
            ),
            Error::Config(_) => {
                Some("Set NOTION_API_TOKEN and NOTION_DATABASE_ID in the function environment")
            }
            _ => None,
        }
    }
}

//! Error types for the marketplace and shipping collaborators

use thiserror::Error;

use crate::mapper::InvalidSchemaError;

/// Errors raised while talking to SP-API or ShipStation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-success HTTP status from the remote API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Collaborator is not configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fetched schema could not be mapped
    #[error(transparent)]
    InvalidSchema(#[from] InvalidSchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_connect() {
            ServiceError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Parse(err.to_string())
    }
}

/// Result type alias for collaborator operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Turn a non-success response into [`ServiceError::Api`].
pub(crate) async fn check_status(response: reqwest::Response) -> ServiceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        tracing::warn!("Request rejected with {}: {}", status, message);
    }
    Err(ServiceError::Api {
        status: status.as_u16(),
        message,
    })
}

//! Client error types

use serde::Deserialize;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote resource is locked by another writer
    #[error("Resource locked: {0}")]
    Locked(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential rejected by the remote service
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token exchange failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Any other non-2xx response
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Graph error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ClientError {
    /// Whether this error is the remote lock-conflict signal
    pub fn is_locked(&self) -> bool {
        match self {
            ClientError::Locked(_) => true,
            ClientError::Api { message, .. } => mentions_lock(message),
            _ => false,
        }
    }

    /// Classify a non-2xx response body
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<GraphErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.code, envelope.error.message),
            Err(_) => (String::new(), body.to_string()),
        };

        if status == reqwest::StatusCode::LOCKED || mentions_lock(&message) {
            return ClientError::Locked(message);
        }

        match status {
            reqwest::StatusCode::NOT_FOUND => ClientError::NotFound(message),
            reqwest::StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }
}

fn mentions_lock(message: &str) -> bool {
    message.to_ascii_lowercase().contains("locked")
}

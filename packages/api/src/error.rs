//! API error types
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the Telcome API client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Check if this is a network-related error (the bot fallback trigger)
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Check if this is an authentication error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    /// Human-readable message suitable for inline display next to a form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authentication(msg) => msg.clone(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::InvalidResponse(_) | ApiError::Serialization(_) => {
                "The server sent an unexpected response.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

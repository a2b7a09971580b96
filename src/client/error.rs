use crate::domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server answered with an error envelope.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl ClientError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

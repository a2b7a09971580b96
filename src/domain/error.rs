//! Error taxonomy shared by the service, storage and transport layers.

use thiserror::Error;

/// Failure kinds a domain operation can produce.
///
/// The transport layer maps each variant onto an HTTP status; nothing below
/// the transport layer knows about status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed or disallowed input, including references to missing parents.
    #[error("{0}")]
    Validation(String),

    /// A unique name is already taken.
    #[error("{0}")]
    Conflict(String),

    /// The id does not resolve to an existing row.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected persistence or runtime failure.
    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    pub fn not_found(entity: &str, id: i32) -> Self {
        DomainError::NotFound(format!("{} with id {} not found", entity, id))
    }

    pub fn missing_reference(entity: &str, id: i32) -> Self {
        DomainError::Validation(format!("{} with id {} does not exist", entity, id))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    /// Stable name of the error kind, surfaced to clients in the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "ValidationError",
            DomainError::Conflict(_) => "ConflictError",
            DomainError::NotFound(_) => "NotFoundError",
            DomainError::Internal(_) => "InternalError",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

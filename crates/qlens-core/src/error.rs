//! Error types for the QLENS application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire QLENS application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
///
/// The four link-level variants (`MissingCredential`, `CredentialRejected`,
/// `LinkUnreachable`, `JobPipelineInterrupted`) are always recovered locally:
/// each one resolves the link session to a well-defined status and is
/// reported through the event log with a truncated, non-sensitive diagnostic.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum QlensError {
    /// No credential was supplied for authentication.
    #[error("Missing credential: an API token is required")]
    MissingCredential,

    /// The backend explicitly rejected the supplied credential.
    #[error("Credential rejected: {detail}")]
    CredentialRejected { detail: String },

    /// The backend could not be reached (transport failure or timeout).
    #[error("Link unreachable: {message}")]
    LinkUnreachable { message: String },

    /// A dispatched remote job failed before producing a register.
    #[error("Job pipeline interrupted: {message}")]
    JobPipelineInterrupted { message: String },

    /// A suspending operation was requested while another is in flight.
    #[error("Operation already pending: {operation}")]
    OperationPending { operation: String },

    /// A bit-register string that is not a fixed-length sequence over {0,1}.
    #[error("Invalid bit register: {0}")]
    InvalidRegister(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QlensError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a CredentialRejected error with a truncated diagnostic.
    pub fn credential_rejected(detail: impl Into<String>) -> Self {
        Self::CredentialRejected {
            detail: detail.into(),
        }
    }

    /// Creates a LinkUnreachable error
    pub fn link_unreachable(message: impl Into<String>) -> Self {
        Self::LinkUnreachable {
            message: message.into(),
        }
    }

    /// Creates a JobPipelineInterrupted error
    pub fn job_interrupted(message: impl Into<String>) -> Self {
        Self::JobPipelineInterrupted {
            message: message.into(),
        }
    }

    /// Creates an OperationPending error
    pub fn operation_pending(operation: impl Into<String>) -> Self {
        Self::OperationPending {
            operation: operation.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a MissingCredential error
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }

    /// Check if this is a CredentialRejected error
    pub fn is_credential_rejected(&self) -> bool {
        matches!(self, Self::CredentialRejected { .. })
    }

    /// Check if this is a LinkUnreachable error
    pub fn is_link_unreachable(&self) -> bool {
        matches!(self, Self::LinkUnreachable { .. })
    }

    /// Check if this is a JobPipelineInterrupted error
    pub fn is_job_interrupted(&self) -> bool {
        matches!(self, Self::JobPipelineInterrupted { .. })
    }

    /// Check if this is an OperationPending error
    pub fn is_operation_pending(&self) -> bool {
        matches!(self, Self::OperationPending { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for QlensError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QlensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QlensError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for QlensError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, QlensError>`.
pub type Result<T> = std::result::Result<T, QlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(QlensError::credential_rejected("bad token").is_credential_rejected());
        assert!(QlensError::link_unreachable("connect refused").is_link_unreachable());
        assert!(QlensError::job_interrupted("timed out").is_job_interrupted());
        assert!(QlensError::operation_pending("authenticate").is_operation_pending());
        assert!(QlensError::not_found("artifact", "abc").is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = QlensError::MissingCredential;
        assert!(err.to_string().contains("API token"));

        let err = QlensError::credential_rejected("invalid token format");
        assert_eq!(err.to_string(), "Credential rejected: invalid token format");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: QlensError = io_err.into();
        assert!(matches!(err, QlensError::Io { .. }));
    }
}

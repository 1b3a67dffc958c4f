//! Domain-level errors

use std::fmt;

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Validation failed (digit lengths, malformed payloads, bad coordinates)
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// A field declared as required is absent from the decoded input
    #[error("Missing required field {field} in {record}")]
    MissingField {
        /// Record kind being decoded
        record: &'static str,
        /// Name of the absent field
        field: String,
    },
}

impl DomainError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Create a missing-field error
    pub fn missing_field(record: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            record,
            field: field.into(),
        }
    }

    /// Name of the missing field, if this is a missing-field error
    #[must_use]
    pub fn missing_field_name(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. } => Some(field),
            Self::ValidationError(_) => None,
        }
    }
}

/// Kind of failure reported by the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// Could not connect to the remote host
    Connection,
    /// The request did not complete within the configured timeout
    Timeout,
    /// The server answered with a non-success status
    Status(u16),
    /// The body could not be read or is not JSON
    InvalidBody,
    /// Anything else reported by the HTTP client
    Other,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Timeout => write!(f, "timeout"),
            Self::Status(code) => write!(f, "status {code}"),
            Self::InvalidBody => write!(f, "invalid body"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A failed outbound call
///
/// Never crosses a search client boundary: clients log it and return an
/// absent result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transport failure ({kind}): {message}")]
pub struct TransportFailure {
    /// What went wrong
    pub kind: TransportFailureKind,
    /// Human readable detail from the HTTP layer
    pub message: String,
}

impl TransportFailure {
    /// Create a transport failure
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if a later identical call could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self.kind {
            TransportFailureKind::Connection | TransportFailureKind::Timeout => true,
            TransportFailureKind::Status(code) => code == 429 || code >= 500,
            TransportFailureKind::InvalidBody | TransportFailureKind::Other => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_field() {
        let err = DomainError::missing_field("FotocasaProperty", "Price");
        assert_eq!(err.missing_field_name(), Some("Price"));
        assert_eq!(
            err.to_string(),
            "Missing required field Price in FotocasaProperty"
        );
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::validation("identity length");
        assert_eq!(err.to_string(), "Validation failed: identity length");
        assert_eq!(err.missing_field_name(), None);
    }

    #[test]
    fn transport_failure_display() {
        let failure = TransportFailure::new(TransportFailureKind::Status(503), "HTTP 503");
        assert_eq!(failure.to_string(), "Transport failure (status 503): HTTP 503");
    }

    #[test]
    fn transport_failure_retryable() {
        assert!(TransportFailure::new(TransportFailureKind::Timeout, "t").is_retryable());
        assert!(TransportFailure::new(TransportFailureKind::Connection, "c").is_retryable());
        assert!(TransportFailure::new(TransportFailureKind::Status(429), "s").is_retryable());
        assert!(TransportFailure::new(TransportFailureKind::Status(502), "s").is_retryable());
        assert!(!TransportFailure::new(TransportFailureKind::Status(404), "s").is_retryable());
        assert!(!TransportFailure::new(TransportFailureKind::InvalidBody, "b").is_retryable());
    }
}

//! Idealista error types

use domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the Idealista client
#[derive(Debug, Error)]
pub enum IdealistaError {
    /// Malformed input: bad token payload, missing required response field
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The client-credentials exchange failed
    #[error("Authorization failed: {0}")]
    AuthError(String),

    /// A search was attempted before a token was obtained or loaded
    #[error("Not authorized: call authorize or load a token first")]
    NotAuthorized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IdealistaError {
    /// Name of the missing required field, for decode failures
    #[must_use]
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.missing_field_name(),
            _ => None,
        }
    }

    /// Returns true if re-authorizing could clear the error
    #[must_use]
    pub const fn requires_authorization(&self) -> bool {
        matches!(self, Self::AuthError(_) | Self::NotAuthorized)
    }
}

//! Fotocasa error types

use domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the Fotocasa client
///
/// Transport problems are not represented here: the client logs them and
/// returns an absent result.
#[derive(Debug, Error)]
pub enum FotocasaError {
    /// Malformed input to signing or decoding
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Signature could not be encrypted or decrypted
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl FotocasaError {
    /// Name of the missing required field, for decode failures
    #[must_use]
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.missing_field_name(),
            _ => None,
        }
    }
}

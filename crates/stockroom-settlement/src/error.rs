//! # Settlement Errors
//!
//! The error type every storage port returns. Business rule violations pass
//! through as [`CoreError`] variants; anything infrastructural collapses to
//! `Storage` with enough text to debug from logs.

use thiserror::Error;

use stockroom_core::error::{CoreError, ValidationError};

/// Errors surfaced by settlement flows and the storage ports they drive.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// A business rule said no. Carries the full domain taxonomy.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The storage layer failed in a way the domain has no name for.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SettlementError {
    /// Convenience constructor for storage failures.
    pub fn storage(msg: impl Into<String>) -> Self {
        SettlementError::Storage(msg.into())
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            SettlementError::Domain(err) => Some(err),
            SettlementError::Storage(_) => None,
        }
    }

    /// True when retrying the same call cannot succeed (client mistake).
    pub fn is_client_error(&self) -> bool {
        match self {
            SettlementError::Domain(err) => err.is_client_error(),
            SettlementError::Storage(_) => false,
        }
    }
}

impl From<ValidationError> for SettlementError {
    fn from(err: ValidationError) -> Self {
        SettlementError::Domain(CoreError::Validation(err))
    }
}

/// Convenience type alias for Results with SettlementError.
pub type SettlementResult<T> = Result<T, SettlementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_passes_through() {
        let err: SettlementError = CoreError::DuplicateOrder("ord-1".to_string()).into();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::DuplicateOrder(_))
        ));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_wraps_into_domain() {
        let err: SettlementError = ValidationError::Required {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_storage_is_not_client_error() {
        let err = SettlementError::storage("connection reset");
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }
}

//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettlementError ← Domain errors where the flows need them             │
//! │    (DuplicateOrder from a unique violation, NotFound from zero rows);   │
//! │    everything else degrades to SettlementError::Storage                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use stockroom_settlement::SettlementError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and constraint mapping.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a purchase with an existing order reference
    /// - Any UNIQUE index violation
    #[error("Unique violation on {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when this error is a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound          → DbError::NotFound
/// sqlx::Error::Database (23505)     → DbError::UniqueViolation
/// sqlx::Error::Database (23503)     → DbError::ForeignKeyViolation
/// sqlx::Error::PoolTimedOut         → DbError::PoolExhausted
/// Other                             → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                // PostgreSQL SQLSTATE codes: 23505 unique, 23503 foreign key
                match db_err.code().as_deref() {
                    Some("23505") => DbError::UniqueViolation {
                        constraint: db_err
                            .constraint()
                            .unwrap_or("unknown")
                            .to_string(),
                    },
                    Some("23503") => DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    },
                    _ => DbError::QueryFailed(db_err.message().to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Storage ports surface DbError as the settlement storage failure. Domain
/// mappings (duplicate order, stock not found) happen in the repositories,
/// where the context lives.
impl From<DbError> for SettlementError {
    fn from(err: DbError) -> Self {
        SettlementError::storage(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Stock", "stk-1");
        assert_eq!(err.to_string(), "Stock not found: stk-1");
    }

    #[test]
    fn test_unique_violation_detection() {
        let err = DbError::UniqueViolation {
            constraint: "customer_purchases_order_reference_key".to_string(),
        };
        assert!(err.is_unique_violation());
        assert!(!DbError::PoolExhausted.is_unique_violation());
    }

    #[test]
    fn test_converts_to_storage_error() {
        let err: SettlementError = DbError::PoolExhausted.into();
        assert!(err.as_domain().is_none());
    }
}

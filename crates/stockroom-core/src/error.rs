//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-settlement errors (separate crate)                          │
//! │  ├── SettlementError  - CoreError + storage failures                   │
//! │  └── DownstreamError  - Best-effort side (events, cache, notify)       │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What HTTP clients see (status + code)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SettlementError → ApiError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (stock ID, quantities, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing responses.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough units on hand to satisfy a purchase.
    ///
    /// ## When This Occurs
    /// - A purchase asks for more units than the floor-checked decrement
    ///   can take without going negative
    ///
    /// ## User Workflow
    /// ```text
    /// Purchase (qty: 5)
    ///      │
    ///      ▼
    /// Conditional decrement: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { stock_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Client sees: 400 "Only 3 units available"
    /// ```
    #[error("Insufficient stock for {stock_id}: available {available}, requested {requested}")]
    InsufficientStock {
        stock_id: String,
        available: i64,
        requested: i64,
    },

    /// Stock item cannot be found in the given store.
    ///
    /// ## When This Occurs
    /// - Stock ID doesn't exist
    /// - Stock exists but belongs to a different store (IDs never leak
    ///   across store scopes)
    #[error("Stock {stock_id} not found in store {store_id}")]
    StockNotFound { store_id: String, stock_id: String },

    /// Acting admin does not own the stock item they are mutating.
    #[error("Admin {admin_id} is not authorized to manage stock {stock_id}")]
    NotAuthorized { admin_id: String, stock_id: String },

    /// Rebalance top-up too small to clear the replenishment floor.
    ///
    /// ## When This Occurs
    /// - `current + quantity_to_add` would still be at or below the
    ///   low-stock threshold, which makes the top-up pointless
    #[error(
        "Top-up of {offered} for stock {stock_id} is insufficient: at least {required} required"
    )]
    InsufficientTopUp {
        stock_id: String,
        required: i64,
        offered: i64,
    },

    /// A purchase with this order reference has already been settled.
    ///
    /// ## When This Occurs
    /// - Payment provider retries its webhook
    /// - Two settlement calls race on the same order
    ///
    /// The purchase ledger is append-only and keyed by order reference, so
    /// the second attempt must never produce a second record.
    #[error("Order {0} has already been settled")]
    DuplicateOrder(String),

    /// Payout requested over a window with no earnings.
    #[error("Nothing to pay out for admin {admin_id}")]
    NothingToPay { admin_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Convenience constructor for [`CoreError::StockNotFound`].
    pub fn stock_not_found(store_id: impl Into<String>, stock_id: impl Into<String>) -> Self {
        CoreError::StockNotFound {
            store_id: store_id.into(),
            stock_id: stock_id.into(),
        }
    }

    /// True when the error is a client mistake rather than a system fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, CoreError::NothingToPay { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., stray characters in an identifier).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

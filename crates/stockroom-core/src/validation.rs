//! # Validation Module
//!
//! Input validation utilities for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (deserialization)                               │
//! │  ├── Type validation (numbers are numbers, etc.)                       │
//! │  └── Immediate 400 on malformed JSON                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Identifiers non-empty and bounded                                 │
//! │  └── Quantities and amounts in range                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE order_reference                                            │
//! │  └── CHECK (quantity >= 0)                                             │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_identifier, validate_quantity};
//!
//! validate_identifier("store_id", "store-001").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity identifier (store ID, stock ID, admin ID, customer ID).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 64 characters
/// - Must contain only alphanumerics, hyphens, underscores
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an order reference (the settlement idempotency key).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
///
/// Format is otherwise caller-defined; payment providers generate these.
pub fn validate_order_reference(reference: &str) -> ValidationResult<()> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(ValidationError::Required {
            field: "orderReference".to_string(),
        });
    }

    if reference.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "orderReference".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a stock item name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_stock_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a purchase or rebalance quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an initial quantity for a new stock item.
///
/// ## Rules
/// - Must be non-negative (>= 0). Listing an out-of-stock item is allowed;
///   it will simply alert until rebalanced.
pub fn validate_initial_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Must be positive (> 0). Free listings are not a thing in settlement;
///   a zero price would make every payout window degenerate.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a caller-supplied paid amount against the purchase quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must be at least `quantity` cents, so the derived unit price is >= 1
pub fn validate_amount_paid(cents: i64, quantity: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amountPaid".to_string(),
        });
    }

    if cents < quantity {
        return Err(ValidationError::OutOfRange {
            field: "amountPaid".to_string(),
            min: quantity,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

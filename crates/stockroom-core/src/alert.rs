//! # Stock Level Rules
//!
//! Pure rules for low-stock alerting and replenishment floors.
//!
//! ## The Threshold Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quantity:   ... 8   9   10   11   12 ...                               │
//! │              ────────────┼──────────────                                │
//! │              ALERT FIRES │ healthy                                      │
//! │                          │                                              │
//! │  The comparison is STRICT: quantity < 10 fires, quantity == 10 does    │
//! │  not. Every settlement and rebalance re-evaluates against the          │
//! │  post-operation quantity, so an item oscillating around the threshold  │
//! │  alerts on every dip.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{LOW_STOCK_THRESHOLD, REBALANCE_FLOOR};

// =============================================================================
// Alert Kind
// =============================================================================

/// The kind of stock alert. Only low-stock exists today; the wire format
/// keeps a discriminator so consumers can branch on future kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "LOW_STOCK")]
    LowStock,
}

impl AlertKind {
    /// Stable label used in alert payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LOW_STOCK",
        }
    }
}

// =============================================================================
// Alert Decision
// =============================================================================

/// Outcome of evaluating a stock level against the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    /// The quantity the decision was made against.
    pub quantity: i64,
    /// The alert to raise, if any.
    pub alert: Option<AlertKind>,
}

impl AlertDecision {
    /// True when an alert should be raised.
    #[inline]
    pub const fn fired(&self) -> bool {
        self.alert.is_some()
    }
}

/// Evaluates a post-operation stock quantity against the low-stock threshold.
///
/// ## Example
/// ```rust
/// use stockroom_core::alert::evaluate_stock_level;
///
/// assert!(evaluate_stock_level(9).fired());
/// assert!(!evaluate_stock_level(10).fired());
/// ```
pub fn evaluate_stock_level(quantity: i64) -> AlertDecision {
    let alert = if quantity < LOW_STOCK_THRESHOLD {
        Some(AlertKind::LowStock)
    } else {
        None
    };
    AlertDecision { quantity, alert }
}

// =============================================================================
// Replenishment Floor
// =============================================================================

/// Smallest top-up that brings a stock item up to the replenishment floor.
///
/// Returns zero when the item is already at or above the floor, in which
/// case any positive top-up is acceptable.
///
/// ## Example
/// ```rust
/// use stockroom_core::alert::minimum_top_up;
///
/// assert_eq!(minimum_top_up(4), 7);  // 4 + 7 = 11
/// assert_eq!(minimum_top_up(11), 0); // already at the floor
/// assert_eq!(minimum_top_up(-3), 14); // corrupted level still lands at 11
/// ```
pub fn minimum_top_up(current_quantity: i64) -> i64 {
    (REBALANCE_FLOOR - current_quantity).max(0)
}

/// True when adding `quantity_to_add` units clears the replenishment floor.
pub fn top_up_clears_floor(current_quantity: i64, quantity_to_add: i64) -> bool {
    quantity_to_add >= minimum_top_up(current_quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_fires_strictly_below_threshold() {
        assert!(evaluate_stock_level(9).fired());
        assert!(evaluate_stock_level(0).fired());
        assert!(!evaluate_stock_level(10).fired());
        assert!(!evaluate_stock_level(11).fired());
    }

    #[test]
    fn test_alert_kind_label() {
        let decision = evaluate_stock_level(3);
        assert_eq!(decision.alert, Some(AlertKind::LowStock));
        assert_eq!(AlertKind::LowStock.as_str(), "LOW_STOCK");
    }

    #[test]
    fn test_minimum_top_up() {
        assert_eq!(minimum_top_up(0), 11);
        assert_eq!(minimum_top_up(4), 7);
        assert_eq!(minimum_top_up(10), 1);
        assert_eq!(minimum_top_up(11), 0);
        assert_eq!(minimum_top_up(50), 0);
    }

    #[test]
    fn test_top_up_clears_floor() {
        assert!(top_up_clears_floor(4, 7));
        assert!(!top_up_clears_floor(4, 6));
        // Anything positive is fine once the floor is already cleared
        assert!(top_up_clears_floor(42, 1));
    }

    #[test]
    fn test_alert_kind_serializes_to_wire_label() {
        let json = serde_json::to_string(&AlertKind::LowStock).unwrap();
        assert_eq!(json, "\"LOW_STOCK\"");
    }
}

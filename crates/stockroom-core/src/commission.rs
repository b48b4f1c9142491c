//! # Commission Module
//!
//! Maps subscription plans to commission rates and computes payout amounts.
//!
//! ## Tier Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Plan ID │ Tier     │ Commission │ Admin keeps                          │
//! │  ────────┼──────────┼────────────┼──────────────                        │
//! │     1    │ Starter  │    15%     │    85%                               │
//! │     2    │ Standard │    10%     │    90%                               │
//! │     3    │ Premium  │     5%     │    95%                               │
//! │   other  │ Starter  │    15%     │    85%   (unknown/missing plan)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fallback to the Starter rate is deliberate: an admin with no active
//! subscription row, or one pointing at a retired plan, settles at the most
//! conservative rate instead of failing the payout.
//!
//! ## Rounding
//! The payout amount is rounded half-up ON THE FINAL AMOUNT, not on the
//! commission. `$300.00` gross at 15% commission pays exactly `$255.00`.

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% (the Starter tier commission)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Computes the net amount an admin receives after commission.
    ///
    /// ## Implementation
    /// Integer math on the retained share: `(gross * (10000 - bps) + 5000) / 10000`
    /// The +5000 provides half-up rounding (5000/10000 = 0.5). i128 widening
    /// prevents overflow on large windows.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::commission::CommissionRate;
    /// use stockroom_core::money::Money;
    ///
    /// let gross = Money::from_cents(30_000); // $300.00
    /// let rate = CommissionRate::from_bps(1500); // 15%
    /// assert_eq!(rate.net_of(gross).cents(), 25_500); // $255.00
    /// ```
    pub fn net_of(&self, gross: Money) -> Money {
        let retained_bps = 10_000i128 - self.0 as i128;
        let net_cents = (gross.cents() as i128 * retained_bps + 5000) / 10_000;
        Money::from_cents(net_cents as i64)
    }
}

// =============================================================================
// Commission Tier
// =============================================================================

/// Subscription tier an admin can be on.
///
/// The tier is resolved from the admin's active subscription plan at payout
/// time. Historical payouts keep the rate they were computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTier {
    /// Plan 1 (and the fallback for unknown plans): 15% commission.
    Starter,
    /// Plan 2: 10% commission.
    Standard,
    /// Plan 3: 5% commission.
    Premium,
}

impl CommissionTier {
    /// Resolves a tier from an active subscription plan ID.
    ///
    /// Unknown plan IDs and `None` (no active subscription) both fall back
    /// to [`CommissionTier::Starter`].
    pub fn from_plan_id(plan_id: Option<i64>) -> Self {
        match plan_id {
            Some(2) => CommissionTier::Standard,
            Some(3) => CommissionTier::Premium,
            Some(_) | None => CommissionTier::Starter,
        }
    }

    /// Returns the commission rate for this tier.
    pub const fn rate(&self) -> CommissionRate {
        match self {
            CommissionTier::Starter => CommissionRate::from_bps(1500),
            CommissionTier::Standard => CommissionRate::from_bps(1000),
            CommissionTier::Premium => CommissionRate::from_bps(500),
        }
    }

    /// Returns a stable label for logs and payout rows.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommissionTier::Starter => "starter",
            CommissionTier::Standard => "standard",
            CommissionTier::Premium => "premium",
        }
    }
}

impl Default for CommissionTier {
    fn default() -> Self {
        CommissionTier::Starter
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_plan_id() {
        assert_eq!(CommissionTier::from_plan_id(Some(1)), CommissionTier::Starter);
        assert_eq!(
            CommissionTier::from_plan_id(Some(2)),
            CommissionTier::Standard
        );
        assert_eq!(CommissionTier::from_plan_id(Some(3)), CommissionTier::Premium);
    }

    #[test]
    fn test_unknown_plan_falls_back_to_starter() {
        assert_eq!(CommissionTier::from_plan_id(Some(99)), CommissionTier::Starter);
        assert_eq!(CommissionTier::from_plan_id(None), CommissionTier::Starter);
    }

    #[test]
    fn test_tier_rates() {
        assert_eq!(CommissionTier::Starter.rate().bps(), 1500);
        assert_eq!(CommissionTier::Standard.rate().bps(), 1000);
        assert_eq!(CommissionTier::Premium.rate().bps(), 500);
    }

    /// The canonical worked example: $300.00 gross at 15% pays $255.00.
    #[test]
    fn test_net_of_canonical_example() {
        let gross = Money::from_cents(30_000);
        let net = CommissionTier::Starter.rate().net_of(gross);
        assert_eq!(net.cents(), 25_500);
    }

    #[test]
    fn test_net_of_all_tiers() {
        let gross = Money::from_cents(30_000);
        assert_eq!(CommissionTier::Standard.rate().net_of(gross).cents(), 27_000);
        assert_eq!(CommissionTier::Premium.rate().net_of(gross).cents(), 28_500);
    }

    #[test]
    fn test_net_of_rounds_half_up() {
        // $0.03 gross at 15%: 3 * 8500 = 25500, +5000 = 30500, /10000 = 3
        // (2.55 exact rounds up to 3)
        let tiny = Money::from_cents(3);
        assert_eq!(CommissionRate::from_bps(1500).net_of(tiny).cents(), 3);

        // $0.01 at 50%: 0.5 exact rounds up to 1
        let cent = Money::from_cents(1);
        assert_eq!(CommissionRate::from_bps(5000).net_of(cent).cents(), 1);
    }

    #[test]
    fn test_net_of_zero_gross() {
        let zero = Money::zero();
        assert_eq!(CommissionTier::Premium.rate().net_of(zero).cents(), 0);
    }

    #[test]
    fn test_percentage_display() {
        assert!((CommissionTier::Starter.rate().percentage() - 15.0).abs() < 0.001);
    }
}

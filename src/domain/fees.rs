//! Taker fee schedule for pool fills.
//!
//! Fees are charged on the gross bet and split into three itemized
//! buckets. A flat component applies to every bet; the remaining
//! components scale with `1 - q`, where `q` is the post-trade (pre-fee)
//! probability of the outcome being bought, so long-shot bets pay more
//! than near-certain ones.
//!
//! Resting-order fills never pay taker fees; only pool fills do.
//! Fees are informational: they reduce the amount traded into the pool
//! but are never added to the reserves.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::market::Outcome;

/// Itemized fees for one fill (or a sum of fills).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fees {
    pub platform_fee: f64,
    pub creator_fee: f64,
    pub liquidity_fee: f64,
}

impl Fees {
    pub const ZERO: Self = Self {
        platform_fee: 0.0,
        creator_fee: 0.0,
        liquidity_fee: 0.0,
    };

    pub fn total(&self) -> f64 {
        self.platform_fee + self.creator_fee + self.liquidity_fee
    }
}

impl Add for Fees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            platform_fee: self.platform_fee + rhs.platform_fee,
            creator_fee: self.creator_fee + rhs.creator_fee,
            liquidity_fee: self.liquidity_fee + rhs.liquidity_fee,
        }
    }
}

impl AddAssign for Fees {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Fees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Fee rates applied to pool fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Charged on every bet regardless of probability.
    pub flat_rate: f64,
    /// Probability-weighted platform share.
    pub platform_rate: f64,
    /// Probability-weighted market-creator share.
    pub creator_rate: f64,
    /// Probability-weighted liquidity-provider share.
    pub liquidity_rate: f64,
}

impl FeeSchedule {
    pub fn new(flat_rate: f64, platform_rate: f64, creator_rate: f64, liquidity_rate: f64) -> Self {
        Self {
            flat_rate,
            platform_rate,
            creator_rate,
            liquidity_rate,
        }
    }

    /// A schedule that charges nothing.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_fraction() == 0.0
    }

    /// Upper bound on total fees as a fraction of the bet (reached as the
    /// bought outcome's probability approaches 0).
    pub fn max_fraction(&self) -> f64 {
        self.flat_rate + self.platform_rate + self.creator_rate + self.liquidity_rate
    }

    /// Computes the fees for a bet of `bet_amount` on `outcome` whose
    /// execution would leave the pool at YES probability `prob_after`.
    ///
    /// Formula per weighted bucket: rate * (1 - q) * bet, where
    /// q = probability of `outcome` after the trade.
    pub fn compute(&self, outcome: Outcome, bet_amount: f64, prob_after: f64) -> Fees {
        let bet_p = 1.0 - outcome.prob_of(prob_after);
        Fees {
            platform_fee: self.flat_rate * bet_amount + self.platform_rate * bet_p * bet_amount,
            creator_fee: self.creator_rate * bet_p * bet_amount,
            liquidity_fee: self.liquidity_rate * bet_p * bet_amount,
        }
    }
}

impl Default for FeeSchedule {
    /// Default: 1% platform, 4% creator, 2% liquidity, all weighted by
    /// `1 - q`; no flat component.
    fn default() -> Self {
        Self::new(0.0, 0.01, 0.04, 0.02)
    }
}

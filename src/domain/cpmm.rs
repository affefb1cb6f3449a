//! Weighted constant-product market maker (CPMM).
//!
//! The pool holds YES and NO reserves `(y, n)` and a weight `p`. Trades
//! preserve the invariant
//!
//! ```text
//! k = y^p * n^(1-p)
//! ```
//!
//! and the implied YES probability is `p*n / (p*n + (1-p)*y)`.
//!
//! Buying an outcome with `b` mints `b` YES+NO pairs into the pool and
//! withdraws enough of the bought token to restore `k`; the trader
//! receives the withdrawn tokens plus the `b` minted ones of that side.
//! Since every share pays 1 on resolution and costs less than 1, shares
//! received always exceed the amount paid.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::EngineError;
use super::fees::{FeeSchedule, Fees};
use super::market::{CpmmState, Outcome, Pool};
use super::search::binary_search;

/// Result of a fee-inclusive purchase against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Shares credited to the buyer (after fees).
    pub shares: f64,
    /// Pool state after the trade.
    pub state: CpmmState,
    /// Fees charged on the gross bet.
    pub fees: Fees,
}

/// Result of adding liquidity to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityChange {
    pub state: CpmmState,
    /// Increase of `y^p * n^(1-p)` measured at the new weight.
    pub liquidity: f64,
}

impl CpmmState {
    /// Implied YES probability.
    pub fn probability(&self) -> f64 {
        let Pool { yes, no } = self.pool;
        (self.p * no) / ((1.0 - self.p) * yes + self.p * no)
    }

    /// Constant-product invariant `k` (also the pool's liquidity measure).
    pub fn liquidity(&self) -> f64 {
        let Pool { yes, no } = self.pool;
        yes.powf(self.p) * no.powf(1.0 - self.p)
    }

    /// Shares of `outcome` received for `bet`, before fees.
    pub fn calculate_shares(&self, bet: f64, outcome: Outcome) -> f64 {
        let Pool { yes: y, no: n } = self.pool;
        let p = self.p;
        let k = self.liquidity();
        match outcome {
            Outcome::Yes => y + bet - (k * (bet + n).powf(p - 1.0)).powf(1.0 / p),
            Outcome::No => n + bet - (k * (bet + y).powf(-p)).powf(1.0 / (1.0 - p)),
        }
    }

    /// Pool after trading `bet` into `outcome` for `shares`.
    fn pool_after(&self, outcome: Outcome, bet: f64, shares: f64) -> Pool {
        let Pool { yes: y, no: n } = self.pool;
        match outcome {
            Outcome::Yes => Pool::new(y - shares + bet, n + bet),
            Outcome::No => Pool::new(y + bet, n - shares + bet),
        }
    }

    /// Trades `bet` into the pool on `outcome`, ignoring fees.
    ///
    /// Returns the new state and the shares granted.
    pub fn apply_trade(&self, outcome: Outcome, bet: f64) -> Result<(Self, f64), EngineError> {
        self.validate()?;
        if !(bet.is_finite() && bet > 0.0) {
            return Err(EngineError::InvalidAmount(bet));
        }
        let shares = self.calculate_shares(bet, outcome);
        let next = Self {
            pool: self.pool_after(outcome, bet, shares),
            p: self.p,
        };
        next.validate()?;
        Ok((next, shares))
    }

    /// YES probability after trading `bet`, before any fee is deducted.
    pub fn probability_after_bet_before_fees(&self, outcome: Outcome, bet: f64) -> f64 {
        let shares = self.calculate_shares(bet, outcome);
        Self {
            pool: self.pool_after(outcome, bet, shares),
            p: self.p,
        }
        .probability()
    }

    /// Buys `outcome` with gross `bet`: fees are computed on the gross
    /// amount and only the remainder is traded into the pool.
    pub fn purchase(
        &self,
        bet: f64,
        outcome: Outcome,
        schedule: &FeeSchedule,
    ) -> Result<Purchase, EngineError> {
        if bet == 0.0 {
            return Ok(Purchase {
                shares: 0.0,
                state: *self,
                fees: Fees::ZERO,
            });
        }
        let prob = self.probability_after_bet_before_fees(outcome, bet);
        let fees = schedule.compute(outcome, bet, prob);
        let remaining = bet - fees.total();
        let (state, shares) = self.apply_trade(outcome, remaining)?;
        trace!(%outcome, bet, remaining, shares, "pool purchase");
        Ok(Purchase {
            shares,
            state,
            fees,
        })
    }

    /// Gross amount that moves the pool's YES probability to `prob` by
    /// buying `outcome`.
    ///
    /// Returns `f64::INFINITY` for targets outside (0, 1) and 0 when the
    /// pool is already at or past the target in the traded direction.
    pub fn amount_to_probability(
        &self,
        prob: f64,
        outcome: Outcome,
        schedule: &FeeSchedule,
    ) -> Result<f64, EngineError> {
        if prob.is_nan() || prob <= 0.0 || prob >= 1.0 {
            return Ok(f64::INFINITY);
        }
        let current = self.probability();
        let already_there = match outcome {
            Outcome::Yes => current >= prob,
            Outcome::No => current <= prob,
        };
        if already_there {
            return Ok(0.0);
        }

        let net = self.net_amount_to_probability(prob, outcome);
        if schedule.is_zero() {
            return Ok(net);
        }

        // Fees only shrink the traded amount, so the gross amount lies in
        // [net, net / (1 - max fee fraction)].
        let upper = net / (1.0 - schedule.max_fraction());
        binary_search(net, upper, |amount| {
            let after = self.purchase(amount, outcome, schedule)?.state.probability();
            Ok(match outcome {
                Outcome::Yes => after - prob,
                Outcome::No => prob - after,
            })
        })
    }

    /// Closed-form fee-free amount to reach `prob`.
    fn net_amount_to_probability(&self, prob: f64, outcome: Outcome) -> f64 {
        let Pool { yes: y, no: n } = self.pool;
        let p = self.p;
        let k = self.liquidity();
        match outcome {
            Outcome::Yes => {
                let ratio = (p * (prob - 1.0)) / ((p - 1.0) * prob);
                ratio.powf(-p) * (k - n * ratio.powf(p))
            }
            Outcome::No => {
                let q = 1.0 - prob;
                let ratio = ((1.0 - p) * (q - 1.0)) / (-p * q);
                ratio.powf(p - 1.0) * (k - y * ratio.powf(1.0 - p))
            }
        }
    }

    /// Adds `amount` to both reserves and re-solves `p` so the implied
    /// probability is unchanged.
    pub fn add_liquidity(&self, amount: f64) -> Result<LiquidityChange, EngineError> {
        self.validate()?;
        if !(amount.is_finite() && amount > 0.0) {
            return Err(EngineError::InvalidAmount(amount));
        }
        let prob = self.probability();
        let Pool { yes: y, no: n } = self.pool;

        let numerator = prob * (amount + y);
        let denominator = amount - n * (prob - 1.0) + prob * y;
        let new_p = numerator / denominator;

        let old = Self {
            pool: self.pool,
            p: new_p,
        };
        let state = Self {
            pool: Pool::new(y + amount, n + amount),
            p: new_p,
        };
        state.validate()?;
        Ok(LiquidityChange {
            state,
            liquidity: state.liquidity() - old.liquidity(),
        })
    }
}

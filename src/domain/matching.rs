//! Order matcher: combines a taker order with resting limit orders and
//! the pool.
//!
//! Resting orders on the opposite outcome are walked in price-then-time
//! priority. At each step the pool's marginal price is compared with the
//! best remaining order:
//!
//! - order at least as good as the pool: fill against the order at its
//!   own limit price, pool untouched;
//! - pool strictly better: buy from the pool, but only until the pool
//!   price reaches that order's limit (or the taker's own limit).
//!
//! A limit taker stops once the pool has reached its limit and the next
//! resting order is worse than that limit; the remainder is left for the
//! caller to persist as a new resting order.
//!
//! Selling is expressed as buying the opposite outcome: a YES share plus a
//! NO share always redeem for exactly 1, so selling `s` YES shares is
//! buying `s` NO shares and pocketing the difference.

use std::cmp::Ordering;

use tracing::{debug, trace};

use super::error::EngineError;
use super::fees::{FeeSchedule, Fees};
use super::market::{CpmmState, Outcome};
use super::order::{
    validate_amount, Fill, LimitOrder, MakerFill, SaleResult, TradeRequest, TradeResult,
};
use super::search::{
    binary_search, floating_equal, floating_greater_equal, floating_lesser_equal, EPSILON,
};

/// Hard cap on matching steps. Each step either exhausts a resting order
/// or moves the pool to a limit, so real books never get near this.
const MAX_FILL_STEPS: usize = 10_000;

/// Raw output of the matching loop.
#[derive(Debug, Clone)]
struct Fills {
    takers: Vec<Fill>,
    makers: Vec<MakerFill>,
    state: CpmmState,
    fees: Fees,
}

/// A single matching step.
enum Step {
    Pool {
        fill: Fill,
        state: CpmmState,
        fees: Fees,
    },
    Order {
        taker: Fill,
        maker: MakerFill,
    },
}

/// Price the taker pays per share when matching `order`.
fn taker_price(outcome: Outcome, order: &LimitOrder) -> f64 {
    match outcome {
        Outcome::Yes => order.limit_prob,
        Outcome::No => 1.0 - order.limit_prob,
    }
}

/// Opposite-side open orders, best price for the taker first, then oldest.
fn sorted_book(outcome: Outcome, resting: &[LimitOrder]) -> Vec<&LimitOrder> {
    let mut book: Vec<&LimitOrder> = resting
        .iter()
        .filter(|order| {
            order.outcome != outcome
                && order.is_open()
                && order.limit_prob > 0.0
                && order.limit_prob < 1.0
        })
        .collect();
    book.sort_by(|a, b| {
        let by_price = match outcome {
            Outcome::Yes => a.limit_prob.total_cmp(&b.limit_prob),
            Outcome::No => b.limit_prob.total_cmp(&a.limit_prob),
        };
        match by_price {
            Ordering::Equal => a.created_time.cmp(&b.created_time),
            other => other,
        }
    });
    book
}

/// Computes the next fill, or `None` when the taker's limit stops matching.
fn compute_fill(
    amount: f64,
    outcome: Outcome,
    limit_prob: Option<f64>,
    state: &CpmmState,
    matched: Option<&LimitOrder>,
    schedule: &FeeSchedule,
) -> Result<Option<Step>, EngineError> {
    let prob = state.probability();

    if let Some(limit) = limit_prob {
        let stop = match outcome {
            Outcome::Yes => {
                floating_greater_equal(prob, limit) && matched.map_or(1.0, |o| o.limit_prob) > limit
            }
            Outcome::No => {
                floating_lesser_equal(prob, limit) && matched.map_or(0.0, |o| o.limit_prob) < limit
            }
        };
        if stop {
            return Ok(None);
        }
    }

    let pool_is_better = match matched {
        None => true,
        Some(order) => match outcome {
            Outcome::Yes => !floating_greater_equal(prob, order.limit_prob),
            Outcome::No => !floating_lesser_equal(prob, order.limit_prob),
        },
    };

    if pool_is_better {
        let bound = match (matched, outcome) {
            (None, _) => limit_prob,
            (Some(order), Outcome::Yes) => Some(order.limit_prob.min(limit_prob.unwrap_or(1.0))),
            (Some(order), Outcome::No) => Some(order.limit_prob.max(limit_prob.unwrap_or(0.0))),
        };
        let buy_amount = match bound {
            None => amount,
            Some(bound) => amount.min(state.amount_to_probability(bound, outcome, schedule)?),
        };
        if buy_amount <= 0.0 {
            return Ok(None);
        }

        let purchase = state.purchase(buy_amount, outcome, schedule)?;
        trace!(buy_amount, shares = purchase.shares, "pool fill");
        return Ok(Some(Step::Pool {
            fill: Fill {
                matched_order_id: None,
                amount: buy_amount,
                shares: purchase.shares,
                is_sale: false,
            },
            state: purchase.state,
            fees: purchase.fees,
        }));
    }

    let Some(order) = matched else {
        return Ok(None);
    };
    let price = taker_price(outcome, order);
    let shares = (amount / price).min(order.remaining() / (1.0 - price));

    trace!(order_id = %order.id, price, shares, "resting order fill");
    Ok(Some(Step::Order {
        taker: Fill {
            matched_order_id: Some(order.id.clone()),
            amount: shares * price,
            shares,
            is_sale: false,
        },
        maker: MakerFill {
            order_id: order.id.clone(),
            amount: shares * (1.0 - price),
            shares,
        },
    }))
}

/// Runs the matching loop without validating inputs.
fn compute_fills(
    outcome: Outcome,
    bet_amount: f64,
    limit_prob: Option<f64>,
    state: &CpmmState,
    resting: &[LimitOrder],
    schedule: &FeeSchedule,
) -> Result<Fills, EngineError> {
    let book = sorted_book(outcome, resting);

    let mut takers = Vec::new();
    let mut makers = Vec::new();
    let mut current = *state;
    let mut fees = Fees::ZERO;
    let mut amount = bet_amount;
    let mut next_order = 0;

    for _ in 0..MAX_FILL_STEPS {
        let matched = book.get(next_order).copied();
        let Some(step) = compute_fill(amount, outcome, limit_prob, &current, matched, schedule)?
        else {
            break;
        };

        let taken = match step {
            Step::Pool {
                fill,
                state,
                fees: step_fees,
            } => {
                current = state;
                fees += step_fees;
                let taken = fill.amount;
                takers.push(fill);
                taken
            }
            Step::Order { taker, maker } => {
                next_order += 1;
                let taken = taker.amount;
                takers.push(taker);
                makers.push(maker);
                taken
            }
        };

        amount -= taken;
        if floating_equal(amount, 0.0) {
            break;
        }
    }

    Ok(Fills {
        takers,
        makers,
        state: current,
        fees,
    })
}

/// Matches a taker request against the pool and the resting book.
///
/// Pure and deterministic: the same inputs always give the same result,
/// so a client-side preview and the authoritative execution agree.
pub fn match_order(
    request: &TradeRequest,
    state: &CpmmState,
    resting: &[LimitOrder],
    schedule: &FeeSchedule,
) -> Result<TradeResult, EngineError> {
    request.validate()?;
    state.validate()?;

    let fills = compute_fills(
        request.outcome,
        request.amount,
        request.limit_prob,
        state,
        resting,
        schedule,
    )?;

    let amount: f64 = fills.takers.iter().map(|f| f.amount).sum();
    let shares: f64 = fills.takers.iter().map(|f| f.shares).sum();
    let prob_before = state.probability();
    let prob_after = fills.state.probability();

    debug!(
        outcome = %request.outcome,
        requested = request.amount,
        filled = amount,
        shares,
        fills = fills.takers.len(),
        maker_fills = fills.makers.len(),
        prob_before,
        prob_after,
        "order matched"
    );

    Ok(TradeResult {
        outcome: request.outcome,
        order_amount: request.amount,
        amount,
        shares,
        limit_prob: request.limit_prob,
        fills: fills.takers,
        maker_fills: fills.makers,
        fees: fills.fees,
        state: fills.state,
        prob_before,
        prob_after,
        is_filled: floating_equal(request.amount, amount),
    })
}

/// Smallest amount whose market buy of `outcome` yields `shares` shares.
///
/// Pool shares cost at most `1 / (1 - max fee fraction)` each and resting
/// orders fill at their limit price below 1, so the answer lies in
/// `(0, shares / (1 - max_fraction))`.
pub fn amount_to_buy_shares(
    state: &CpmmState,
    shares: f64,
    outcome: Outcome,
    resting: &[LimitOrder],
    schedule: &FeeSchedule,
) -> Result<f64, EngineError> {
    let max_fraction = schedule.max_fraction();
    let upper = shares / (1.0 - max_fraction);
    if max_fraction >= 1.0 || !upper.is_finite() {
        return Err(EngineError::UnfillableSale {
            requested: shares,
            filled: 0.0,
        });
    }
    binary_search(0.0, upper, |amount| {
        let fills = compute_fills(outcome, amount, None, state, resting, schedule)?;
        let total: f64 = fills.takers.iter().map(|f| f.shares).sum();
        Ok(total - shares)
    })
}

/// Sells `shares` of `outcome` by buying the same number of opposite
/// shares and redeeming the pairs.
pub fn calculate_sale(
    state: &CpmmState,
    shares: f64,
    outcome: Outcome,
    resting: &[LimitOrder],
    schedule: &FeeSchedule,
) -> Result<SaleResult, EngineError> {
    validate_amount(shares)?;
    state.validate()?;

    let opposite = outcome.opposite();
    let buy_amount = amount_to_buy_shares(state, shares, opposite, resting, schedule)?;
    let fills = compute_fills(opposite, buy_amount, None, state, resting, schedule)?;

    // Each opposite share bought cancels one held share; the pair is worth 1.
    let sale_fills: Vec<Fill> = fills
        .takers
        .into_iter()
        .map(|taker| Fill {
            amount: -(taker.shares - taker.amount),
            shares: -taker.shares,
            is_sale: true,
            ..taker
        })
        .collect();
    let sale_value = -sale_fills.iter().map(|f| f.amount).sum::<f64>();
    let sold = -sale_fills.iter().map(|f| f.shares).sum::<f64>();
    if (sold - shares).abs() > EPSILON * shares.max(1.0) {
        return Err(EngineError::UnfillableSale {
            requested: shares,
            filled: sold,
        });
    }

    let prob_before = state.probability();
    let prob_after = fills.state.probability();
    debug!(%outcome, shares = sold, sale_value, prob_before, prob_after, "sale computed");

    Ok(SaleResult {
        outcome,
        shares: sold,
        sale_value,
        fills: sale_fills,
        maker_fills: fills.makers,
        fees: fills.fees,
        state: fills.state,
        prob_before,
        prob_after,
    })
}

/// Quantity to actually sell for a request of `requested` shares out of
/// an `owned` balance.
///
/// Asking for exactly `floor(owned)` sells the whole fractional balance so
/// no unsellable dust below one share is left behind.
pub fn resolve_sell_quantity(requested: f64, owned: f64) -> Result<f64, EngineError> {
    validate_amount(requested)?;
    if requested == owned.floor() {
        return Ok(owned);
    }
    if !floating_lesser_equal(requested, owned) {
        return Err(EngineError::InsufficientShares { requested, owned });
    }
    Ok(requested.min(owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_order(id: &str, limit_prob: f64, order_amount: f64, created_time: i64) -> LimitOrder {
        LimitOrder::new(id, "maker", Outcome::No, limit_prob, order_amount, created_time)
    }

    fn yes_order(id: &str, limit_prob: f64, order_amount: f64, created_time: i64) -> LimitOrder {
        LimitOrder::new(id, "maker", Outcome::Yes, limit_prob, order_amount, created_time)
    }

    /// Pool at 0.60.
    fn pool_at_sixty() -> CpmmState {
        CpmmState::new(100.0, 150.0, 0.5)
    }

    #[test]
    fn test_market_order_against_empty_book_uses_pool() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::default();
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 10.0),
            &state,
            &[],
            &schedule,
        )
        .unwrap();
        let purchase = state.purchase(10.0, Outcome::Yes, &schedule).unwrap();
        assert!(result.is_filled);
        assert_eq!(result.fills.len(), 1);
        assert!(result.fills[0].is_pool_fill());
        assert_eq!(result.shares, purchase.shares);
        assert_eq!(result.state, purchase.state);
        assert_eq!(result.fees, purchase.fees);
        assert!(result.prob_after > result.prob_before);
    }

    #[test]
    fn test_price_priority_fills_best_order_first() {
        let state = pool_at_sixty();
        let book = vec![
            no_order("worse", 0.55, 100.0, 1),
            no_order("best", 0.40, 100.0, 2),
        ];
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 50.0),
            &state,
            &book,
            &FeeSchedule::default(),
        )
        .unwrap();

        assert_eq!(result.maker_fills.len(), 1);
        assert_eq!(result.maker_fills[0].order_id, "best");
        assert!((result.shares - 125.0).abs() < 1e-9);
        assert!((result.maker_fills[0].amount - 75.0).abs() < 1e-9);
        assert_eq!(result.state, state, "pool must be untouched");
        assert_eq!(result.fees, Fees::ZERO);
        assert!(result.is_filled);
    }

    #[test]
    fn test_exhausted_order_moves_to_next_price() {
        let state = pool_at_sixty();
        let book = vec![
            no_order("a", 0.40, 60.0, 1),
            no_order("b", 0.55, 100.0, 2),
        ];
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 60.0),
            &state,
            &book,
            &FeeSchedule::default(),
        )
        .unwrap();

        // "a" can absorb 60 / 0.6 = 100 shares, costing the taker 40.
        assert_eq!(result.maker_fills.len(), 2);
        assert!((result.maker_fills[0].shares - 100.0).abs() < 1e-9);
        assert!((result.fills[0].amount - 40.0).abs() < 1e-9);
        assert_eq!(result.maker_fills[1].order_id, "b");
        assert!((result.fills[1].amount - 20.0).abs() < 1e-9);
        assert_eq!(result.state, state);
    }

    #[test]
    fn test_time_priority_breaks_ties() {
        let state = pool_at_sixty();
        let book = vec![
            no_order("late", 0.50, 100.0, 20),
            no_order("early", 0.50, 100.0, 10),
        ];
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 10.0),
            &state,
            &book,
            &FeeSchedule::zero(),
        )
        .unwrap();
        assert_eq!(result.maker_fills[0].order_id, "early");
    }

    #[test]
    fn test_same_side_and_closed_orders_ignored() {
        let state = pool_at_sixty();
        let mut filled = no_order("filled", 0.40, 10.0, 1);
        filled.apply_fill(10.0, 16.0);
        let mut cancelled = no_order("cancelled", 0.40, 10.0, 2);
        cancelled.is_cancelled = true;
        let book = vec![filled, cancelled, yes_order("same-side", 0.40, 10.0, 3)];

        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 5.0),
            &state,
            &book,
            &FeeSchedule::zero(),
        )
        .unwrap();
        assert!(result.maker_fills.is_empty());
        assert!(result.touched_pool());
    }

    #[test]
    fn test_pool_fills_until_order_price_then_order() {
        // Pool at 0.5, a NO order at 0.6 only becomes better once the pool
        // has been pushed to 0.6.
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let book = vec![no_order("n", 0.60, 1000.0, 1)];
        let schedule = FeeSchedule::zero();
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, 100.0),
            &state,
            &book,
            &schedule,
        )
        .unwrap();

        assert_eq!(result.fills.len(), 2);
        assert!(result.fills[0].is_pool_fill());
        assert!((result.prob_after - 0.6).abs() < 1e-9);
        let pool_amount = state
            .amount_to_probability(0.6, Outcome::Yes, &schedule)
            .unwrap();
        assert!((result.fills[0].amount - pool_amount).abs() < 1e-9);
        assert!((result.fills[1].amount - (100.0 - pool_amount)).abs() < 1e-9);
        assert!(result.is_filled);
    }

    #[test]
    fn test_no_taker_matches_yes_orders_descending() {
        let state = CpmmState::new(150.0, 100.0, 0.5); // prob 0.4
        let book = vec![
            yes_order("low", 0.45, 100.0, 1),
            yes_order("high", 0.55, 100.0, 2),
        ];
        let result = match_order(
            &TradeRequest::market(Outcome::No, 10.0),
            &state,
            &book,
            &FeeSchedule::zero(),
        )
        .unwrap();
        // NO taker pays 1 - 0.55 = 0.45 per share at the best order.
        assert_eq!(result.maker_fills[0].order_id, "high");
        assert!((result.shares - 10.0 / 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_limit_order_stops_at_limit() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::zero();
        let result = match_order(
            &TradeRequest::limit(Outcome::Yes, 1000.0, 0.6),
            &state,
            &[],
            &schedule,
        )
        .unwrap();
        assert!(!result.is_filled);
        assert!((result.prob_after - 0.6).abs() < 1e-9);
        assert!((result.amount - 22.4745).abs() < 1e-3);
        assert!((result.unfilled_amount() - (1000.0 - result.amount)).abs() < 1e-9);
    }

    #[test]
    fn test_limit_order_already_past_limit_rests_entirely() {
        let state = pool_at_sixty();
        let result = match_order(
            &TradeRequest::limit(Outcome::Yes, 50.0, 0.5),
            &state,
            &[no_order("n", 0.55, 100.0, 1)],
            &FeeSchedule::default(),
        )
        .unwrap();
        assert!(result.fills.is_empty());
        assert_eq!(result.amount, 0.0);
        assert_eq!(result.unfilled_amount(), 50.0);
        assert_eq!(result.state, state);
    }

    #[test]
    fn test_limit_order_matches_book_below_limit() {
        let state = pool_at_sixty();
        let result = match_order(
            &TradeRequest::limit(Outcome::Yes, 10.0, 0.5),
            &state,
            &[no_order("n", 0.45, 100.0, 1)],
            &FeeSchedule::default(),
        )
        .unwrap();
        assert!(result.is_filled);
        assert_eq!(result.maker_fills.len(), 1);
        assert!((result.shares - 10.0 / 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_match_rejects_invalid_inputs() {
        let state = pool_at_sixty();
        let schedule = FeeSchedule::default();
        assert_eq!(
            match_order(&TradeRequest::market(Outcome::Yes, 0.0), &state, &[], &schedule),
            Err(EngineError::InvalidAmount(0.0))
        );
        assert_eq!(
            match_order(&TradeRequest::limit(Outcome::Yes, 5.0, 0.0), &state, &[], &schedule),
            Err(EngineError::OutOfRange(0.0))
        );
        assert_eq!(
            match_order(&TradeRequest::limit(Outcome::No, 5.0, 1.0), &state, &[], &schedule),
            Err(EngineError::OutOfRange(1.0))
        );
        let broken = CpmmState::new(-1.0, 100.0, 0.5);
        assert!(matches!(
            match_order(&TradeRequest::market(Outcome::Yes, 5.0), &broken, &[], &schedule),
            Err(EngineError::DegenerateMarket(_))
        ));
    }

    #[test]
    fn test_sale_without_fees_returns_bet_amount() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::zero();
        let bought = match_order(
            &TradeRequest::market(Outcome::Yes, 10.0),
            &state,
            &[],
            &schedule,
        )
        .unwrap();
        let sale = calculate_sale(&bought.state, bought.shares, Outcome::Yes, &[], &schedule).unwrap();
        assert!((sale.sale_value - 10.0).abs() < 1e-6, "sale {}", sale.sale_value);
        assert!((sale.prob_after - 0.5).abs() < 1e-9);
        assert!(sale.fills.iter().all(|f| f.is_sale && f.shares < 0.0));
    }

    #[test]
    fn test_round_trip_with_fees_loses_value() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::default();
        let bought = match_order(
            &TradeRequest::market(Outcome::No, 25.0),
            &state,
            &[],
            &schedule,
        )
        .unwrap();
        let sale = calculate_sale(&bought.state, bought.shares, Outcome::No, &[], &schedule).unwrap();
        assert!(sale.sale_value < 25.0);
        assert!(sale.sale_value > 0.0);
    }

    #[test]
    fn test_sale_matches_resting_orders() {
        // Selling YES means buying NO; a resting YES order at 0.7 gives the
        // NO buyer a 0.3 price, better than the pool's 0.5.
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let book = vec![yes_order("y", 0.70, 1000.0, 1)];
        let sale = calculate_sale(&state, 10.0, Outcome::Yes, &book, &FeeSchedule::default()).unwrap();
        assert!((sale.sale_value - 7.0).abs() < 1e-6, "sale {}", sale.sale_value);
        assert_eq!(sale.state, state);
        assert_eq!(sale.maker_fills.len(), 1);
    }

    #[test]
    fn test_sale_rejects_non_positive_shares() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        assert_eq!(
            calculate_sale(&state, 0.0, Outcome::Yes, &[], &FeeSchedule::default()),
            Err(EngineError::InvalidAmount(0.0))
        );
    }

    #[test]
    fn test_sale_with_flat_fee_sells_full_quantity() {
        // NO at 0.05: buying YES back costs more than 1 per share once the
        // flat fee is added.
        let state = CpmmState::new(100.0, 1900.0, 0.5);
        let schedule = FeeSchedule::new(0.05, 0.01, 0.04, 0.02);
        let sale = calculate_sale(&state, 50.0, Outcome::No, &[], &schedule).unwrap();

        assert!((sale.shares - 50.0).abs() < 1e-6, "sold {}", sale.shares);
        let fill_shares: f64 = sale.fills.iter().map(|f| f.shares).sum();
        assert!((fill_shares + sale.shares).abs() < 1e-9);
        let redeemed: f64 = sale.fills.iter().map(|f| -f.amount).sum();
        assert!((sale.sale_value - redeemed).abs() < 1e-9);
        assert!(sale.sale_value < 0.0);
    }

    #[test]
    fn test_sale_rejects_fees_consuming_whole_bet() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::new(0.5, 0.2, 0.2, 0.2);
        let err = calculate_sale(&state, 10.0, Outcome::Yes, &[], &schedule).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnfillableSale { requested, .. } if requested == 10.0
        ));
    }

    #[test]
    fn test_book_skips_orders_with_limit_on_boundary() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::default();
        let book = vec![
            no_order("zero", 0.0, 50.0, 1),
            no_order("one", 1.0, 50.0, 2),
        ];
        let request = TradeRequest::market(Outcome::Yes, 10.0);
        let with_book = match_order(&request, &state, &book, &schedule).unwrap();
        let pool_only = match_order(&request, &state, &[], &schedule).unwrap();

        assert!(with_book.maker_fills.is_empty());
        assert!(with_book.shares.is_finite());
        assert_eq!(with_book.shares, pool_only.shares);
        assert_eq!(with_book.state, pool_only.state);
    }

    #[test]
    fn test_amount_to_buy_shares_inverts_match() {
        let state = CpmmState::new(100.0, 100.0, 0.5);
        let schedule = FeeSchedule::default();
        let amount = amount_to_buy_shares(&state, 30.0, Outcome::Yes, &[], &schedule).unwrap();
        let result = match_order(
            &TradeRequest::market(Outcome::Yes, amount),
            &state,
            &[],
            &schedule,
        )
        .unwrap();
        assert!((result.shares - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_sell_all_eliminates_dust() {
        assert_eq!(resolve_sell_quantity(7.0, 7.3).unwrap(), 7.3);
        assert_eq!(resolve_sell_quantity(5.0, 7.3).unwrap(), 5.0);
        assert_eq!(
            resolve_sell_quantity(8.0, 7.3),
            Err(EngineError::InsufficientShares {
                requested: 8.0,
                owned: 7.3
            })
        );
        assert_eq!(
            resolve_sell_quantity(0.0, 7.3),
            Err(EngineError::InvalidAmount(0.0))
        );
    }
}

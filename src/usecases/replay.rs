//! Replay - JSON Command Driver for the Executor
//!
//! Each line of a replay script is one `ReplayCommand`, tagged by
//! `"action"`. Commands run in order against a shared executor and each
//! produces one JSON result line, so a script doubles as an audit of how
//! a market evolved.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::{Outcome, RangeOrder, TradeRequest};
use crate::ports::market_store::MarketStore;
use crate::usecases::bet_preview::{format_mapped_value, BetStats};
use crate::usecases::trade_executor::{ExecutorError, TradeExecutor};

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayCommand {
    Quote {
        market: String,
    },
    Preview {
        market: String,
        outcome: Outcome,
        amount: f64,
        #[serde(default)]
        limit_prob: Option<f64>,
    },
    Bet {
        market: String,
        user: String,
        outcome: Outcome,
        amount: f64,
        #[serde(default)]
        limit_prob: Option<f64>,
    },
    PreviewRange {
        market: String,
        amount: f64,
        #[serde(default)]
        low_limit_prob: Option<f64>,
        #[serde(default)]
        high_limit_prob: Option<f64>,
    },
    Range {
        market: String,
        user: String,
        amount: f64,
        #[serde(default)]
        low_limit_prob: Option<f64>,
        #[serde(default)]
        high_limit_prob: Option<f64>,
    },
    Sell {
        market: String,
        user: String,
        outcome: Outcome,
        shares: f64,
        /// Seller's balance; defaults to `shares`.
        #[serde(default)]
        owned: Option<f64>,
    },
    AddLiquidity {
        market: String,
        user: String,
        amount: f64,
    },
}

impl ReplayCommand {
    /// Parse one script line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Option<Result<Self, serde_json::Error>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        Some(serde_json::from_str(trimmed))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Quote { .. } => "quote",
            Self::Preview { .. } => "preview",
            Self::Bet { .. } => "bet",
            Self::PreviewRange { .. } => "preview_range",
            Self::Range { .. } => "range",
            Self::Sell { .. } => "sell",
            Self::AddLiquidity { .. } => "add_liquidity",
        }
    }
}

/// Runs replay commands against an executor.
pub struct ReplayRunner<S: MarketStore> {
    executor: TradeExecutor<S>,
}

impl<S: MarketStore> ReplayRunner<S> {
    pub fn new(executor: TradeExecutor<S>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &TradeExecutor<S> {
        &self.executor
    }

    /// Execute one command, wrapping the outcome as
    /// `{"action", "ok": true, "result"}` or `{"action", "ok": false, "error"}`.
    pub async fn run(&self, command: &ReplayCommand) -> Value {
        debug!(action = command.action(), "Replaying command");
        match self.dispatch(command).await {
            Ok(result) => json!({ "action": command.action(), "ok": true, "result": result }),
            Err(e) => {
                warn!(action = command.action(), error = %e, "Command rejected");
                json!({ "action": command.action(), "ok": false, "error": e.to_string() })
            }
        }
    }

    async fn dispatch(&self, command: &ReplayCommand) -> Result<Value, ExecutorError> {
        let executor = &self.executor;
        let value = match command {
            ReplayCommand::Quote { market } => {
                let quote = executor.quote(market).await?;
                let display = format_mapped_value(&quote.kind, quote.probability);
                json!({ "quote": quote, "display": display })
            }
            ReplayCommand::Preview {
                market,
                outcome,
                amount,
                limit_prob,
            } => {
                let request = TradeRequest {
                    outcome: *outcome,
                    amount: *amount,
                    limit_prob: *limit_prob,
                };
                let result = executor.preview_bet(market, &request).await?;
                let stats = BetStats::from_trade(&result);
                let (payout, ret, fees) = (
                    stats.payout_display(),
                    stats.return_display(),
                    stats.fees_display(),
                );
                json!({
                    "trade": result,
                    "stats": stats,
                    "payout": payout,
                    "return": ret,
                    "fees": fees,
                })
            }
            ReplayCommand::Bet {
                market,
                user,
                outcome,
                amount,
                limit_prob,
            } => {
                let request = TradeRequest {
                    outcome: *outcome,
                    amount: *amount,
                    limit_prob: *limit_prob,
                };
                to_value(&executor.place_bet(market, user, &request).await?)
            }
            ReplayCommand::PreviewRange {
                market,
                amount,
                low_limit_prob,
                high_limit_prob,
            } => {
                let range = RangeOrder::new(*amount, *low_limit_prob, *high_limit_prob);
                let preview = executor.preview_range(market, &range).await?;
                let prob_now = executor.quote(market).await?.probability;
                let legs: Vec<BetStats> = [preview.split.yes, preview.split.no]
                    .iter()
                    .flatten()
                    .filter_map(|leg| BetStats::at_limit(leg, prob_now))
                    .collect();
                let profit = preview.split.profit_if_both_filled();
                json!({
                    "preview": preview,
                    "profit_if_both_filled": profit,
                    "legs": legs,
                })
            }
            ReplayCommand::Range {
                market,
                user,
                amount,
                low_limit_prob,
                high_limit_prob,
            } => {
                let range = RangeOrder::new(*amount, *low_limit_prob, *high_limit_prob);
                to_value(&executor.place_range_order(market, user, &range).await?)
            }
            ReplayCommand::Sell {
                market,
                user,
                outcome,
                shares,
                owned,
            } => {
                let owned = owned.unwrap_or(*shares);
                to_value(
                    &executor
                        .sell_shares(market, user, *outcome, *shares, owned)
                        .await?,
                )
            }
            ReplayCommand::AddLiquidity {
                market,
                user,
                amount,
            } => to_value(&executor.add_liquidity(market, user, *amount).await?),
        };
        Ok(value)
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

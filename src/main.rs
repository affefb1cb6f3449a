//! CPMM Engine - Replay Entry Point
//!
//! Seeds the configured markets into an in-memory store and replays a
//! script of JSON commands against them, one result line per command.
//!
//! Usage: `cpmm-replay [config.toml] [commands.jsonl | -]`
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Seed InMemoryMarketStore from `[[markets]]`
//! 4. Attach the JSONL trade log (if enabled)
//! 5. Replay commands from the script file, or stdin when absent / `-`
//! 6. Print final quotes for every market

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use cpmm_engine::adapters::persistence::{InMemoryMarketStore, TradeLogger};
use cpmm_engine::config;
use cpmm_engine::ports::market_store::MarketStore;
use cpmm_engine::usecases::{ReplayCommand, ReplayRunner, TradeExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());
    let script_path = args.next();

    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.engine.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.engine.name,
        version = env!("CARGO_PKG_VERSION"),
        markets = config.markets.len(),
        "Starting CPMM engine replay"
    );

    // ── 3. Seed the market store ────────────────────────────
    let store = Arc::new(InMemoryMarketStore::from_config(&config.markets).await);

    // ── 4. Wire the executor (+ optional trade log) ─────────
    let mut executor = TradeExecutor::new(
        Arc::clone(&store),
        config.fees.schedule(),
        &config.executor,
    );
    if config.persistence.trade_log_enabled {
        let logger = TradeLogger::new(&config.persistence.data_dir)
            .await
            .context("Failed to initialize trade log")?;
        executor = executor.with_trade_log(Arc::new(logger));
    }
    let runner = ReplayRunner::new(executor);

    // ── 5. Replay the command script ────────────────────────
    let replayed = match script_path.as_deref() {
        None | Some("-") => replay(&runner, BufReader::new(tokio::io::stdin())).await?,
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open command script {path}"))?;
            replay(&runner, BufReader::new(file)).await?
        }
    };
    info!(commands = replayed, "Replay finished");

    // ── 6. Final state ──────────────────────────────────────
    let mut stdout = tokio::io::stdout();
    for market_id in store.market_ids().await {
        match runner.executor().quote(&market_id).await {
            Ok(quote) => {
                let line = serde_json::json!({ "action": "final", "ok": true, "result": quote });
                stdout.write_all(format!("{line}\n").as_bytes()).await?;
            }
            Err(e) => warn!(market = %market_id, error = %e, "Failed to quote market"),
        }
    }
    stdout.flush().await?;

    if !store.is_healthy().await {
        error!("Market store reported unhealthy at shutdown");
    }
    Ok(())
}

/// Run every command in `reader`, writing one JSON result line each.
/// Malformed lines are reported and skipped.
async fn replay<S, R>(runner: &ReplayRunner<S>, reader: R) -> Result<usize>
where
    S: MarketStore,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stdout = tokio::io::stdout();
    let mut count = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        line_no += 1;
        let output = match ReplayCommand::parse_line(&line) {
            None => continue,
            Some(Ok(command)) => {
                count += 1;
                runner.run(&command).await
            }
            Some(Err(e)) => {
                warn!(line = line_no, error = %e, "Malformed command");
                serde_json::json!({ "line": line_no, "ok": false, "error": e.to_string() })
            }
        };
        stdout.write_all(format!("{output}\n").as_bytes()).await?;
    }

    stdout.flush().await?;
    Ok(count)
}

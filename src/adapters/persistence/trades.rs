//! Trade Logger - Append-only JSONL Trade Records
//!
//! Persists trade records to daily JSONL files in the format
//! `trades/YYYY-MM-DD.jsonl`. Each line is a self-contained JSON
//! record for easy parsing, streaming, and crash recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::ports::trade_log::{TradeLog, TradeRecord};

/// Append-only JSONL trade logger with daily file rotation.
///
/// Trade files are named `trades/YYYY-MM-DD.jsonl` after the record's
/// own timestamp, so replays land in the day they describe.
pub struct TradeLogger {
    /// Base directory for trade files.
    trades_dir: PathBuf,
}

impl TradeLogger {
    /// Create a new trade logger in the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let trades_dir = Path::new(data_dir).join("trades");

        fs::create_dir_all(&trades_dir)
            .await
            .context("Failed to create trades directory")?;

        Ok(Self { trades_dir })
    }

    fn file_for(&self, timestamp_ms: i64) -> PathBuf {
        let date = Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d")
            .to_string();
        self.trades_dir.join(format!("{date}.jsonl"))
    }
}

#[async_trait]
impl TradeLog for TradeLogger {
    /// Append a trade record to its day's JSONL file.
    #[instrument(skip(self, record), fields(trade_id = %record.id))]
    async fn append(&self, record: &TradeRecord) -> Result<()> {
        let path = self.file_for(record.timestamp_ms);

        let mut json =
            serde_json::to_string(record).context("Failed to serialize trade record")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open trade log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write trade record")?;

        file.flush().await.context("Failed to flush trade log")?;

        Ok(())
    }

    /// Load all trade records from all daily files.
    #[instrument(skip(self))]
    async fn load_all(&self) -> Result<Vec<TradeRecord>> {
        let mut trades = Vec::new();
        let mut entries = fs::read_dir(&self.trades_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                let content = fs::read_to_string(&path).await?;
                for line in content.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<TradeRecord>(line) {
                        Ok(record) => trades.push(record),
                        Err(e) => {
                            warn!(
                                file = %path.display(),
                                error = %e,
                                "Skipping malformed trade record"
                            );
                        }
                    }
                }
            }
        }

        trades.sort_by_key(|t| t.timestamp_ms);
        info!(count = trades.len(), "Loaded trade records");
        Ok(trades)
    }

    /// Check if the trades directory is writable.
    async fn is_healthy(&self) -> bool {
        let test_path = self.trades_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }
}

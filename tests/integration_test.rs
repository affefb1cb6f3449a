//! Integration Tests - End-to-end Executor Testing
//!
//! Tests the interaction between the trade executor, the store and log
//! ports, and both mock and real adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use mockall::mock;

use cpmm_engine::adapters::persistence::{InMemoryMarketStore, TradeLogger};
use cpmm_engine::config::ExecutorConfig;
use cpmm_engine::domain::{
    CpmmState, FeeSchedule, LimitOrder, MarketKind, Outcome, RangeOrder, TradeRequest,
};
use cpmm_engine::ports::market_store::{MarketSnapshot, MarketStore, StoreError, TradeCommit};
use cpmm_engine::ports::trade_log::{TradeKind, TradeLog, TradeRecord};
use cpmm_engine::usecases::{ExecutorError, TradeExecutor};

// ---- Mock Definitions ----

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl MarketStore for Store {
        async fn load(&self, market_id: &str) -> Result<MarketSnapshot, StoreError>;
        async fn commit(&self, commit: &TradeCommit) -> Result<u64, StoreError>;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Log {}

    #[async_trait::async_trait]
    impl TradeLog for Log {
        async fn append(&self, record: &TradeRecord) -> anyhow::Result<()>;
        async fn load_all(&self) -> anyhow::Result<Vec<TradeRecord>>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Helpers ----

fn snapshot(version: u64) -> MarketSnapshot {
    MarketSnapshot {
        market_id: "m".to_string(),
        kind: MarketKind::Binary,
        state: CpmmState::new(100.0, 100.0, 0.5),
        orders: Vec::new(),
        version,
    }
}

fn fast_retries(max_retries: u32) -> ExecutorConfig {
    ExecutorConfig {
        max_retries,
        retry_backoff_ms: 0,
    }
}

fn conflict(expected: u64) -> StoreError {
    StoreError::Conflict {
        market_id: "m".to_string(),
        expected,
        actual: expected + 1,
    }
}

async fn seeded_store() -> Arc<InMemoryMarketStore> {
    let store = InMemoryMarketStore::new();
    store
        .insert_market("m", MarketKind::Binary, CpmmState::new(100.0, 100.0, 0.5))
        .await;
    Arc::new(store)
}

// ---- Optimistic retry (mock store) ----

#[tokio::test]
async fn test_conflict_is_retried_with_fresh_snapshot() {
    let mut store = MockStore::new();
    let loads = Arc::new(AtomicU32::new(0));
    let commits = Arc::new(AtomicU32::new(0));

    let load_count = Arc::clone(&loads);
    store.expect_load().times(2).returning(move |_| {
        let n = load_count.fetch_add(1, Ordering::SeqCst);
        Ok(snapshot(u64::from(n)))
    });

    let commit_count = Arc::clone(&commits);
    store.expect_commit().times(2).returning(move |commit| {
        if commit_count.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(conflict(commit.expected_version))
        } else {
            Ok(commit.expected_version + 1)
        }
    });

    let executor = TradeExecutor::new(Arc::new(store), FeeSchedule::zero(), &fast_retries(3));
    let executed = executor
        .place_bet("m", "alice", &TradeRequest::market(Outcome::Yes, 10.0))
        .await
        .unwrap();

    assert_eq!(executed.version, 2);
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(commits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let mut store = MockStore::new();
    store.expect_load().times(3).returning(|_| Ok(snapshot(0)));
    store
        .expect_commit()
        .times(3)
        .returning(|commit| Err(conflict(commit.expected_version)));

    let executor = TradeExecutor::new(Arc::new(store), FeeSchedule::zero(), &fast_retries(3));
    let err = executor
        .sell_shares("m", "alice", Outcome::No, 5.0, 5.0)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExecutorError::RetriesExhausted { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_backend_error_is_not_retried() {
    let mut store = MockStore::new();
    store.expect_load().times(1).returning(|_| Ok(snapshot(0)));
    store
        .expect_commit()
        .times(1)
        .returning(|_| Err(StoreError::Backend(anyhow::anyhow!("disk full"))));

    let executor = TradeExecutor::new(Arc::new(store), FeeSchedule::zero(), &fast_retries(5));
    let err = executor
        .add_liquidity("m", "lp", 10.0)
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::Store(StoreError::Backend(_))));
}

#[tokio::test]
async fn test_engine_rejection_skips_commit() {
    let mut store = MockStore::new();
    store.expect_load().returning(|_| Ok(snapshot(0)));
    store.expect_commit().never();

    let executor = TradeExecutor::new(Arc::new(store), FeeSchedule::zero(), &fast_retries(3));
    let range = RangeOrder::new(100.0, Some(0.6), Some(0.5));
    assert!(executor
        .place_range_order("m", "alice", &range)
        .await
        .is_err());
    assert!(executor
        .sell_shares("m", "alice", Outcome::Yes, 0.0, 3.0)
        .await
        .is_err());
}

// ---- Trade log ----

#[tokio::test]
async fn test_trade_log_receives_committed_trade() {
    let mut log = MockLog::new();
    log.expect_append()
        .times(1)
        .withf(|record| record.kind == TradeKind::Buy && record.version == 1)
        .returning(|_| Ok(()));

    let executor = TradeExecutor::new(seeded_store().await, FeeSchedule::default(), &fast_retries(3))
        .with_trade_log(Arc::new(log));
    executor
        .place_bet("m", "alice", &TradeRequest::market(Outcome::Yes, 10.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_trade_log_failure_does_not_undo_trade() {
    let mut log = MockLog::new();
    log.expect_append()
        .returning(|_| Err(anyhow::anyhow!("log unavailable")));

    let executor = TradeExecutor::new(seeded_store().await, FeeSchedule::default(), &fast_retries(3))
        .with_trade_log(Arc::new(log));
    let executed = executor
        .place_bet("m", "alice", &TradeRequest::market(Outcome::No, 10.0))
        .await
        .unwrap();

    assert_eq!(executor.quote("m").await.unwrap().version, executed.version);
}

#[tokio::test]
async fn test_jsonl_trade_logger_round_trip() {
    let dir = std::env::temp_dir().join(format!("cpmm-engine-test-{}", uuid::Uuid::new_v4()));
    let logger = Arc::new(TradeLogger::new(dir.to_str().unwrap()).await.unwrap());
    assert!(logger.is_healthy().await);

    let executor = TradeExecutor::new(seeded_store().await, FeeSchedule::default(), &fast_retries(3))
        .with_trade_log(Arc::clone(&logger) as Arc<dyn TradeLog>);
    executor
        .place_bet("m", "alice", &TradeRequest::market(Outcome::Yes, 10.0))
        .await
        .unwrap();
    executor.add_liquidity("m", "lp", 25.0).await.unwrap();

    let records = logger.load_all().await.unwrap();
    assert_eq!(records.len(), 2);
    let kinds: Vec<TradeKind> = records.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&TradeKind::Buy));
    assert!(kinds.contains(&TradeKind::Liquidity));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

// ---- In-memory end-to-end ----

#[tokio::test]
async fn test_book_fills_before_pool() {
    let store = seeded_store().await;
    store
        .add_order("m", LimitOrder::new("cheap", "maker", Outcome::No, 0.40, 60.0, 1))
        .await
        .unwrap();
    store
        .add_order("m", LimitOrder::new("mid", "maker", Outcome::No, 0.55, 60.0, 2))
        .await
        .unwrap();

    let executor = TradeExecutor::new(Arc::clone(&store), FeeSchedule::zero(), &fast_retries(3));
    let executed = executor
        .place_bet("m", "taker", &TradeRequest::market(Outcome::Yes, 20.0))
        .await
        .unwrap();

    let fills = &executed.result.maker_fills;
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].order_id, "cheap");
    assert!(!executed.result.touched_pool());

    let after = store.load("m").await.unwrap();
    assert_eq!(after.state, CpmmState::new(100.0, 100.0, 0.5));
    let cheap = after.orders.iter().find(|o| o.id == "cheap").unwrap();
    assert!((cheap.shares - 50.0).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bets_all_commit() {
    let store = seeded_store().await;
    let executor = Arc::new(TradeExecutor::new(
        Arc::clone(&store),
        FeeSchedule::zero(),
        &fast_retries(100),
    ));

    let mut handles = Vec::new();
    for i in 0..20 {
        let executor = Arc::clone(&executor);
        handles.push(tokio::spawn(async move {
            executor
                .place_bet(
                    "m",
                    &format!("user-{i}"),
                    &TradeRequest::market(Outcome::Yes, 1.0),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Without fees, a sequence of YES buys lands on the same curve point
    // regardless of interleaving.
    let after = store.load("m").await.unwrap();
    assert_eq!(after.version, 20);
    assert!((after.state.pool.no - 120.0).abs() < 1e-9);
    assert!((after.state.pool.yes - 10_000.0 / 120.0).abs() < 1e-6);
}

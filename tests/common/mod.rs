//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Response, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use saldo_ledger::api;
use saldo_ledger::{LedgerEngine, LedgerStore, MemoryLedgerStore, StorageError, Transaction};

/// Engine over a fresh in-memory store
pub fn memory_engine() -> (Arc<MemoryLedgerStore>, Arc<LedgerEngine>) {
    let store = Arc::new(MemoryLedgerStore::new());
    let engine = Arc::new(LedgerEngine::new(store.clone()));
    (store, engine)
}

/// Engine over a store with injectable failures
pub fn flaky_engine() -> (Arc<FlakyStore>, Arc<LedgerEngine>) {
    let store = Arc::new(FlakyStore::default());
    let engine = Arc::new(LedgerEngine::new(store.clone()));
    (store, engine)
}

/// Engine whose every append loses the race for the next id
pub fn contended_engine() -> (Arc<AlwaysConflictStore>, Arc<LedgerEngine>) {
    let store = Arc::new(AlwaysConflictStore::default());
    let engine = Arc::new(LedgerEngine::new(store.clone()));
    (store, engine)
}

/// Router with state, as served by the binary (minus tracing/CORS layers)
pub fn app(engine: Arc<LedgerEngine>) -> Router {
    api::create_router().with_state(engine)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Memory store that fails on demand.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryLedgerStore,
    /// Appends to reject before touching the rows
    fail_appends: AtomicUsize,
    /// Appends to commit but report as failed (lost acknowledgement)
    lose_acks: AtomicUsize,
    /// Scans to fail
    fail_scans: AtomicUsize,
}

impl FlakyStore {
    pub fn fail_next_appends(&self, n: usize) {
        self.fail_appends.store(n, Ordering::SeqCst);
    }

    pub fn lose_next_acks(&self, n: usize) {
        self.lose_acks.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_scans(&self, n: usize) {
        self.fail_scans.store(n, Ordering::SeqCst);
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LedgerStore for FlakyStore {
    async fn append_row(&self, record: Transaction) -> Result<Transaction, StorageError> {
        if Self::take(&self.fail_appends) {
            return Err(StorageError::Unavailable("injected append failure".to_string()));
        }
        let committed = self.inner.append_row(record).await?;
        if Self::take(&self.lose_acks) {
            return Err(StorageError::Unavailable("injected lost ack".to_string()));
        }
        Ok(committed)
    }

    async fn scan_all(&self) -> Result<Vec<Transaction>, StorageError> {
        if Self::take(&self.fail_scans) {
            return Err(StorageError::Unavailable("injected scan failure".to_string()));
        }
        self.inner.scan_all().await
    }

    async fn scan_after(&self, after_id: i64, limit: i64) -> Result<Vec<Transaction>, StorageError> {
        self.inner.scan_after(after_id, limit).await
    }

    async fn read_last(&self) -> Result<Option<Transaction>, StorageError> {
        self.inner.read_last().await
    }

    async fn read_one(&self, id: i64) -> Result<Option<Transaction>, StorageError> {
        self.inner.read_one(id).await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Store where another writer always got there first.
#[derive(Debug, Default)]
pub struct AlwaysConflictStore {
    inner: MemoryLedgerStore,
    /// Append attempts seen so far
    pub attempts: AtomicUsize,
}

#[async_trait]
impl LedgerStore for AlwaysConflictStore {
    async fn append_row(&self, record: Transaction) -> Result<Transaction, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Conflict { id: record.id })
    }

    async fn scan_all(&self) -> Result<Vec<Transaction>, StorageError> {
        self.inner.scan_all().await
    }

    async fn scan_after(&self, after_id: i64, limit: i64) -> Result<Vec<Transaction>, StorageError> {
        self.inner.scan_after(after_id, limit).await
    }

    async fn read_last(&self) -> Result<Option<Transaction>, StorageError> {
        self.inner.read_last().await
    }

    async fn read_one(&self, id: i64) -> Result<Option<Transaction>, StorageError> {
        self.inner.read_one(id).await
    }

    fn name(&self) -> &'static str {
        "always-conflict"
    }
}

/// Setup test database - ensure schema and start from an empty ledger
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    saldo_ledger::db::create_schema(&pool)
        .await
        .expect("Failed to create schema");

    sqlx::query("TRUNCATE TABLE transactions")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

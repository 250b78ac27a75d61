//! PostgreSQL ledger store
//!
//! Rows live in the `transactions` table. The primary key on `id` is what
//! makes concurrent writers from different processes safe: a second insert of
//! the same id fails with a unique violation, reported as `Conflict`.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::{Transaction, DATE_FORMAT};

use super::{LedgerStore, StorageError};

type Row = (i64, String, String, Option<Decimal>, Option<Decimal>, Decimal);

/// Ledger store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a new PgLedgerStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode((id, date, description, debit, credit, balance): Row) -> Result<Transaction, StorageError> {
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| StorageError::Corrupt {
        id,
        reason: format!("bad date '{}': {}", date, e),
    })?;

    // NUMERIC(28, 8) pads every value to eight places
    Ok(Transaction {
        id,
        date,
        description,
        debit: debit.map(|d| d.normalize()),
        credit: credit.map(|c| c.normalize()),
        balance: balance.normalize(),
    })
}

fn decode_all(rows: Vec<Row>) -> Result<Vec<Transaction>, StorageError> {
    rows.into_iter().map(decode).collect()
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn append_row(&self, record: Transaction) -> Result<Transaction, StorageError> {
        let row: Row = sqlx::query_as(
            r#"
            INSERT INTO transactions (id, date, description, debit, credit, balance)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, date, description, debit, credit, balance
            "#,
        )
        .bind(record.id)
        .bind(record.date.format(DATE_FORMAT).to_string())
        .bind(&record.description)
        .bind(record.debit)
        .bind(record.credit)
        .bind(record.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return StorageError::Conflict { id: record.id };
                }
                if db.is_check_violation() {
                    return StorageError::Rejected(db.message().to_string());
                }
            }
            StorageError::Database(e)
        })?;

        decode(row)
    }

    async fn scan_all(&self) -> Result<Vec<Transaction>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            r#"
            SELECT id, date, description, debit, credit, balance
            FROM transactions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn scan_after(&self, after_id: i64, limit: i64) -> Result<Vec<Transaction>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            r#"
            SELECT id, date, description, debit, credit, balance
            FROM transactions
            WHERE id > $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn read_last(&self) -> Result<Option<Transaction>, StorageError> {
        let row: Option<Row> = sqlx::query_as(
            r#"
            SELECT id, date, description, debit, credit, balance
            FROM transactions
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode).transpose()
    }

    async fn read_one(&self, id: i64) -> Result<Option<Transaction>, StorageError> {
        let row: Option<Row> = sqlx::query_as(
            r#"
            SELECT id, date, description, debit, credit, balance
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode).transpose()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

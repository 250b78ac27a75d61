//! API Routes
//!
//! HTTP endpoint definitions.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{CandidateEntry, Transaction, ValidationError};
use crate::error::AppError;
use crate::ledger::{LedgerEngine, LedgerError};

/// Shared router state
pub type AppState = Arc<LedgerEngine>;

/// Page size when only `after_id` is given
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Largest page a client may request
const MAX_PAGE_SIZE: i64 = 1000;

// =========================================================================
// Request/Response types
// =========================================================================

/// Monetary amount as sent by clients: a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(serde_json::Number),
    Text(String),
}

impl AmountField {
    fn to_decimal(&self) -> Result<Decimal, ValidationError> {
        let raw = match self {
            AmountField::Number(n) => n.to_string(),
            AmountField::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| ValidationError::InvalidAmount(raw))
    }
}

impl From<Decimal> for AmountField {
    fn from(value: Decimal) -> Self {
        AmountField::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Missing fields decode as empty and are rejected by validation
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub debit: Option<AmountField>,
    #[serde(default)]
    pub credit: Option<AmountField>,
}

impl CreateTransactionRequest {
    /// Decode amounts into the engine's candidate entry
    pub fn into_candidate(self) -> Result<CandidateEntry, ValidationError> {
        Ok(CandidateEntry {
            date: self.date,
            description: self.description,
            debit: self.debit.as_ref().map(AmountField::to_decimal).transpose()?,
            credit: self.credit.as_ref().map(AmountField::to_decimal).transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub after_id: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
    pub last_id: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub opening_balance: Decimal,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/:id", get(get_transaction))
        .route("/balance", get(get_balance))
}

// =========================================================================
// GET /transactions
// =========================================================================

/// List transactions in id order; paged when `after_id` or `limit` is given
async fn list_transactions(
    State(engine): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = match (query.after_id, query.limit) {
        (None, None) => engine.list_all().await?,
        (after_id, limit) => {
            let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
            engine.list_page(after_id, limit).await?
        }
    };

    Ok(Json(transactions))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Append a transaction
async fn create_transaction(
    State(engine): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let candidate = request
        .into_candidate()
        .map_err(LedgerError::from)?;
    let transaction = engine.append(candidate).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// =========================================================================
// GET /transactions/:id
// =========================================================================

async fn get_transaction(
    State(engine): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = engine
        .get(id)
        .await?
        .ok_or(AppError::TransactionNotFound(id))?;

    Ok(Json(transaction))
}

// =========================================================================
// GET /balance
// =========================================================================

async fn get_balance(State(engine): State<AppState>) -> Result<Json<BalanceResponse>, AppError> {
    let head = engine.head().await?;

    Ok(Json(BalanceResponse {
        balance: head.balance.value(),
        last_id: head.last_id,
        opening_balance: engine.opening_balance().value(),
    }))
}

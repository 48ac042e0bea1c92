//! Transaction persistence: append on trade, list for the audit endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::{TradeAction, Transaction};

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub price: Decimal,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

pub fn transaction_row_to_transaction(row: TransactionRow) -> Transaction {
    // The DB check constraint restricts `action` to buy/sell.
    let action = match row.action.as_str() {
        "sell" => TradeAction::Sell,
        _ => TradeAction::Buy,
    };
    Transaction {
        id: row.id,
        user_id: row.user_id,
        symbol: row.symbol,
        shares: row.shares,
        price: row.price,
        action,
        created_at: row.created_at,
    }
}

/// Append one trade record (call inside the trade's transaction).
pub async fn insert_transaction<'e>(
    exec: impl PgExecutor<'e>,
    record: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, symbol, shares, price, action, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.symbol)
    .bind(record.shares)
    .bind(record.price)
    .bind(record.action.as_str())
    .bind(record.created_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// List a user's trades, most recent first.
pub async fn list_transactions_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: usize,
) -> Result<Vec<TransactionRow>, sqlx::Error> {
    sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, symbol, shares, price, action, created_at \
         FROM transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await
}

//! Position persistence: lookup, upsert, delete.

use rust_decimal::Decimal;
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::Position;

#[derive(Debug, FromRow)]
pub struct PositionRow {
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub average_cost: Decimal,
}

pub fn position_row_to_position(row: PositionRow) -> Position {
    Position {
        user_id: row.user_id,
        symbol: row.symbol,
        shares: row.shares,
        average_cost: row.average_cost,
    }
}

pub async fn get_position(
    pool: &PgPool,
    user_id: Uuid,
    symbol: &str,
) -> Result<Option<PositionRow>, sqlx::Error> {
    sqlx::query_as::<_, PositionRow>(
        "SELECT user_id, symbol, shares, average_cost FROM positions \
         WHERE user_id = $1 AND symbol = $2",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

pub async fn list_positions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PositionRow>, sqlx::Error> {
    sqlx::query_as::<_, PositionRow>(
        "SELECT user_id, symbol, shares, average_cost FROM positions \
         WHERE user_id = $1 ORDER BY symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Upsert a position (insert or update on conflict).
pub async fn upsert_position<'e>(
    exec: impl PgExecutor<'e>,
    user_id: Uuid,
    symbol: &str,
    shares: i64,
    average_cost: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (user_id, symbol, shares, average_cost) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, symbol) DO UPDATE SET shares = $3, average_cost = $4",
    )
    .bind(user_id)
    .bind(symbol)
    .bind(shares)
    .bind(average_cost)
    .execute(exec)
    .await?;
    Ok(())
}

/// Delete a closed position.
pub async fn delete_position<'e>(
    exec: impl PgExecutor<'e>,
    user_id: Uuid,
    symbol: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM positions WHERE user_id = $1 AND symbol = $2")
        .bind(user_id)
        .bind(symbol)
        .execute(exec)
        .await?;
    Ok(())
}

//! User persistence: lookup, insert, and the version-guarded balance update.

use rust_decimal::Decimal;
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::User;

/// Row returned from DB (email is stored lowercase).
#[derive(FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub cash_balance: Decimal,
    pub version: i64,
}

pub fn user_row_to_user(row: UserRow) -> User {
    User {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        cash_balance: row.cash_balance,
        version: row.version,
    }
}

/// Get a user by email (lowercase). For login.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, cash_balance, version FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, cash_balance, version FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Insert a user. Email must already be lowercase.
pub async fn insert_user(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    password_hash: &str,
    cash_balance: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, cash_balance, version) \
         VALUES ($1, $2, $3, $4, 0)",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(cash_balance)
    .execute(pool)
    .await?;
    Ok(())
}

/// Set the balance iff the version still matches, bumping the version.
/// Returns false when another trade committed first.
pub async fn update_user_balance<'e>(
    exec: impl PgExecutor<'e>,
    user_id: Uuid,
    new_balance: Decimal,
    expected_version: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET cash_balance = $2, version = version + 1 \
         WHERE id = $1 AND version = $3",
    )
    .bind(user_id)
    .bind(new_balance)
    .bind(expected_version)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() == 1)
}

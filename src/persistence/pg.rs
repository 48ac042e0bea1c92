//! Postgres-backed [`LedgerStore`]. The trade commit is a single SQL
//! transaction; the version guard on the user row serializes trades per user.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{LedgerStore, PositionChange, StoreError, TradeCommit};
use super::{positions, transactions, users};
use crate::types::{Position, Transaction, User};

pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedger {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        starting_balance: Decimal,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        match users::insert_user(&self.pool, id, email, password_hash, starting_balance).await {
            Ok(()) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = users::get_user_by_email(&self.pool, email).await?;
        Ok(row.map(users::user_row_to_user))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let row = users::get_user_by_id(&self.pool, user_id).await?;
        Ok(row.map(users::user_row_to_user))
    }

    async fn get_position(
        &self,
        user_id: Uuid,
        symbol: &str,
    ) -> Result<Option<Position>, StoreError> {
        let row = positions::get_position(&self.pool, user_id, symbol).await?;
        Ok(row.map(positions::position_row_to_position))
    }

    async fn list_positions(&self, user_id: Uuid) -> Result<Vec<Position>, StoreError> {
        let rows = positions::list_positions_for_user(&self.pool, user_id).await?;
        Ok(rows.into_iter().map(positions::position_row_to_position).collect())
    }

    async fn commit_trade(&self, commit: TradeCommit) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = users::update_user_balance(
            &mut *tx,
            commit.user_id,
            commit.new_balance,
            commit.expected_version,
        )
        .await?;
        if !updated {
            tx.rollback().await?;
            return Err(StoreError::VersionConflict);
        }

        match &commit.position {
            PositionChange::Upsert {
                symbol,
                shares,
                average_cost,
            } => {
                positions::upsert_position(&mut *tx, commit.user_id, symbol, *shares, *average_cost)
                    .await?
            }
            PositionChange::Remove { symbol } => {
                positions::delete_position(&mut *tx, commit.user_id, symbol).await?
            }
        }

        transactions::insert_transaction(&mut *tx, &commit.record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = transactions::list_transactions_for_user(&self.pool, user_id, limit).await?;
        Ok(rows
            .into_iter()
            .map(transactions::transaction_row_to_transaction)
            .collect())
    }
}

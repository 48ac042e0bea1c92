//! In-memory [`LedgerStore`] with the same commit semantics as Postgres.
//! Used by integration tests and local runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LedgerStore, PositionChange, StoreError, TradeCommit};
use crate::types::{Position, Transaction, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    positions: HashMap<(Uuid, String), Position>,
    transactions: Vec<Transaction>,
}

#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        starting_balance: Decimal,
    ) -> Result<Uuid, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::EmailTaken);
        }
        let id = Uuid::new_v4();
        inner.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                cash_balance: starting_balance,
                version: 0,
            },
        );
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn get_position(
        &self,
        user_id: Uuid,
        symbol: &str,
    ) -> Result<Option<Position>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.positions.get(&(user_id, symbol.to_string())).cloned())
    }

    async fn list_positions(&self, user_id: Uuid) -> Result<Vec<Position>, StoreError> {
        let inner = self.inner.read().await;
        let mut positions: Vec<Position> = inner
            .positions
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(positions)
    }

    async fn commit_trade(&self, commit: TradeCommit) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        // A vanished user is a storage-level failure, not a retryable conflict.
        let user = inner
            .users
            .get_mut(&commit.user_id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        if user.version != commit.expected_version {
            return Err(StoreError::VersionConflict);
        }
        user.cash_balance = commit.new_balance;
        user.version += 1;

        match commit.position {
            PositionChange::Upsert {
                symbol,
                shares,
                average_cost,
            } => {
                inner.positions.insert(
                    (commit.user_id, symbol.clone()),
                    Position {
                        user_id: commit.user_id,
                        symbol,
                        shares,
                        average_cost,
                    },
                );
            }
            PositionChange::Remove { symbol } => {
                inner.positions.remove(&(commit.user_id, symbol));
            }
        }

        inner.transactions.push(commit.record);
        Ok(())
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

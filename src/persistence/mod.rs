//! Ledger storage: users (cash + version), positions, and the append-only
//! transaction log, behind the [`LedgerStore`] trait so the engine can run
//! against Postgres in production and an in-memory ledger in tests.

mod memory;
mod pg;
mod pool;
mod positions;
mod transactions;
mod users;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Position, Transaction, User};

pub use memory::MemoryLedger;
pub use pg::PgLedger;
pub use pool::{create_pool_and_migrate, run_migrations};
pub use sqlx::PgPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,

    /// The user's ledger changed between read and commit; retry from fresh state.
    #[error("ledger version conflict")]
    VersionConflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// How a trade changes the traded symbol's position. Shares and cost are
/// absolute post-trade values, not deltas; the version guard on the user row
/// makes the blind write safe.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionChange {
    Upsert {
        symbol: String,
        shares: i64,
        average_cost: Decimal,
    },
    Remove {
        symbol: String,
    },
}

/// Everything a trade writes, committed atomically or not at all.
#[derive(Debug, Clone)]
pub struct TradeCommit {
    pub user_id: Uuid,
    pub expected_version: i64,
    pub new_balance: Decimal,
    pub position: PositionChange,
    pub record: Transaction,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a user with a fresh ledger. Fails with [`StoreError::EmailTaken`]
    /// when the email is already registered.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        starting_balance: Decimal,
    ) -> Result<Uuid, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_position(
        &self,
        user_id: Uuid,
        symbol: &str,
    ) -> Result<Option<Position>, StoreError>;

    async fn list_positions(&self, user_id: Uuid) -> Result<Vec<Position>, StoreError>;

    /// Atomically apply a trade: balance update guarded by `expected_version`
    /// (bumping the version), position upsert/delete, transaction append.
    /// [`StoreError::VersionConflict`] means nothing was written.
    async fn commit_trade(&self, commit: TradeCommit) -> Result<(), StoreError>;

    /// Most recent transactions first.
    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError>;
}

use rust_decimal::Decimal;
use uuid::Uuid;

/// A registered user and their virtual cash ledger (email is stored lowercase).
/// `version` is the optimistic concurrency token: bumped on every committed
/// trade, checked by [`crate::persistence::LedgerStore::commit_trade`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub cash_balance: Decimal,
    pub version: i64,
}

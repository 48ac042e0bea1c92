use rust_decimal::Decimal;
use uuid::Uuid;

/// Holding per (user, symbol). Exists only while `shares > 0`; `average_cost`
/// is the weighted-average purchase price per share.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub average_cost: Decimal,
}

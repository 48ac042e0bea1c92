pub mod position;
pub mod transaction;
pub mod user;

pub use position::Position;
pub use transaction::{Transaction, TradeAction};
pub use user::User;

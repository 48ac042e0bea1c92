//! Error taxonomy shared by the trade engine, portfolio valuator, and API layer.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::persistence::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input, rejected before any lookup.
    #[error("{0}")]
    Validation(String),

    #[error("shares must be a positive whole number, got {0}")]
    InvalidShares(i64),

    /// Quote feed exhausted every fallback for this symbol.
    #[error("could not fetch current price for {0}")]
    PriceUnavailable(String),

    #[error("insufficient funds: cost ${cost:.2}, balance ${balance:.2}")]
    InsufficientFunds { cost: Decimal, balance: Decimal },

    #[error("insufficient shares: you own {owned}")]
    InsufficientShares { owned: i64 },

    #[error("you do not own any shares of {0}")]
    NoSuchPosition(String),

    #[error("user not found")]
    UserNotFound,

    #[error("email already exists")]
    EmailExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no data available for {0}")]
    NoData(String),

    /// Unexpected persistence failure. Details are logged, not surfaced.
    #[error("storage failure")]
    Storage(#[source] StoreError),

    /// Unexpected non-storage failure (hashing, token signing).
    #[error("internal error")]
    Internal(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => CoreError::EmailExists,
            other => CoreError::Storage(other),
        }
    }
}

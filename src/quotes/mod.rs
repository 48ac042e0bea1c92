//! Market-data seam: the [`QuoteProvider`] trait and the typed quote payloads
//! it returns. Providers are unreliable collaborators: any field may be absent
//! and any call may fail; callers treat both as soft misses.

pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

pub use yahoo::YahooQuotes;

/// Point-in-time quote fields, in fallback precedence order. Either field may
/// be missing depending on the provider and the symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub regular_market_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
}

/// One bar of a historical series (close only; that is all we consume).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed quote payload: {0}")]
    Malformed(String),

    #[error("provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Current quote fields for a symbol. May omit any field.
    async fn current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, QuoteError>;

    /// Historical closes for a symbol over `period` at `interval` (provider
    /// range strings, e.g. `"1d"` / `"5m"`). May be empty.
    async fn history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<HistoryPoint>, QuoteError>;
}

//! Pricing resolver: best-effort current price with a fixed fallback chain,
//! plus historical series for charting.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use tokio::time::timeout;

use crate::error::CoreError;
use crate::quotes::QuoteProvider;

/// Upper bound on any single provider call; expiry counts as a miss.
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve a current price for `symbol`, trying in order: the snapshot's
/// regular market price, the snapshot's current price, then the most recent
/// close of a 1-day history. Provider failures and timeouts are soft misses;
/// `None` means every source came up empty and callers decide how to react.
pub async fn resolve_price(provider: &dyn QuoteProvider, symbol: &str) -> Option<Decimal> {
    match timeout(QUOTE_TIMEOUT, provider.current_quote(symbol)).await {
        Ok(Ok(snapshot)) => {
            if let Some(price) = snapshot.regular_market_price.or(snapshot.current_price) {
                return Some(price);
            }
        }
        Ok(Err(err)) => tracing::debug!(symbol, error = %err, "quote snapshot failed"),
        Err(_) => tracing::debug!(symbol, "quote snapshot timed out"),
    }

    match timeout(QUOTE_TIMEOUT, provider.history(symbol, "1d", "1d")).await {
        Ok(Ok(points)) => points
            .last()
            .and_then(|point| Decimal::from_f64(point.close)),
        Ok(Err(err)) => {
            tracing::debug!(symbol, error = %err, "history fallback failed");
            None
        }
        Err(_) => {
            tracing::debug!(symbol, "history fallback timed out");
            None
        }
    }
}

/// Historical closes shaped for charting, dates formatted for display.
#[derive(Debug, Serialize, PartialEq)]
pub struct StockSeries {
    pub prices: Vec<f64>,
    pub dates: Vec<String>,
}

pub async fn get_stock_series(
    provider: &dyn QuoteProvider,
    symbol: &str,
    period: &str,
    interval: &str,
) -> Result<StockSeries, CoreError> {
    let symbol = symbol.to_uppercase();
    let points = provider
        .history(&symbol, period, interval)
        .await
        .map_err(|err| {
            tracing::warn!(%symbol, error = %err, "history lookup failed");
            CoreError::NoData(symbol.clone())
        })?;
    if points.is_empty() {
        return Err(CoreError::NoData(symbol));
    }

    let mut prices = Vec::with_capacity(points.len());
    let mut dates = Vec::with_capacity(points.len());
    for point in points {
        prices.push(point.close);
        dates.push(point.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    Ok(StockSeries { prices, dates })
}

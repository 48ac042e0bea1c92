//! Pricing resolver tests: fallback precedence and soft failure handling.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use papertrade::error::CoreError;
use papertrade::pricing::{QUOTE_TIMEOUT, get_stock_series, resolve_price};
use papertrade::quotes::{HistoryPoint, QuoteError, QuoteProvider, QuoteSnapshot};
use rust_decimal_macros::dec;

/// Scripted provider: `None` on either field means that call errors out.
struct ScriptedQuotes {
    snapshot: Option<QuoteSnapshot>,
    history: Option<Vec<HistoryPoint>>,
}

#[async_trait]
impl QuoteProvider for ScriptedQuotes {
    async fn current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, QuoteError> {
        self.snapshot.ok_or_else(|| QuoteError::Provider {
            symbol: symbol.to_string(),
            message: "scripted failure".to_string(),
        })
    }

    async fn history(
        &self,
        symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<HistoryPoint>, QuoteError> {
        self.history.clone().ok_or_else(|| QuoteError::Provider {
            symbol: symbol.to_string(),
            message: "scripted failure".to_string(),
        })
    }
}

fn bars(closes: &[f64]) -> Vec<HistoryPoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| HistoryPoint {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
            close: *close,
        })
        .collect()
}

#[tokio::test]
async fn prefers_regular_market_price() {
    let provider = ScriptedQuotes {
        snapshot: Some(QuoteSnapshot {
            regular_market_price: Some(dec!(101.5)),
            current_price: Some(dec!(99)),
        }),
        history: Some(bars(&[95.0])),
    };
    assert_eq!(resolve_price(&provider, "AAPL").await, Some(dec!(101.5)));
}

#[tokio::test]
async fn falls_back_to_current_price_field() {
    let provider = ScriptedQuotes {
        snapshot: Some(QuoteSnapshot {
            regular_market_price: None,
            current_price: Some(dec!(99)),
        }),
        history: Some(bars(&[95.0])),
    };
    assert_eq!(resolve_price(&provider, "AAPL").await, Some(dec!(99)));
}

#[tokio::test]
async fn falls_back_to_most_recent_close() {
    let provider = ScriptedQuotes {
        snapshot: Some(QuoteSnapshot::default()),
        history: Some(bars(&[94.0, 95.5])),
    };
    assert_eq!(resolve_price(&provider, "AAPL").await, Some(dec!(95.5)));
}

#[tokio::test]
async fn snapshot_error_is_soft() {
    let provider = ScriptedQuotes {
        snapshot: None,
        history: Some(bars(&[95.5])),
    };
    assert_eq!(resolve_price(&provider, "AAPL").await, Some(dec!(95.5)));
}

#[tokio::test]
async fn exhausted_fallbacks_yield_none() {
    let empty_history = ScriptedQuotes {
        snapshot: Some(QuoteSnapshot::default()),
        history: Some(vec![]),
    };
    assert_eq!(resolve_price(&empty_history, "AAPL").await, None);

    let everything_fails = ScriptedQuotes {
        snapshot: None,
        history: None,
    };
    assert_eq!(resolve_price(&everything_fails, "AAPL").await, None);
}

/// Provider that never answers within the per-call deadline.
struct StalledQuotes;

#[async_trait]
impl QuoteProvider for StalledQuotes {
    async fn current_quote(&self, _symbol: &str) -> Result<QuoteSnapshot, QuoteError> {
        tokio::time::sleep(QUOTE_TIMEOUT + Duration::from_secs(1)).await;
        Ok(QuoteSnapshot {
            regular_market_price: Some(dec!(100)),
            current_price: None,
        })
    }

    async fn history(
        &self,
        _symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<HistoryPoint>, QuoteError> {
        tokio::time::sleep(QUOTE_TIMEOUT + Duration::from_secs(1)).await;
        Ok(bars(&[95.0]))
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_times_out_to_none() {
    assert_eq!(resolve_price(&StalledQuotes, "AAPL").await, None);
}

#[tokio::test]
async fn series_shapes_prices_and_dates() {
    let provider = ScriptedQuotes {
        snapshot: None,
        history: Some(vec![HistoryPoint {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 15, 30, 0).unwrap(),
            close: 187.25,
        }]),
    };
    let series = get_stock_series(&provider, "aapl", "1d", "5m").await.unwrap();
    assert_eq!(series.prices, vec![187.25]);
    assert_eq!(series.dates, vec!["2025-03-14 15:30:00".to_string()]);
}

#[tokio::test]
async fn series_with_no_bars_is_no_data() {
    let provider = ScriptedQuotes {
        snapshot: None,
        history: Some(vec![]),
    };
    let err = get_stock_series(&provider, "AAPL", "1d", "5m")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoData(symbol) if symbol == "AAPL"));

    let failing = ScriptedQuotes {
        snapshot: None,
        history: None,
    };
    let err = get_stock_series(&failing, "AAPL", "1d", "5m")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoData(_)));
}

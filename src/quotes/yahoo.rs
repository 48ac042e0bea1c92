//! Quote provider backed by the Yahoo Finance chart endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

use super::{HistoryPoint, QuoteError, QuoteProvider, QuoteSnapshot};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct YahooQuotes {
    client: reqwest::Client,
    base_url: String,
}

impl YahooQuotes {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (used by tests against a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("papertrade/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartResult, QuoteError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response: ChartResponse = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.chart.error {
            return Err(QuoteError::Provider {
                symbol: symbol.to_string(),
                message: err.description,
            });
        }
        response
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| QuoteError::Malformed(format!("no chart result for {symbol}")))
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooQuotes {
    async fn current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, QuoteError> {
        let chart = self.fetch_chart(symbol, "1d", "1d").await?;
        Ok(QuoteSnapshot {
            regular_market_price: chart.meta.regular_market_price.and_then(Decimal::from_f64),
            current_price: chart.meta.current_price.and_then(Decimal::from_f64),
        })
    }

    async fn history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<HistoryPoint>, QuoteError> {
        let chart = self.fetch_chart(symbol, period, interval).await?;
        let timestamps = chart.timestamp.unwrap_or_default();
        let closes = chart
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default();

        // Bars with a null close (pre/post market gaps) are dropped.
        let points = timestamps
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let close = close?;
                let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
                Some(HistoryPoint { timestamp, close })
            })
            .collect();
        Ok(points)
    }
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "currentPrice")]
    current_price: Option<f64>,
}

#[derive(Deserialize, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

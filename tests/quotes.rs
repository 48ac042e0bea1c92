//! Yahoo chart client tests against a mock HTTP server.

use papertrade::quotes::{QuoteError, QuoteProvider, YahooQuotes};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn current_quote_parses_market_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 189.5, "currency": "USD" },
                    "timestamp": [1700000000],
                    "indicators": { "quote": [{ "close": [189.5] }] }
                }],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let quotes = YahooQuotes::with_base_url(server.uri()).unwrap();
    let snapshot = quotes.current_quote("AAPL").await.unwrap();
    assert_eq!(snapshot.regular_market_price, Some(dec!(189.5)));
    assert_eq!(snapshot.current_price, None);
}

#[tokio::test]
async fn history_drops_null_closes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 3.0 },
                    "timestamp": [1700000000, 1700000300, 1700000600],
                    "indicators": { "quote": [{ "close": [1.0, null, 3.0] }] }
                }],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let quotes = YahooQuotes::with_base_url(server.uri()).unwrap();
    let points = quotes.history("AAPL", "1d", "5m").await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].close, 1.0);
    assert_eq!(points[1].close, 3.0);
}

#[tokio::test]
async fn provider_error_payload_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        })))
        .mount(&server)
        .await;

    let quotes = YahooQuotes::with_base_url(server.uri()).unwrap();
    let err = quotes.current_quote("NOPE").await.unwrap_err();
    assert!(matches!(err, QuoteError::Provider { symbol, .. } if symbol == "NOPE"));
}

#[tokio::test]
async fn http_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let quotes = YahooQuotes::with_base_url(server.uri()).unwrap();
    let err = quotes.current_quote("AAPL").await.unwrap_err();
    assert!(matches!(err, QuoteError::Http(_)));
}

//! Yahoo chart client against a wiremock server

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use momentum_screener::types::{PriceHistoryProvider, ScreenerError};
use momentum_screener::YahooFinanceClient;

fn chart_body(symbol: &str) -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": symbol,
                    "regularMarketPrice": 12.5
                },
                "timestamp": [1_700_000_000, 1_700_086_400, 1_700_172_800],
                "indicators": {
                    "quote": [{
                        "open": [10.0, null, 12.0],
                        "high": [11.0, 11.5, 13.0],
                        "low": [9.0, 10.0, 11.0],
                        "close": [10.5, 11.0, 12.5],
                        "volume": [1000, 1100, null]
                    }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn test_fetch_history_parses_bars_and_skips_null_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "1y"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL")))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let bars = client.fetch_history("AAPL", "1y", "1d").await.unwrap();

    // Row with a null open is dropped; null volume defaults to zero
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, Decimal::try_from(10.5).unwrap());
    assert_eq!(bars[1].close, Decimal::try_from(12.5).unwrap());
    assert_eq!(bars[1].volume, Decimal::ZERO);
    assert!(bars[0].timestamp < bars[1].timestamp);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let err = client.fetch_history("AAPL", "1y", "1d").await.unwrap_err();
    assert!(matches!(err, ScreenerError::ApiError(_)));
}

#[tokio::test]
async fn test_rate_limit_maps_to_rate_limit_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let err = client.fetch_history("AAPL", "1y", "1d").await.unwrap_err();
    match err {
        ScreenerError::RateLimit {
            source,
            retry_after,
        } => {
            assert_eq!(source, "yahoo");
            assert_eq!(retry_after, Some(30));
        }
        other => panic!("expected RateLimit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chart_error_body_maps_to_api_error() {
    let server = MockServer::start().await;
    let body = json!({
        "chart": {
            "result": null,
            "error": {"code": "Not Found", "description": "No data found"}
        }
    });
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let err = client.fetch_history("NOPE", "1y", "1d").await.unwrap_err();
    assert!(matches!(err, ScreenerError::ApiError(_)));
}

#[tokio::test]
async fn test_missing_result_maps_to_symbol_not_found() {
    let server = MockServer::start().await;
    let body = json!({"chart": {"result": [], "error": null}});
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GONE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let err = client.fetch_history("GONE", "1y", "1d").await.unwrap_err();
    assert!(matches!(err, ScreenerError::SymbolNotFound(_)));
}

#[tokio::test]
async fn test_latest_quote_prefers_market_price_from_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "5d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL")))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());
    let quote = client.latest_quote("AAPL").await.unwrap();

    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, Decimal::try_from(12.5).unwrap());
    assert_eq!(quote.currency, "USD");
}

#[tokio::test]
async fn test_health_reflects_request_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL")))
        .mount(&server)
        .await;

    let client = YahooFinanceClient::with_base_url(&server.uri());

    // No requests yet: not healthy until a success is recorded
    let health = PriceHistoryProvider::health(&client).await;
    assert!(!health.is_healthy);

    client.fetch_history("AAPL", "1y", "1d").await.unwrap();
    let health = PriceHistoryProvider::health(&client).await;
    assert!(health.is_healthy);
    assert_eq!(health.source, "yahoo");
    assert!(health.last_success.is_some());
    assert_eq!(health.success_rate_24h, 1.0);
}

// ============================================================================
// Tests d'intégration : TradingApi contre un transport en mémoire
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use tradinghub::api::params::{CoinGeckoListParams, OptionsRecommendationParams};
use tradinghub::api::testing::MockTransport;
use tradinghub::api::{RequestError, TradingApi};
use tradinghub::config::ApiConfig;
use tradinghub::models::{market_records, ListEntry, Sentiment};

fn api(transport: MockTransport) -> TradingApi {
    TradingApi::with_transport(ApiConfig::new("http://localhost:3000/"), Arc::new(transport))
}

#[tokio::test]
async fn kraken_rankings_follow_change_and_volume() {
    let tickers = json!({
        "success": true,
        "data": [
            {"pair": "XBTUSD", "price": 50000, "volume": 10, "change_pct_24h": 5},
            {"pair": "ETHUSD", "price": 3000, "volume": 300, "change_pct_24h": -2},
            {"pair": "ADAUSD", "price": 0.5, "volume": 20, "change_pct_24h": 10},
            {"pair": "DOTUSD", "price": 7, "change_pct_24h": 0}
        ]
    });
    let api = api(MockTransport::new().respond("/kraken/ticker", tickers));

    let gainers = api.kraken_top_gainers(10).await.unwrap();
    let gainers: Vec<&str> = gainers.iter().map(|g| g.pair.as_str()).collect();
    assert_eq!(gainers, vec!["ADAUSD", "XBTUSD"]);

    let losers = api.kraken_top_losers(10).await.unwrap();
    let losers: Vec<&str> = losers.iter().map(|l| l.pair.as_str()).collect();
    assert_eq!(losers, vec!["ETHUSD"]);

    // Volume absent : classé en dernier
    let top = api.kraken_top_cryptocurrencies(3).await.unwrap();
    let top: Vec<&str> = top.iter().map(|t| t.pair.as_str()).collect();
    assert_eq!(top, vec!["ETHUSD", "ADAUSD", "XBTUSD"]);
}

#[tokio::test]
async fn ticker_without_pair_does_not_fail_rankings() {
    let api = api(MockTransport::new().respond(
        "/kraken/ticker",
        json!([
            {"pair": "XBTUSD", "change_pct_24h": 5},
            {"change_pct_24h": 3},
            {"pair": "ADAUSD", "change_pct_24h": 10}
        ]),
    ));

    let gainers = api.kraken_top_gainers(10).await.unwrap();
    let gainers: Vec<&str> = gainers.iter().map(|g| g.pair.as_str()).collect();
    assert_eq!(gainers, vec!["ADAUSD", "XBTUSD"]);

    let top = api.kraken_top_cryptocurrencies(10).await.unwrap();
    assert_eq!(top.len(), 2);
}

#[tokio::test]
async fn ranking_limit_is_respected() {
    let tickers: Vec<_> = (1..=30)
        .map(|i| json!({"pair": format!("P{}", i), "change_pct_24h": i}))
        .collect();
    let api = api(MockTransport::new().respond("/kraken/ticker", json!(tickers)));

    let gainers = api.kraken_top_gainers(5).await.unwrap();
    assert_eq!(gainers.len(), 5);
    assert_eq!(gainers[0].pair, "P30");
}

#[tokio::test]
async fn market_records_keep_missing_values_absent() {
    let api = api(MockTransport::new().respond(
        "/kraken/ticker",
        json!([{"pair": "XBTUSD", "change_pct_24h": 1.5}]),
    ));

    let records = market_records(api.kraken_top_gainers(10).await.unwrap());
    assert_eq!(records[0].symbol, "XBTUSD");
    assert_eq!(records[0].price, None);
    assert_eq!(records[0].market_cap, None);
    assert_eq!(records[0].rank, Some(1));
}

#[tokio::test]
async fn coingecko_lists_become_market_records() {
    let api = api(MockTransport::new().respond(
        "/coingecko/top",
        json!({"success": true, "data": [
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 50000, "market_cap": 1.0e12, "market_cap_rank": 1},
            {"pair": "ETHUSD", "price": 3000},
            {"id": "solana", "symbol": "sol", "name": "Solana"}
        ]}),
    ));

    let records = api.coingecko_top(&CoinGeckoListParams::default()).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin", "ETHUSD", "solana"]);
    assert_eq!(records[0].market_cap, Some(1.0e12));
    assert_eq!(records[1].market_cap, None);
    // Rang absent : position dans la liste
    assert_eq!(records[2].rank, Some(3));
}

#[tokio::test]
async fn news_minimal_item_defaults() {
    let api = api(MockTransport::new().respond(
        "/news",
        json!([{"headline": "H", "content": "C", "created_at": "2024-03-01T10:00:00Z"}]),
    ));

    let news = api.news().await.unwrap();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].title, "H");
    assert_eq!(news[0].summary, "C");
    assert_eq!(news[0].timestamp, "2024-03-01T10:00:00Z");
    assert_eq!(news[0].sentiment, Sentiment::Neutral);
    assert_eq!(news[0].display_date(), "2024-03-01");
}

#[tokio::test]
async fn heterogeneous_lists_decode_both_shapes() {
    let api = api(MockTransport::new().respond(
        "/trending/stocks",
        json!(["AAPL", {"ticker": "TSLA", "price": 200.5}, {"name": "Unnamed"}]),
    ));

    let entries = api.trending_stocks(10).await.unwrap();
    assert_eq!(entries[0], ListEntry::Symbol("AAPL".to_string()));
    assert_eq!(entries[1].symbol(), Some("TSLA"));
    assert_eq!(entries[2].label("Stock", 2), "Stock 3");
}

#[tokio::test]
async fn off_shape_list_items_keep_the_section_alive() {
    let api = api(MockTransport::new().respond(
        "/trending/stocks",
        json!(["AAPL", {"symbol": "TSLA", "price": "200.5"}, {"ticker": "GME", "mentions": 12.5}]),
    ));

    let entries = api.trending_stocks(10).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].item().and_then(|i| i.price), Some(200.5));
    assert_eq!(entries[2].symbol(), Some("GME"));
}

#[tokio::test]
async fn defined_params_only_reach_the_query_string() {
    let transport = MockTransport::new()
        .respond("/options/recommendations", json!([]))
        .respond("/coingecko/gainers", json!([]));
    let requests = transport.requests();
    let api = api(transport);

    let params = OptionsRecommendationParams {
        limit: Some(10),
        option_type: Some("call".to_string()),
        ..Default::default()
    };
    api.options_recommendations(&params).await.unwrap();
    api.coingecko_gainers(&CoinGeckoListParams::default())
        .await
        .unwrap();

    let urls = requests.lock().unwrap();
    let options: HashMap<String, String> = urls[0].query_pairs().into_owned().collect();
    assert_eq!(options.len(), 2);
    assert_eq!(options["limit"], "10");
    assert_eq!(options["type"], "call");

    // Les paramètres CoinGecko ont tous une valeur par défaut
    let coingecko: HashMap<String, String> = urls[1].query_pairs().into_owned().collect();
    assert_eq!(coingecko["vs_currency"], "usd");
    assert_eq!(coingecko["limit"], "10");
}

#[tokio::test]
async fn failures_surface_as_request_errors() {
    let api = api(
        MockTransport::new()
            .fail("/metrics", RequestError::Status(500))
            .fail("/kraken/ticker", RequestError::Network("connection refused".to_string())),
    );

    let err = api.system_metrics().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 500");

    let err = api.kraken_top_gainers(10).await.unwrap_err();
    assert!(matches!(err, RequestError::Network(_)));

    // Route inconnue du mock
    let err = api.insider(10).await.unwrap_err();
    assert_eq!(err, RequestError::Status(404));
}

// ============================================================================
// Tests d'intégration : sections du dashboard (Resource + TradingApi)
// ============================================================================

use std::sync::Arc;

use serde_json::json;
use tokio::runtime::Handle;

use tradinghub::api::testing::MockTransport;
use tradinghub::api::{RequestError, TradingApi};
use tradinghub::app::{App, Tab};
use tradinghub::config::ApiConfig;
use tradinghub::fetch::{Phase, Resource};

fn api(transport: MockTransport) -> TradingApi {
    TradingApi::with_transport(ApiConfig::new("http://mock.test"), Arc::new(transport))
}

#[tokio::test]
async fn resource_lifecycle_through_client() {
    let client = api(MockTransport::new().respond(
        "/health",
        json!({"success": true, "data": {"status": "healthy"}}),
    ));
    let mut health = Resource::new("health", Handle::current(), move || {
        let client = client.clone();
        async move { client.health().await }
    });

    assert_eq!(health.state().phase(), Phase::Idle);
    health.mount();
    assert_eq!(health.state().phase(), Phase::Loading);

    health.settle().await;
    assert_eq!(health.state().phase(), Phase::Success);
    assert!(health.state().data().unwrap().is_healthy());
}

#[tokio::test]
async fn failed_section_recovers_on_retry() {
    let failing = api(MockTransport::new().fail("/news", RequestError::Status(503)));
    let mut news = Resource::new("news", Handle::current(), move || {
        let client = failing.clone();
        async move { client.news().await }
    });

    news.mount();
    news.settle().await;
    assert_eq!(news.state().phase(), Phase::Failure);
    assert_eq!(news.state().error(), Some("HTTP error! status: 503"));

    // Une nouvelle tentative efface l'erreur dès son émission
    news.refetch();
    assert_eq!(news.state().error(), None);
    news.settle().await;
    assert_eq!(news.state().error(), Some("HTTP error! status: 503"));
}

#[tokio::test]
async fn overview_loads_and_sync_applies_results() {
    let transport = MockTransport::new()
        .respond(
            "/coingecko/market-overview",
            json!({"total_market_cap": 2.5e12, "total_volume": 9.0e10, "bitcoin_dominance": 52.1}),
        )
        .respond("/coingecko/market-context", json!({"context": "Calm"}))
        .respond(
            "/kraken/ticker",
            json!([{"pair": "XBTUSD", "change_pct_24h": 5}, {"pair": "ETHUSD", "change_pct_24h": -2}]),
        );
    let mut app = App::new(api(transport), Handle::current());

    app.overview.market.settle().await;
    app.overview.context.settle().await;
    app.overview.gainers.settle().await;
    app.overview.losers.settle().await;
    app.sync();

    assert!(!app.any_loading());
    assert_eq!(app.overview.context.state().data().map(String::as_str), Some("Calm"));
    let gainers = app.overview.gainers.state().data().unwrap();
    assert_eq!(gainers.len(), 1);
    assert_eq!(gainers[0].symbol, "XBTUSD");
    assert_eq!(gainers[0].rank, Some(1));
}

#[tokio::test]
async fn refresh_keeps_stale_data_visible() {
    let transport = MockTransport::new().respond("/coingecko/market-context", json!({"context": "Calm"}));
    let mut app = App::new(api(transport), Handle::current());
    app.overview.context.settle().await;

    app.refresh_all();
    assert!(app.overview.context.state().is_loading());
    assert_eq!(app.overview.context.state().data().map(String::as_str), Some("Calm"));
}

#[tokio::test]
async fn switching_tabs_loads_on_first_display_only() {
    let transport = MockTransport::new().respond("/kraken/pairs", json!([]));
    let requests = transport.requests();
    let mut app = App::new(api(transport), Handle::current());

    app.select_tab(Tab::Kraken);
    app.kraken.pairs.settle().await;
    app.select_tab(Tab::Overview);
    app.select_tab(Tab::Kraken);

    let pair_requests = requests
        .lock()
        .unwrap()
        .iter()
        .filter(|url| url.path() == "/kraken/pairs")
        .count();
    assert_eq!(pair_requests, 1);
    assert_eq!(app.kraken.pairs.state().data().map(Vec::len), Some(0));
}

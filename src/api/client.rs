// ============================================================================
// API Client : TradingApi
// ============================================================================
// Une méthode par endpoint de l'API de trading. Chaque méthode :
// 1. construit l'URL (segments de chemin + paramètres définis)
// 2. fait un GET via le Transport
// 3. retire l'enveloppe optionnelle {success, data}
// 4. désérialise et, si besoin, normalise la réponse
//
// Pas de retry, pas de cache : chaque appel est une nouvelle requête.
//
// CONCEPT RUST : Arc<dyn Trait>
// - Le transport est partagé entre toutes les tâches de fetch
// - TradingApi est Clone à faible coût (clone de l'Arc uniquement)
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::api::error::RequestError;
use crate::api::normalize;
use crate::api::params::{
    CoinGeckoListParams, FinvizParams, OptionsRecommendationParams, QueryParams, ScreenerParams,
    TrendingOptionsParams, YahooParams,
};
use crate::api::transport::{HttpTransport, Transport};
use crate::config::ApiConfig;
use crate::models::{
    market_records, CryptoQuote, FinvizCandidate, FinvizRecommendation, ForexData, FuturesData,
    GroupData, HealthResponse, HighOpenInterestResponse, InsiderData, KrakenAsset,
    KrakenAssetPair, KrakenMarketData, KrakenOrderBook, KrakenTicker, ListEntry, MarketOverview,
    MarketRecord, NewsItem, OptionType, SystemMetrics, SystemStatus, TrendingItem,
    TrendingOptionsResponse, YahooMetrics, YahooRankResult,
};

/// Nombre d'éléments par défaut des listes courtes
pub const DEFAULT_LIMIT: usize = 10;

/// Nombre d'éléments par défaut des classements crypto complets
pub const DEFAULT_TOP_LIMIT: usize = 20;

/// Prix simples : id -> devise -> valeur
pub type SimplePrices = HashMap<String, HashMap<String, f64>>;

/// Élément de /coingecko/trending : { "item": {...} }
#[derive(Debug, Deserialize)]
struct TrendingWrapper {
    item: TrendingItem,
}

/// Réponse de /coingecko/market-context
#[derive(Debug, Deserialize)]
struct MarketContext {
    context: String,
}

/// Client de l'API de trading
#[derive(Clone)]
pub struct TradingApi {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl TradingApi {
    /// Crée un client HTTP réel
    pub fn new(config: ApiConfig) -> Result<Self, RequestError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Crée un client avec un transport fourni (tests, mocks)
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // ========================================================================
    // Wrapper de fetch générique
    // ========================================================================

    /// Construit l'URL complète d'un endpoint
    ///
    /// Les segments sont percent-encodés ; la query string n'est ajoutée que
    /// si au moins un paramètre est défini.
    pub fn endpoint_url(&self, segments: &[&str], query: &QueryParams) -> Result<Url, RequestError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| RequestError::Url(format!("{}: {}", self.config.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| RequestError::Url(format!("{}: cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.iter() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GET + enveloppe + désérialisation
    ///
    /// Toute erreur est loggée ici puis renvoyée à l'appelant.
    #[instrument(skip_all, fields(path = %segments.join("/")))]
    pub async fn fetch_api<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: QueryParams,
    ) -> Result<T, RequestError> {
        let result = self.fetch_value(segments, &query).await;

        if let Err(e) = &result {
            error!(error = %e, "API request failed");
        }
        result
    }

    async fn fetch_value<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &QueryParams,
    ) -> Result<T, RequestError> {
        let url = self.endpoint_url(segments, query)?;
        debug!(url = %url, "Making API request");

        let body = self.transport.get_json(url).await?;
        let payload = normalize::unwrap_envelope(body);
        Ok(serde_json::from_value(payload)?)
    }

    // ========================================================================
    // Système
    // ========================================================================

    pub async fn health(&self) -> Result<HealthResponse, RequestError> {
        self.fetch_api(&["health"], QueryParams::new()).await
    }

    pub async fn system_status(&self) -> Result<SystemStatus, RequestError> {
        self.fetch_api(&["status"], QueryParams::new()).await
    }

    pub async fn system_metrics(&self) -> Result<SystemMetrics, RequestError> {
        self.fetch_api(&["metrics"], QueryParams::new()).await
    }

    // ========================================================================
    // Kraken : données normalisées
    // ========================================================================

    /// Paires en plus forte hausse sur 24h
    pub async fn kraken_top_gainers(&self, limit: usize) -> Result<Vec<KrakenMarketData>, RequestError> {
        let tickers = self.kraken_ticker(None).await?;
        Ok(normalize::top_gainers(tickers, limit))
    }

    /// Paires en plus forte baisse sur 24h
    pub async fn kraken_top_losers(&self, limit: usize) -> Result<Vec<KrakenMarketData>, RequestError> {
        let tickers = self.kraken_ticker(None).await?;
        Ok(normalize::top_losers(tickers, limit))
    }

    /// Paires les plus échangées (volume)
    pub async fn kraken_top_cryptocurrencies(
        &self,
        limit: usize,
    ) -> Result<Vec<KrakenMarketData>, RequestError> {
        let tickers = self.kraken_ticker(None).await?;
        Ok(normalize::top_by_volume(tickers, limit))
    }

    /// Cryptos tendance, normalisées défensivement
    pub async fn kraken_trending_crypto(
        &self,
        limit: usize,
    ) -> Result<Vec<KrakenMarketData>, RequestError> {
        let items: Vec<Value> = self.fetch_api(&["kraken", "trending"], QueryParams::new()).await?;
        Ok(normalize::trending_crypto(items, limit))
    }

    // ========================================================================
    // CoinGecko (legacy)
    // ========================================================================

    pub async fn coingecko_gainers(
        &self,
        params: &CoinGeckoListParams,
    ) -> Result<Vec<MarketRecord>, RequestError> {
        self.coingecko_records("gainers", params).await
    }

    pub async fn coingecko_losers(
        &self,
        params: &CoinGeckoListParams,
    ) -> Result<Vec<MarketRecord>, RequestError> {
        self.coingecko_records("losers", params).await
    }

    pub async fn coingecko_top(
        &self,
        params: &CoinGeckoListParams,
    ) -> Result<Vec<MarketRecord>, RequestError> {
        self.coingecko_records("top", params).await
    }

    /// Listes CoinGecko : chaque élément est décodé en CryptoQuote (fiche
    /// CoinGecko ou ticker Kraken) puis ramené à un MarketRecord
    async fn coingecko_records(
        &self,
        list: &str,
        params: &CoinGeckoListParams,
    ) -> Result<Vec<MarketRecord>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        let quotes: Vec<CryptoQuote> = self.fetch_api(&["coingecko", list], query).await?;
        Ok(market_records(quotes))
    }

    pub async fn market_overview(&self) -> Result<MarketOverview, RequestError> {
        self.fetch_api(&["coingecko", "market-overview"], QueryParams::new())
            .await
    }

    /// Tendances CoinGecko : [{item}] -> [item]
    pub async fn coingecko_trending(&self) -> Result<Vec<TrendingItem>, RequestError> {
        let wrapped: Vec<TrendingWrapper> = self
            .fetch_api(&["coingecko", "trending"], QueryParams::new())
            .await?;
        Ok(wrapped.into_iter().map(|w| w.item).collect())
    }

    pub async fn trending_symbols(&self) -> Result<Vec<String>, RequestError> {
        self.fetch_api(&["coingecko", "trending-symbols"], QueryParams::new())
            .await
    }

    /// Texte de contexte de marché
    pub async fn market_context(&self) -> Result<String, RequestError> {
        let response: MarketContext = self
            .fetch_api(&["coingecko", "market-context"], QueryParams::new())
            .await?;
        Ok(response.context)
    }

    pub async fn simple_price(
        &self,
        ids: &str,
        vs_currencies: &str,
        include_24hr_change: bool,
    ) -> Result<SimplePrices, RequestError> {
        let query = QueryParams::new()
            .push("ids", ids)
            .push("vs_currencies", vs_currencies)
            .push("include_24hr_change", include_24hr_change);
        self.fetch_api(&["coingecko", "simple-price"], query).await
    }

    // ========================================================================
    // Options
    // ========================================================================

    pub async fn options_recommendations(
        &self,
        params: &OptionsRecommendationParams,
    ) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["options", "recommendations"], query).await
    }

    pub async fn high_open_interest(
        &self,
        ticker: &str,
        option_type: OptionType,
    ) -> Result<HighOpenInterestResponse, RequestError> {
        let query = QueryParams::new().push("option_type", option_type);
        self.fetch_api(&["high-open-interest", ticker], query).await
    }

    /// Open interest de plusieurs tickers en une requête
    pub async fn high_open_interest_batch(
        &self,
        tickers: &[String],
        option_type: OptionType,
    ) -> Result<Vec<HighOpenInterestResponse>, RequestError> {
        let joined = tickers
            .iter()
            .map(|t| t.trim())
            .collect::<Vec<_>>()
            .join(",");
        let query = QueryParams::new()
            .push("tickers", joined)
            .push("option_type", option_type);
        self.fetch_api(&["high-open-interest", "batch"], query).await
    }

    pub async fn trending_options(
        &self,
        params: &TrendingOptionsParams,
    ) -> Result<TrendingOptionsResponse, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["trending-options"], query).await
    }

    // ========================================================================
    // Tendances et réseaux sociaux
    // ========================================================================

    pub async fn trending_stocks(&self, limit: usize) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["trending", "stocks"], query).await
    }

    pub async fn trending_crypto_data(&self, limit: usize) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["trending", "crypto"], query).await
    }

    pub async fn reddit_stocks(&self, limit: usize) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["reddit", "stocks"], query).await
    }

    // ========================================================================
    // News et recommandations
    // ========================================================================

    /// News normalisées (liste plate ou enveloppe par source)
    pub async fn news(&self) -> Result<Vec<NewsItem>, RequestError> {
        let payload: Value = self.fetch_api(&["news"], QueryParams::new()).await?;
        Ok(normalize::news_items(payload))
    }

    pub async fn finviz_recommendations(
        &self,
        params: &FinvizParams,
    ) -> Result<Vec<FinvizRecommendation>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["recommendations", "finviz"], query).await
    }

    pub async fn yahoo_recommendations(
        &self,
        params: &YahooParams,
    ) -> Result<Vec<YahooRankResult>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["recommendations", "yahoo"], query).await
    }

    pub async fn screener_candidates(
        &self,
        params: &ScreenerParams,
    ) -> Result<Vec<FinvizCandidate>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["screener", "candidates"], query).await
    }

    pub async fn yahoo_metrics(&self, params: &YahooParams) -> Result<YahooMetrics, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["metrics", "yahoo"], query).await
    }

    pub async fn rank_yahoo(&self, params: &YahooParams) -> Result<Vec<YahooRankResult>, RequestError> {
        let query = QueryParams::from_serialize(params)?;
        self.fetch_api(&["rank", "yahoo"], query).await
    }

    // ========================================================================
    // Données de marché
    // ========================================================================

    pub async fn crypto(&self, limit: usize) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["crypto"], query).await
    }

    pub async fn forex(&self, limit: usize) -> Result<Vec<ForexData>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["forex"], query).await
    }

    pub async fn futures(&self, limit: usize) -> Result<Vec<FuturesData>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["future"], query).await
    }

    pub async fn groups(&self, limit: usize) -> Result<Vec<GroupData>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["group"], query).await
    }

    pub async fn insider(&self, limit: usize) -> Result<Vec<InsiderData>, RequestError> {
        let query = QueryParams::new().push("limit", limit);
        self.fetch_api(&["insider"], query).await
    }

    // ========================================================================
    // Kraken : passthrough
    // ========================================================================

    pub async fn kraken_assets(&self) -> Result<Vec<KrakenAsset>, RequestError> {
        self.fetch_api(&["kraken", "assets"], QueryParams::new()).await
    }

    pub async fn kraken_pairs(&self) -> Result<Vec<KrakenAssetPair>, RequestError> {
        self.fetch_api(&["kraken", "pairs"], QueryParams::new()).await
    }

    /// Tickers de toutes les paires, ou des paires listées ("XBTUSD,ETHUSD")
    pub async fn kraken_ticker(&self, pairs: Option<&str>) -> Result<Vec<KrakenTicker>, RequestError> {
        let query = QueryParams::new().push_opt("pairs", pairs.filter(|p| !p.is_empty()));
        let items: Vec<Value> = self.fetch_api(&["kraken", "ticker"], query).await?;
        Ok(normalize::kraken_tickers(items))
    }

    pub async fn kraken_ticker_by_pair(&self, pair: &str) -> Result<KrakenTicker, RequestError> {
        self.fetch_api(&["kraken", "ticker", pair], QueryParams::new())
            .await
    }

    pub async fn kraken_order_book(
        &self,
        pair: &str,
        depth: Option<u32>,
    ) -> Result<KrakenOrderBook, RequestError> {
        let query = QueryParams::new().push_opt("depth", depth.filter(|d| *d > 0));
        self.fetch_api(&["kraken", "orderbook", pair], query).await
    }

    pub async fn kraken_ohlc(&self, pair: &str, interval: Option<u32>) -> Result<Value, RequestError> {
        let query = QueryParams::new().push_opt("interval", interval.filter(|i| *i > 0));
        self.fetch_api(&["kraken", "ohlc", pair], query).await
    }

    pub async fn kraken_trades(&self, pair: &str) -> Result<Value, RequestError> {
        self.fetch_api(&["kraken", "trades", pair], QueryParams::new())
            .await
    }

    pub async fn kraken_status(&self) -> Result<Value, RequestError> {
        self.fetch_api(&["kraken", "status"], QueryParams::new()).await
    }

    pub async fn kraken_time(&self) -> Result<Value, RequestError> {
        self.fetch_api(&["kraken", "time"], QueryParams::new()).await
    }

    pub async fn kraken_summary(&self, pair: &str) -> Result<Value, RequestError> {
        self.fetch_api(&["kraken", "summary", pair], QueryParams::new())
            .await
    }

    pub async fn kraken_trending(&self, limit: Option<usize>) -> Result<Vec<ListEntry>, RequestError> {
        let query = QueryParams::new().push_opt("limit", limit.filter(|l| *l > 0));
        self.fetch_api(&["kraken", "trending"], query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use serde_json::json;

    fn api(transport: MockTransport) -> TradingApi {
        TradingApi::with_transport(ApiConfig::new("http://mock.test/api"), Arc::new(transport))
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let api = api(MockTransport::new());
        let url = api
            .endpoint_url(&["kraken", "ticker"], &QueryParams::new())
            .unwrap();
        assert_eq!(url.as_str(), "http://mock.test/api/kraken/ticker");
    }

    #[test]
    fn test_endpoint_url_root_base_and_query() {
        let api = TradingApi::with_transport(
            ApiConfig::new("http://localhost:3000"),
            Arc::new(MockTransport::new()),
        );
        let query = QueryParams::new().push("limit", 10);
        let url = api.endpoint_url(&["trending", "stocks"], &query).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/trending/stocks?limit=10");
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let api = api(MockTransport::new());
        let url = api
            .endpoint_url(&["high-open-interest", "BRK B"], &QueryParams::new())
            .unwrap();
        assert_eq!(url.path(), "/api/high-open-interest/BRK%20B");
    }

    #[test]
    fn test_invalid_base_url() {
        let api = TradingApi::with_transport(ApiConfig::new("not a url"), Arc::new(MockTransport::new()));
        let err = api.endpoint_url(&["health"], &QueryParams::new()).unwrap_err();
        assert!(matches!(err, RequestError::Url(_)));
    }

    #[tokio::test]
    async fn test_envelope_is_unwrapped() {
        let transport = MockTransport::new()
            .respond("/api/health", json!({"success": true, "data": {"status": "ok"}}));
        let health = api(transport).health().await.unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_unwrapped_body_passthrough() {
        let transport = MockTransport::new().respond("/api/health", json!({"status": "degraded"}));
        let health = api(transport).health().await.unwrap();
        assert_eq!(health.status, "degraded");
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let transport = MockTransport::new().fail("/api/status", RequestError::Status(500));
        let err = api(transport).system_status().await.unwrap_err();
        assert_eq!(err, RequestError::Status(500));
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_decode_error() {
        let transport = MockTransport::new().respond("/api/forex", json!({"unexpected": true}));
        let err = api(transport).forex(10).await.unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn test_kraken_scenario_through_client() {
        let tickers = json!([
            {"pair": "XBTUSD", "change_pct_24h": 5},
            {"pair": "ETHUSD", "change_pct_24h": -2},
            {"pair": "ADAUSD", "change_pct_24h": 10}
        ]);
        let transport = MockTransport::new().respond("/api/kraken/ticker", tickers);
        let api = api(transport);

        let gainers = api.kraken_top_gainers(10).await.unwrap();
        let pairs: Vec<&str> = gainers.iter().map(|g| g.pair.as_str()).collect();
        assert_eq!(pairs, vec!["ADAUSD", "XBTUSD"]);

        let losers = api.kraken_top_losers(10).await.unwrap();
        assert_eq!(losers.len(), 1);
        assert_eq!(losers[0].pair, "ETHUSD");
    }

    #[tokio::test]
    async fn test_each_call_is_a_fresh_request() {
        let transport = MockTransport::new().respond("/api/kraken/ticker", json!([]));
        let requests = transport.requests();
        let api = api(transport);

        api.kraken_top_gainers(5).await.unwrap();
        api.kraken_top_losers(5).await.unwrap();

        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_parameters_only_defined_keys() {
        let transport = MockTransport::new().respond("/api/trending-options", json!({"results": []}));
        let requests = transport.requests();
        let params = TrendingOptionsParams {
            limit: Some(10),
            ..Default::default()
        };

        api(transport).trending_options(&params).await.unwrap();

        let urls = requests.lock().unwrap();
        assert_eq!(urls[0].query(), Some("limit=10"));
    }

    #[tokio::test]
    async fn test_batch_tickers_are_trimmed_and_joined() {
        let transport = MockTransport::new().respond("/api/high-open-interest/batch", json!([]));
        let requests = transport.requests();
        let tickers = vec!["AAPL".to_string(), " TSLA ".to_string()];

        api(transport)
            .high_open_interest_batch(&tickers, OptionType::Put)
            .await
            .unwrap();

        let urls = requests.lock().unwrap();
        let pairs: HashMap<String, String> = urls[0].query_pairs().into_owned().collect();
        assert_eq!(pairs["tickers"], "AAPL,TSLA");
        assert_eq!(pairs["option_type"], "put");
    }

    #[tokio::test]
    async fn test_coingecko_trending_and_context_unwrapping() {
        let transport = MockTransport::new()
            .respond(
                "/api/coingecko/trending",
                json!([{"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE", "score": 0}}]),
            )
            .respond(
                "/api/coingecko/market-context",
                json!({"success": true, "data": {"context": "Risk-on"}}),
            );
        let api = api(transport);

        let trending = api.coingecko_trending().await.unwrap();
        assert_eq!(trending[0].id, "pepe");

        assert_eq!(api.market_context().await.unwrap(), "Risk-on");
    }

    #[tokio::test]
    async fn test_news_nested_envelope_through_client() {
        let transport = MockTransport::new().respond(
            "/api/news",
            json!({"success": true, "data": {"alpaca": {"news": [{"headline": "H", "content": "C", "created_at": "T"}]}}}),
        );
        let news = api(transport).news().await.unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].title, "H");
        assert_eq!(news[0].summary, "C");
    }
}

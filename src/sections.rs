// ============================================================================
// Sections du dashboard
// ============================================================================
// Chaque onglet regroupe plusieurs sections ; chaque section possède sa
// propre Resource. Les sections ne partagent rien : l'échec de l'une n'a
// aucun effet sur ses voisines.
// ============================================================================

use std::future::Future;

use tokio::runtime::Handle;

use crate::api::params::{
    CoinGeckoListParams, FinvizParams, OptionsRecommendationParams, TrendingOptionsParams,
};
use crate::api::{RequestError, TradingApi, DEFAULT_LIMIT, DEFAULT_TOP_LIMIT};
use crate::fetch::{Refresh, Resource};
use crate::models::{
    market_records, FinvizRecommendation, ForexData, FuturesData, GroupData, HealthResponse,
    HighOpenInterestResponse, InsiderData, KrakenAssetPair, KrakenOrderBook, KrakenTicker,
    ListEntry, MarketOverview, MarketRecord, NewsItem, OptionType, SystemMetrics, SystemStatus,
    TrendingItem, TrendingOptionsResponse,
};

/// Nombre de paires tendance affichées sur l'onglet Kraken
pub const KRAKEN_TRENDING_LIMIT: usize = 20;

/// Lie un TradingApi et un runtime tokio pour créer des Resource
#[derive(Clone)]
pub struct Binder {
    api: TradingApi,
    runtime: Handle,
}

impl Binder {
    pub fn new(api: TradingApi, runtime: Handle) -> Self {
        Self { api, runtime }
    }

    /// Crée une Resource dont le fetcher reçoit un clone du client
    ///
    /// CONCEPT RUST : Closures et move
    /// - Le client est capturé par la closure (move)
    /// - Chaque appel clone l'Arc interne pour la future 'static
    pub fn bind<T, F, Fut>(&self, name: &'static str, call: F) -> Resource<T>
    where
        T: Send + 'static,
        F: Fn(TradingApi) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        let api = self.api.clone();
        Resource::new(name, self.runtime.clone(), move || call(api.clone()))
    }
}

// ============================================================================
// Overview
// ============================================================================

pub struct OverviewSection {
    pub market: Resource<MarketOverview>,
    pub context: Resource<String>,
    pub gainers: Resource<Vec<MarketRecord>>,
    pub losers: Resource<Vec<MarketRecord>>,
}

impl OverviewSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            market: binder.bind("overview.market", |api| async move { api.market_overview().await }),
            context: binder.bind("overview.context", |api| async move { api.market_context().await }),
            gainers: binder.bind("overview.gainers", |api| async move {
                api.kraken_top_gainers(DEFAULT_LIMIT).await.map(market_records)
            }),
            losers: binder.bind("overview.losers", |api| async move {
                api.kraken_top_losers(DEFAULT_LIMIT).await.map(market_records)
            }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![
            &mut self.market as &mut dyn Refresh,
            &mut self.context,
            &mut self.gainers,
            &mut self.losers,
        ]
    }
}

// ============================================================================
// Crypto
// ============================================================================

pub struct CryptoSection {
    pub top: Resource<Vec<MarketRecord>>,
    pub trending: Resource<Vec<MarketRecord>>,
    pub coingecko_trending: Resource<Vec<TrendingItem>>,
    pub coingecko_top: Resource<Vec<MarketRecord>>,
    pub listed: Resource<Vec<ListEntry>>,
}

impl CryptoSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            top: binder.bind("crypto.top", |api| async move {
                api.kraken_top_cryptocurrencies(DEFAULT_TOP_LIMIT)
                    .await
                    .map(market_records)
            }),
            trending: binder.bind("crypto.trending", |api| async move {
                api.kraken_trending_crypto(DEFAULT_LIMIT).await.map(market_records)
            }),
            coingecko_trending: binder.bind("crypto.coingecko_trending", |api| async move {
                api.coingecko_trending().await
            }),
            coingecko_top: binder.bind("crypto.coingecko_top", |api| async move {
                api.coingecko_top(&CoinGeckoListParams::default()).await
            }),
            listed: binder.bind("crypto.listed", |api| async move { api.crypto(DEFAULT_LIMIT).await }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![
            &mut self.top as &mut dyn Refresh,
            &mut self.trending,
            &mut self.coingecko_trending,
            &mut self.coingecko_top,
            &mut self.listed,
        ]
    }
}

// ============================================================================
// Stocks
// ============================================================================

pub struct StocksSection {
    pub trending: Resource<Vec<ListEntry>>,
    pub reddit: Resource<Vec<ListEntry>>,
    pub finviz: Resource<Vec<FinvizRecommendation>>,
    pub forex: Resource<Vec<ForexData>>,
    pub futures: Resource<Vec<FuturesData>>,
    pub groups: Resource<Vec<GroupData>>,
    pub insider: Resource<Vec<InsiderData>>,
}

impl StocksSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            trending: binder.bind("stocks.trending", |api| async move {
                api.trending_stocks(DEFAULT_LIMIT).await
            }),
            reddit: binder.bind("stocks.reddit", |api| async move {
                api.reddit_stocks(DEFAULT_LIMIT).await
            }),
            finviz: binder.bind("stocks.finviz", |api| async move {
                let params = FinvizParams {
                    limit: Some(DEFAULT_LIMIT as u32),
                    ..Default::default()
                };
                api.finviz_recommendations(&params).await
            }),
            forex: binder.bind("stocks.forex", |api| async move { api.forex(DEFAULT_LIMIT).await }),
            futures: binder.bind("stocks.futures", |api| async move {
                api.futures(DEFAULT_LIMIT).await
            }),
            groups: binder.bind("stocks.groups", |api| async move { api.groups(DEFAULT_LIMIT).await }),
            insider: binder.bind("stocks.insider", |api| async move {
                api.insider(DEFAULT_LIMIT).await
            }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![
            &mut self.trending as &mut dyn Refresh,
            &mut self.reddit,
            &mut self.finviz,
            &mut self.forex,
            &mut self.futures,
            &mut self.groups,
            &mut self.insider,
        ]
    }
}

// ============================================================================
// Options
// ============================================================================

pub struct OptionsSection {
    pub trending: Resource<TrendingOptionsResponse>,
    pub recommendations: Resource<Vec<ListEntry>>,
}

impl OptionsSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            trending: binder.bind("options.trending", |api| async move {
                let params = TrendingOptionsParams {
                    limit: Some(DEFAULT_LIMIT as u32),
                    ..Default::default()
                };
                api.trending_options(&params).await
            }),
            recommendations: binder.bind("options.recommendations", |api| async move {
                let params = OptionsRecommendationParams {
                    limit: Some(DEFAULT_LIMIT as u32),
                    ..Default::default()
                };
                api.options_recommendations(&params).await
            }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![&mut self.trending as &mut dyn Refresh, &mut self.recommendations]
    }
}

// ============================================================================
// Kraken
// ============================================================================
// Le ticker et l'order book dépendent de la paire et de la profondeur :
// changer ces paramètres recrée les deux Resource (l'ancienne est détruite,
// ses requêtes en vol sont annulées).
// ============================================================================

pub struct KrakenSection {
    pub pairs: Resource<Vec<KrakenAssetPair>>,
    pub ticker: Resource<KrakenTicker>,
    pub order_book: Resource<KrakenOrderBook>,
    pub trending: Resource<Vec<ListEntry>>,
}

impl KrakenSection {
    pub fn new(binder: &Binder, pair: &str, depth: u32) -> Self {
        Self {
            pairs: binder.bind("kraken.pairs", |api| async move { api.kraken_pairs().await }),
            ticker: Self::ticker(binder, pair),
            order_book: Self::order_book(binder, pair, depth),
            trending: binder.bind("kraken.trending", |api| async move {
                api.kraken_trending(Some(KRAKEN_TRENDING_LIMIT)).await
            }),
        }
    }

    pub fn ticker(binder: &Binder, pair: &str) -> Resource<KrakenTicker> {
        let pair = pair.to_string();
        binder.bind("kraken.ticker", move |api| {
            let pair = pair.clone();
            async move { api.kraken_ticker_by_pair(&pair).await }
        })
    }

    pub fn order_book(binder: &Binder, pair: &str, depth: u32) -> Resource<KrakenOrderBook> {
        let pair = pair.to_string();
        binder.bind("kraken.order_book", move |api| {
            let pair = pair.clone();
            async move { api.kraken_order_book(&pair, Some(depth)).await }
        })
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![
            &mut self.pairs as &mut dyn Refresh,
            &mut self.ticker,
            &mut self.order_book,
            &mut self.trending,
        ]
    }
}

// ============================================================================
// High Open Interest
// ============================================================================

pub struct OpenInterestSection {
    pub single: Resource<HighOpenInterestResponse>,
    pub batch: Resource<Vec<HighOpenInterestResponse>>,
}

impl OpenInterestSection {
    pub fn new(binder: &Binder, ticker: &str, batch: &[String], option_type: OptionType) -> Self {
        Self {
            single: Self::single(binder, ticker, option_type),
            batch: Self::batch(binder, batch, option_type),
        }
    }

    pub fn single(
        binder: &Binder,
        ticker: &str,
        option_type: OptionType,
    ) -> Resource<HighOpenInterestResponse> {
        let ticker = ticker.to_string();
        binder.bind("open_interest.single", move |api| {
            let ticker = ticker.clone();
            async move { api.high_open_interest(&ticker, option_type).await }
        })
    }

    pub fn batch(
        binder: &Binder,
        tickers: &[String],
        option_type: OptionType,
    ) -> Resource<Vec<HighOpenInterestResponse>> {
        let tickers = tickers.to_vec();
        binder.bind("open_interest.batch", move |api| {
            let tickers = tickers.clone();
            async move { api.high_open_interest_batch(&tickers, option_type).await }
        })
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![&mut self.single as &mut dyn Refresh, &mut self.batch]
    }
}

// ============================================================================
// System
// ============================================================================

pub struct SystemSection {
    pub health: Resource<HealthResponse>,
    pub status: Resource<SystemStatus>,
    pub metrics: Resource<SystemMetrics>,
}

impl SystemSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            health: binder.bind("system.health", |api| async move { api.health().await }),
            status: binder.bind("system.status", |api| async move { api.system_status().await }),
            metrics: binder.bind("system.metrics", |api| async move { api.system_metrics().await }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![
            &mut self.health as &mut dyn Refresh,
            &mut self.status,
            &mut self.metrics,
        ]
    }
}

// ============================================================================
// News
// ============================================================================

pub struct NewsSection {
    pub items: Resource<Vec<NewsItem>>,
}

impl NewsSection {
    pub fn new(binder: &Binder) -> Self {
        Self {
            items: binder.bind("news.items", |api| async move { api.news().await }),
        }
    }

    pub fn resources(&mut self) -> Vec<&mut dyn Refresh> {
        vec![&mut self.items as &mut dyn Refresh]
    }
}

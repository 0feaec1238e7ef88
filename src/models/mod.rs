// ============================================================================
// Module : models
// ============================================================================
// Formes des réponses de l'API de trading, et view models affichés
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Les "pub use" permettent d'écrire tradinghub::models::NewsItem
// ============================================================================

pub mod kraken;  // Tickers, paires, order book
pub mod market;  // CoinGecko + MarketRecord
pub mod news;    // NewsItem, Sentiment
pub mod options; // Open interest, options tendance
pub mod stocks;  // Listes d'actions, Finviz, Yahoo, forex...
pub mod system;  // Health, status, metrics

pub use kraken::{KrakenAsset, KrakenAssetPair, KrakenMarketData, KrakenOrderBook, KrakenTicker};
pub use market::{
    market_records, CoinGeckoCoin, CryptoQuote, MarketOverview, MarketRecord, Sparkline,
    TrendingItem,
};
pub use news::{NewsItem, Sentiment};
pub use options::{
    HighOpenInterestResponse, HighOpenInterestResult, OptionContract, OptionType,
    TrendingOptionsResponse, TrendingOptionsResult, TrendingOptionsSummary,
};
pub use stocks::{
    number_from_value, FinvizCandidate, FinvizRecommendation, ForexData, FuturesData, GroupData, InsiderData,
    ListEntry, MarketDataItem, Quote, RiskMetrics, YahooMetrics, YahooRankResult,
};
pub use system::{HealthResponse, MemoryUsage, ServiceHealth, SystemMetrics, SystemStatus};

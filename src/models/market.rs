// ============================================================================
// Structure : MarketRecord
// ============================================================================
// Enregistrement de marché normalisé, indépendant de la source amont.
//
// Deux formes amont coexistent :
// - le ticker d'échange Kraken (identifié par "pair")
// - la fiche CoinGecko (identifiée par "id")
//
// CONCEPT RUST : Enum comme union taguée
// - CryptoQuote décide UNE fois "quelle forme est-ce ?"
// - Le rendu ne voit ensuite que des MarketRecord
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::kraken::KrakenMarketData;

/// Fiche CoinGecko (endpoints legacy /coingecko/*)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinGeckoCoin {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub current_price: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub ath: Option<f64>,
    pub atl: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub last_updated: Option<String>,
    pub price_change_percentage_7d_in_currency: Option<f64>,
    pub price_change_percentage_30d_in_currency: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,
    pub sparkline_in_7d: Option<Sparkline>,
}

/// Série de prix sur 7 jours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// Vue d'ensemble du marché crypto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    #[serde(default)]
    pub total_market_cap: f64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub bitcoin_dominance: f64,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub volume_percentage: HashMap<String, f64>,
}

/// Crypto tendance selon CoinGecko
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingItem {
    pub id: String,
    #[serde(default)]
    pub coin_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub price_btc: f64,
    #[serde(default)]
    pub score: f64,
}

/// Cotation crypto dans l'une des deux formes amont
///
/// CONCEPT RUST : #[serde(untagged)]
/// - Serde essaie chaque variante dans l'ordre
/// - Kraken en premier : "pair" est son champ obligatoire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CryptoQuote {
    Kraken(KrakenMarketData),
    CoinGecko(CoinGeckoCoin),
}

/// Enregistrement normalisé consommé par les tableaux
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRecord {
    /// Identifiant stable (paire Kraken ou id CoinGecko)
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_pct_24h: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub rank: Option<u32>,
}

impl MarketRecord {
    /// Vrai si la variation 24h est connue et positive
    pub fn is_up(&self) -> bool {
        self.change_pct_24h.map(|c| c > 0.0).unwrap_or(false)
    }
}

impl From<KrakenMarketData> for MarketRecord {
    fn from(data: KrakenMarketData) -> Self {
        Self {
            id: data.pair.clone(),
            symbol: data.pair.clone(),
            name: data.display_name().to_string(),
            price: data.price,
            change_24h: data.change_24h,
            change_pct_24h: data.change_pct_24h,
            volume: data.volume,
            // Kraken ne fournit pas de capitalisation
            market_cap: None,
            rank: None,
        }
    }
}

impl From<CoinGeckoCoin> for MarketRecord {
    fn from(coin: CoinGeckoCoin) -> Self {
        Self {
            id: coin.id,
            symbol: coin.symbol,
            name: coin.name,
            price: coin.current_price,
            change_24h: coin.price_change_24h,
            change_pct_24h: coin.price_change_percentage_24h,
            volume: coin.total_volume,
            market_cap: coin.market_cap,
            rank: coin.market_cap_rank,
        }
    }
}

impl From<CryptoQuote> for MarketRecord {
    fn from(quote: CryptoQuote) -> Self {
        match quote {
            CryptoQuote::Kraken(data) => data.into(),
            CryptoQuote::CoinGecko(coin) => coin.into(),
        }
    }
}

/// Normalise une liste hétérogène en enregistrements, rang par position si absent
pub fn market_records<I>(quotes: I) -> Vec<MarketRecord>
where
    I: IntoIterator,
    I::Item: Into<MarketRecord>,
{
    quotes
        .into_iter()
        .enumerate()
        .map(|(index, quote)| {
            let mut record: MarketRecord = quote.into();
            record.rank = record.rank.or(Some(index as u32 + 1));
            record
        })
        .collect()
}

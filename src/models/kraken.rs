// ============================================================================
// Structures : données Kraken
// ============================================================================
// Formes renvoyées par les endpoints /kraken/* de l'API de trading.
//
// CONCEPT RUST : Option<T> pour les champs absents
// - Un champ Option manquant dans le JSON est désérialisé en None
// - On distingue ainsi "absent" de "zéro" lors de l'affichage
// ============================================================================

use serde::{Deserialize, Serialize};

/// Ticker 24h d'une paire Kraken (ex: "XBTUSD")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrakenTicker {
    /// Identifiant de la paire
    pub pair: String,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    /// Variation absolue sur 24h
    pub change_24h: Option<f64>,
    /// Variation en pourcentage sur 24h
    pub change_pct_24h: Option<f64>,
}

/// Ticker Kraken enrichi d'un nom et d'un symbole d'affichage
///
/// Produit par la normalisation (gainers, losers, top volume, trending)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrakenMarketData {
    pub pair: String,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_pct_24h: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl KrakenMarketData {
    /// Nom d'affichage : le nom s'il existe, sinon la paire
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.pair)
    }
}

impl From<KrakenTicker> for KrakenMarketData {
    /// Le nom et le symbole d'affichage sont la paire elle-même
    fn from(ticker: KrakenTicker) -> Self {
        Self {
            name: Some(ticker.pair.clone()),
            symbol: Some(ticker.pair.clone()),
            pair: ticker.pair,
            price: ticker.price,
            volume: ticker.volume,
            high_24h: ticker.high_24h,
            low_24h: ticker.low_24h,
            change_24h: ticker.change_24h,
            change_pct_24h: ticker.change_pct_24h,
        }
    }
}

/// Actif coté sur Kraken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrakenAsset {
    pub name: String,
    #[serde(default)]
    pub altname: String,
    #[serde(default)]
    pub aclass: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub display_decimals: u32,
}

/// Paire tradable sur Kraken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrakenAssetPair {
    pub name: String,
    #[serde(default)]
    pub altname: String,
    #[serde(default)]
    pub aclass_base: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub aclass_quote: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub pair_decimals: u32,
    #[serde(default)]
    pub lot_decimals: u32,
    #[serde(default)]
    pub lot_multiplier: u32,
    pub ordermin: Option<String>,
    pub wsname: Option<String>,
}

/// Carnet d'ordres d'une paire : niveaux [prix, quantité]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrakenOrderBook {
    pub pair: String,
    #[serde(default)]
    pub bids: Vec<[f64; 2]>,
    #[serde(default)]
    pub asks: Vec<[f64; 2]>,
    #[serde(default)]
    pub timestamp: f64,
}

impl KrakenOrderBook {
    /// Écart entre la meilleure offre et la meilleure demande
    pub fn spread(&self) -> Option<f64> {
        let best_bid = self.bids.first()?[0];
        let best_ask = self.asks.first()?[0];
        Some(best_ask - best_bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_missing_fields_are_none() {
        let ticker: KrakenTicker =
            serde_json::from_str(r#"{"pair":"XBTUSD","change_pct_24h":5}"#).unwrap();
        assert_eq!(ticker.change_pct_24h, Some(5.0));
        assert_eq!(ticker.volume, None);
        assert_eq!(ticker.price, None);
    }

    #[test]
    fn test_market_data_from_ticker() {
        let ticker: KrakenTicker =
            serde_json::from_str(r#"{"pair":"ETHUSD","price":3000.5}"#).unwrap();
        let data = KrakenMarketData::from(ticker);
        assert_eq!(data.name.as_deref(), Some("ETHUSD"));
        assert_eq!(data.symbol.as_deref(), Some("ETHUSD"));
        assert_eq!(data.price, Some(3000.5));
    }

    #[test]
    fn test_order_book_spread() {
        let book: KrakenOrderBook = serde_json::from_str(
            r#"{"pair":"XBTUSD","bids":[[100.0,1.5]],"asks":[[101.5,2.0]],"timestamp":1700000000}"#,
        )
        .unwrap();
        assert_eq!(book.spread(), Some(1.5));
    }
}

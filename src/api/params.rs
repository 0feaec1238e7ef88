// ============================================================================
// Query parameters
// ============================================================================
// Construit les paramètres de requête des endpoints.
// Règle : seules les clés DÉFINIES sont sérialisées. Un champ à None
// n'apparaît jamais dans l'URL.
//
// CONCEPT RUST : Serialize comme "réflexion"
// - Les structs de paramètres dérivent Serialize
// - On les convertit en serde_json::Value puis on itère sur l'objet
// - Les valeurs null (Option::None) sont ignorées
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::api::error::RequestError;

/// Liste ordonnée de paires (clé, valeur) pour la query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une paire
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Ajoute une paire uniquement si la valeur est définie
    pub fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Construit les paramètres depuis une struct sérialisable
    ///
    /// Les champs null sont omis ; les nombres et booléens sont convertis
    /// en texte ("10", "0.05", "true").
    pub fn from_serialize<T: Serialize>(params: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(params)?;

        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(RequestError::Url(format!(
                    "query parameters must be an object, got {}",
                    other
                )))
            }
        };

        let pairs = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(text) => Some((key, text)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self { pairs })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Valeur associée à une clé (première occurrence)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Structs de paramètres des endpoints
// ============================================================================

/// Paramètres des listes CoinGecko (gainers, losers, top)
///
/// Tous les champs ont une valeur par défaut et sont toujours envoyés
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinGeckoListParams {
    pub limit: u32,
    pub vs_currency: String,
    pub order: String,
    pub page: u32,
    pub sparkline: bool,
    pub price_change_percentage: String,
}

impl CoinGeckoListParams {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

impl Default for CoinGeckoListParams {
    fn default() -> Self {
        Self {
            limit: 10,
            vs_currency: "usd".to_string(),
            order: "desc".to_string(),
            page: 1,
            sparkline: false,
            price_change_percentage: "24h".to_string(),
        }
    }
}

/// Paramètres de /options/recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionsRecommendationParams {
    pub symbol: Option<String>,
    pub symbols: Option<String>,
    pub symbols_source: Option<String>,
    pub yahoo_search: Option<String>,
    pub yahoo_limit: Option<u32>,
    pub yahoo_list: Option<String>,
    pub yahoo_region: Option<String>,
    pub side: Option<String>,
    pub min_dte: Option<u32>,
    pub max_dte: Option<u32>,
    pub limit: Option<u32>,
    pub rf_annual: Option<f64>,
    pub range: Option<String>,
    pub interval: Option<String>,
    pub sharpe_w: Option<f64>,
    pub sortino_w: Option<f64>,
    pub calmar_w: Option<f64>,
    pub min_delta: Option<f64>,
    pub max_delta: Option<f64>,
    pub min_premium: Option<f64>,
    pub max_premium: Option<f64>,
    pub min_volume: Option<u64>,
    pub min_strike_ratio: Option<f64>,
    pub max_strike_ratio: Option<f64>,
    pub signal: Option<String>,
    pub order: Option<String>,
    pub screener: Option<String>,
    pub symbols_limit: Option<u32>,
    pub per_symbol_limit: Option<u32>,
    pub max_spread_pct: Option<f64>,
    pub feed: Option<String>,
    #[serde(rename = "type")]
    pub option_type: Option<String>,
    pub strike_price_gte: Option<f64>,
    pub strike_price_lte: Option<f64>,
    pub expiration_date: Option<String>,
    pub expiration_date_gte: Option<String>,
    pub expiration_date_lte: Option<String>,
    pub root_symbol: Option<String>,
    pub page_token: Option<String>,
    pub alpaca_limit: Option<u32>,
    pub underlying_top: Option<u32>,
    pub debug: Option<bool>,
}

/// Paramètres de /trending-options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendingOptionsParams {
    pub option_type: Option<String>,
    pub rf_annual: Option<f64>,
    pub range: Option<String>,
    pub interval: Option<String>,
    pub sharpe_w: Option<f64>,
    pub sortino_w: Option<f64>,
    pub calmar_w: Option<f64>,
    pub limit: Option<u32>,
    pub min_underlying_score: Option<f64>,
    pub min_undervalued_score: Option<f64>,
}

/// Paramètres de /recommendations/finviz
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinvizParams {
    pub signal: Option<String>,
    pub order: Option<String>,
    pub screener: Option<String>,
    pub limit: Option<u32>,
    pub range: Option<String>,
    pub interval: Option<String>,
    pub rf_annual: Option<f64>,
    pub target_return_annual: Option<f64>,
    pub periods_per_year: Option<u32>,
}

/// Paramètres de /screener/candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreenerParams {
    pub signal: Option<String>,
    pub order: Option<String>,
    pub screener: Option<String>,
    pub limit: Option<u32>,
}

/// Paramètres des endpoints Yahoo (recommandations, métriques, classement)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YahooParams {
    pub symbols: Option<String>,
    pub range: Option<String>,
    pub interval: Option<String>,
    pub rf_annual: Option<f64>,
    pub target_return_annual: Option<f64>,
    pub periods_per_year: Option<u32>,
}

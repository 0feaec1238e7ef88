// ============================================================================
// Structures : actions, screeners, forex, futures
// ============================================================================
// Les listes "trending", "reddit", "crypto" et les recommandations n'ont pas
// de forme fixe : un élément peut être une simple chaîne ("AAPL") ou un objet
// dont la clé du symbole est "symbol" OU "ticker".
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::news::Sentiment;

/// Nombre JSON, chaîne numérique ("200.5") ou rien
///
/// Les valeurs non finies et les autres formes donnent None.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// CONCEPT RUST : deserialize_with
/// - Un champ numérique mal typé devient None au lieu de faire échouer
///   toute la liste
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Élément générique de données de marché
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketDataItem {
    pub symbol: Option<String>,
    pub ticker: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mentions: Option<f64>,
    pub signal: Option<String>,
    pub description: Option<String>,
}

/// Élément de liste hétérogène : chaîne nue, objet, ou autre chose
///
/// CONCEPT RUST : #[serde(untagged)]
/// - Une chaîne JSON devient Symbol, un objet devient Item
/// - Other garde tout le reste tel quel : un élément inattendu ne fait
///   jamais échouer la liste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEntry {
    Symbol(String),
    Item(MarketDataItem),
    Other(Value),
}

impl ListEntry {
    /// Symbole d'affichage : chaîne, puis "symbol", puis "ticker"
    pub fn symbol(&self) -> Option<&str> {
        match self {
            ListEntry::Symbol(symbol) => Some(symbol.as_str()),
            ListEntry::Item(item) => item.symbol.as_deref().or(item.ticker.as_deref()),
            ListEntry::Other(value) => ["symbol", "ticker"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str)),
        }
    }

    /// Symbole d'affichage avec un libellé de repli numéroté
    pub fn label(&self, fallback: &str, index: usize) -> String {
        self.symbol()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", fallback, index + 1))
    }

    /// Objet détaillé, s'il y en a un
    pub fn item(&self) -> Option<&MarketDataItem> {
        match self {
            ListEntry::Item(item) => Some(item),
            ListEntry::Symbol(_) | ListEntry::Other(_) => None,
        }
    }
}

/// Candidat du screener Finviz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinvizCandidate {
    pub ticker: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub country: String,
    pub market_cap: Option<f64>,
    pub pe: Option<f64>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
}

/// Recommandation Finviz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinvizRecommendation {
    pub ticker: String,
    #[serde(default)]
    pub recommendation: String,
    pub price_target: Option<f64>,
    pub upside: Option<f64>,
    pub analysts: Option<u32>,
    pub rating: Option<f64>,
}

/// Ratios de risque/rendement calculés sur historique Yahoo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskMetrics {
    #[serde(default)]
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub sortino_ratio: f64,
    #[serde(default)]
    pub calmar_ratio: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub volatility: f64,
    #[serde(default)]
    pub annual_return: f64,
    #[serde(default)]
    pub composite_score: f64,
}

/// Résultat de classement / métriques Yahoo pour un symbole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YahooRankResult {
    pub symbol: String,
    #[serde(default)]
    pub metrics: RiskMetrics,
}

/// Réponse de /metrics/yahoo
pub type YahooMetrics = YahooRankResult;

/// Cotation simple (forex, futures)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

pub type ForexData = Quote;
pub type FuturesData = Quote;

/// Transaction d'initié
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderData {
    pub ticker: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub transaction: String,
    pub shares: Option<f64>,
    pub value: Option<f64>,
}

/// Performance d'un groupe (secteur, industrie)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub name: String,
    pub performance: Option<f64>,
    pub volume: Option<f64>,
}

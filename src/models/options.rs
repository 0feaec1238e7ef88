// ============================================================================
// Structures : options (open interest, trending options)
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type d'option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

impl OptionType {
    /// Valeur attendue dans la query string
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }

    /// Bascule call <-> put
    pub fn toggled(self) -> Self {
        match self {
            OptionType::Call => OptionType::Put,
            OptionType::Put => OptionType::Call,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contrat d'option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    #[serde(default)]
    pub underlying_symbol: String,
    #[serde(default)]
    pub strike_price: f64,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(rename = "type", default)]
    pub contract_type: String,
    pub ask_price: Option<f64>,
    pub bid_price: Option<f64>,
    pub last_price: Option<f64>,
    pub open_interest: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub close_price: Option<f64>,
    pub close_price_date: Option<String>,
    pub open_interest_date: Option<String>,
}

/// Contrats à fort open interest d'un sous-jacent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HighOpenInterestResult {
    pub short_term: Option<OptionContract>,
    pub leap: Option<OptionContract>,
    pub error: Option<String>,
}

/// Réponse de /high-open-interest/{ticker}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighOpenInterestResponse {
    pub ticker: String,
    #[serde(default)]
    pub result: HighOpenInterestResult,
}

/// Un résultat de /trending-options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingOptionsResult {
    pub symbol: Option<String>,
    pub ticker: Option<String>,
    pub underlying_score: Option<f64>,
    pub undervalued_score: Option<f64>,
    pub description: Option<String>,
}

impl TrendingOptionsResult {
    /// Symbole ou ticker, selon la clé présente
    pub fn label(&self, index: usize) -> String {
        self.symbol
            .clone()
            .or_else(|| self.ticker.clone())
            .unwrap_or_else(|| format!("Option {}", index + 1))
    }
}

/// Résumé de l'analyse trending-options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingOptionsSummary {
    #[serde(default)]
    pub total_analyzed: u64,
    #[serde(default)]
    pub total_with_options: u64,
    #[serde(default)]
    pub average_underlying_score: f64,
    #[serde(default)]
    pub average_undervalued_score: f64,
    #[serde(default)]
    pub top_underlying_tickers: Vec<String>,
    #[serde(default)]
    pub top_undervalued_tickers: Vec<String>,
}

/// Réponse de /trending-options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingOptionsResponse {
    #[serde(default)]
    pub results: Vec<TrendingOptionsResult>,
    #[serde(default)]
    pub summary: TrendingOptionsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_toggle() {
        assert_eq!(OptionType::Call.toggled(), OptionType::Put);
        assert_eq!(OptionType::Put.toggled().as_str(), "call");
    }

    #[test]
    fn test_high_open_interest_with_error() {
        let response: HighOpenInterestResponse =
            serde_json::from_str(r#"{"ticker":"ZZZZ","result":{"error":"no options"}}"#).unwrap();
        assert!(response.result.short_term.is_none());
        assert_eq!(response.result.error.as_deref(), Some("no options"));
    }

    #[test]
    fn test_contract_type_rename() {
        let contract: OptionContract = serde_json::from_str(
            r#"{"symbol":"AAPL240119C00150000","strike_price":150,"expiration_date":"2024-01-19","type":"call"}"#,
        )
        .unwrap();
        assert_eq!(contract.contract_type, "call");
    }
}

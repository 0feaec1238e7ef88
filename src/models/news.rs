// ============================================================================
// Structure : NewsItem
// ============================================================================
// Article de news normalisé. Les sources amont utilisent deux jeux de clés
// (title/summary/timestamp ou headline/content/created_at) : la conversion se
// fait dans api::normalize, ici on ne garde que la forme finale.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Sentiment associé à un article ou à un titre
///
/// CONCEPT RUST : #[serde(other)]
/// - Toute valeur inconnue est désérialisée en Neutral au lieu d'échouer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    #[serde(other)]
    Neutral,
}

impl Sentiment {
    /// Libellé pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Article de news prêt à afficher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub timestamp: String,
    pub sentiment: Sentiment,
    pub url: String,
    pub author: String,
}

impl NewsItem {
    /// Date de publication au format court, ou le timestamp brut s'il est illisible
    pub fn display_date(&self) -> String {
        match chrono::DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(date) => date.format("%Y-%m-%d").to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentiment_is_neutral() {
        let sentiment: Sentiment = serde_json::from_str(r#""bullish""#).unwrap();
        assert_eq!(sentiment, Sentiment::Neutral);

        let sentiment: Sentiment = serde_json::from_str(r#""negative""#).unwrap();
        assert_eq!(sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_display_date() {
        let item = NewsItem {
            title: "t".to_string(),
            summary: "s".to_string(),
            source: "src".to_string(),
            timestamp: "2024-03-05T14:30:00Z".to_string(),
            sentiment: Sentiment::Neutral,
            url: "#".to_string(),
            author: "a".to_string(),
        };
        assert_eq!(item.display_date(), "2024-03-05");
    }
}

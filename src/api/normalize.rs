// ============================================================================
// Normalisation des réponses
// ============================================================================
// Transforme les formes amont hétérogènes en view models uniformes.
// Toutes les fonctions sont pures et déterministes : même JSON en entrée,
// même sortie. Aucune ne fait d'I/O.
//
// CONCEPT RUST : Iterators
// - filter / sort_by / truncate / map au lieu de boucles indexées
// - sort_by est stable : l'ordre amont est conservé en cas d'égalité
// ============================================================================

use std::cmp::Ordering;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{number_from_value, KrakenMarketData, KrakenTicker, NewsItem, Sentiment};

/// Identité utilisée quand l'amont n'en fournit aucune
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// Enveloppe {success, data}
// ============================================================================

/// Retire un niveau d'enveloppe optionnel
///
/// Un objet qui porte À LA FOIS les clés "success" et "data" est remplacé par
/// la valeur de "data" ; toute autre valeur est renvoyée telle quelle.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("success") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ============================================================================
// Tickers Kraken
// ============================================================================

/// Décode les tickers un par un ; un ticker mal formé est ignoré
pub fn kraken_tickers(items: Vec<Value>) -> Vec<KrakenTicker> {
    let total = items.len();
    let tickers: Vec<KrakenTicker> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(ticker) => Some(ticker),
            Err(e) => {
                warn!(error = %e, "Skipped malformed Kraken ticker");
                None
            }
        })
        .collect();

    if tickers.len() < total {
        debug!(skipped = total - tickers.len(), total, "Skipped Kraken tickers");
    }
    tickers
}

/// Plus fortes hausses : variation > 0, tri décroissant, n premiers
pub fn top_gainers(tickers: Vec<KrakenTicker>, limit: usize) -> Vec<KrakenMarketData> {
    let mut gainers: Vec<KrakenTicker> = tickers
        .into_iter()
        .filter(|t| t.change_pct_24h.map(|c| c > 0.0).unwrap_or(false))
        .collect();

    gainers.sort_by(|a, b| compare_desc(a.change_pct_24h, b.change_pct_24h));
    finish(gainers, limit)
}

/// Plus fortes baisses : variation < 0, tri croissant (plus négatif d'abord)
pub fn top_losers(tickers: Vec<KrakenTicker>, limit: usize) -> Vec<KrakenMarketData> {
    let mut losers: Vec<KrakenTicker> = tickers
        .into_iter()
        .filter(|t| t.change_pct_24h.map(|c| c < 0.0).unwrap_or(false))
        .collect();

    losers.sort_by(|a, b| compare_desc(b.change_pct_24h, a.change_pct_24h));
    finish(losers, limit)
}

/// Plus gros volumes : tri décroissant, volumes absents en dernier
pub fn top_by_volume(mut tickers: Vec<KrakenTicker>, limit: usize) -> Vec<KrakenMarketData> {
    tickers.sort_by(|a, b| compare_desc(a.volume, b.volume));
    finish(tickers, limit)
}

/// Ordre décroissant, None toujours en dernier
fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn finish(mut tickers: Vec<KrakenTicker>, limit: usize) -> Vec<KrakenMarketData> {
    tickers.truncate(limit);
    tickers.into_iter().map(KrakenMarketData::from).collect()
}

/// Normalise les éléments de /kraken/trending dont la forme est inconnue
///
/// Chaque champ absent est remplacé par une valeur par défaut :
/// 0 pour les nombres, "Unknown" pour l'identité.
pub fn trending_crypto(items: Vec<Value>, limit: usize) -> Vec<KrakenMarketData> {
    items
        .iter()
        .take(limit)
        .map(|item| {
            let pair = first_text(item, &["pair", "name"]).unwrap_or_else(|| UNKNOWN.to_string());
            KrakenMarketData {
                price: Some(number_or_zero(item, "price")),
                volume: Some(number_or_zero(item, "volume")),
                high_24h: Some(number_or_zero(item, "high_24h")),
                low_24h: Some(number_or_zero(item, "low_24h")),
                change_24h: Some(number_or_zero(item, "change_24h")),
                change_pct_24h: Some(number_or_zero(item, "change_pct_24h")),
                name: Some(pair.clone()),
                symbol: Some(pair.clone()),
                pair,
            }
        })
        .collect()
}

/// Premier champ texte non vide parmi les clés candidates
fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Nombre (ou texte numérique) du champ, 0 sinon
fn number_or_zero(item: &Value, key: &str) -> f64 {
    item.get(key).and_then(number_from_value).unwrap_or(0.0)
}

// ============================================================================
// News
// ============================================================================

/// Normalise la réponse de /news
///
/// Accepte une liste plate, ou un objet qui range la liste sous
/// `{source: {news: [...]}}` (ex: `alpaca.news`).
pub fn news_items(payload: Value) -> Vec<NewsItem> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(map) => nested_news(map),
        other => {
            warn!(kind = %json_kind(&other), "Unexpected news payload");
            Vec::new()
        }
    };

    let total = items.len();
    let news: Vec<NewsItem> = items.iter().filter_map(news_item).collect();

    if news.len() < total {
        debug!(skipped = total - news.len(), total, "Skipped non-object news entries");
    }
    news
}

/// Cherche la liste de news dans un objet source (alpaca en priorité)
fn nested_news(mut map: Map<String, Value>) -> Vec<Value> {
    if let Some(Value::Array(items)) = map.remove("news") {
        return items;
    }

    let source_key = if map.contains_key("alpaca") {
        Some("alpaca".to_string())
    } else {
        map.iter()
            .find(|(_, value)| matches!(value.get("news"), Some(Value::Array(_))))
            .map(|(key, _)| key.clone())
    };

    match source_key.and_then(|key| map.remove(&key)) {
        Some(Value::Object(mut source)) => match source.remove("news") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Convertit un article dans l'un des deux jeux de clés
///
/// - title     : "headline" si présent, sinon "title"
/// - summary   : "summary" non vide, sinon "content" si présent
/// - timestamp : "created_at" si présent, sinon "timestamp"
fn news_item(item: &Value) -> Option<NewsItem> {
    let map = item.as_object()?;

    let title = if map.contains_key("headline") {
        text(map.get("headline"))
    } else {
        text(map.get("title"))
    };

    let summary = match map.get("summary").and_then(Value::as_str) {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ if map.contains_key("content") => text(map.get("content")),
        _ => "No summary available".to_string(),
    };

    let source = match map.get("source").and_then(Value::as_str) {
        Some(source) if !source.is_empty() => source.to_string(),
        _ => "Unknown source".to_string(),
    };

    let timestamp = if map.contains_key("created_at") {
        text(map.get("created_at"))
    } else {
        text(map.get("timestamp"))
    };

    let sentiment = map
        .get("sentiment")
        .and_then(|value| serde_json::from_value::<Sentiment>(value.clone()).ok())
        .unwrap_or_default();

    let url = if map.contains_key("url") {
        text(map.get("url"))
    } else {
        "#".to_string()
    };

    let author = if map.contains_key("author") {
        text(map.get("author"))
    } else {
        "Unknown author".to_string()
    };

    Some(NewsItem {
        title,
        summary,
        source,
        timestamp,
        sentiment,
        url,
        author,
    })
}

/// Texte d'un champ ; chaîne vide s'il n'est pas textuel
fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_tickers_are_skipped() {
        let tickers = kraken_tickers(vec![
            json!({"pair": "XBTUSD", "change_pct_24h": 5}),
            json!({"change_pct_24h": 3}),
            json!("ETHUSD"),
            json!({"pair": "ADAUSD", "change_pct_24h": 10}),
        ]);

        let pairs: Vec<&str> = tickers.iter().map(|t| t.pair.as_str()).collect();
        assert_eq!(pairs, vec!["XBTUSD", "ADAUSD"]);
    }

    fn tickers(value: Value) -> Vec<KrakenTicker> {
        serde_json::from_value(value).unwrap()
    }

    fn scenario() -> Vec<KrakenTicker> {
        tickers(json!([
            {"pair": "XBTUSD", "change_pct_24h": 5},
            {"pair": "ETHUSD", "change_pct_24h": -2},
            {"pair": "ADAUSD", "change_pct_24h": 10}
        ]))
    }

    fn pairs(data: &[KrakenMarketData]) -> Vec<&str> {
        data.iter().map(|d| d.pair.as_str()).collect()
    }

    #[test]
    fn test_envelope_unwrapped() {
        let value = unwrap_envelope(json!({"success": true, "data": [1, 2, 3]}));
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_envelope_passthrough() {
        let raw = json!({"status": "ok"});
        assert_eq!(unwrap_envelope(raw.clone()), raw);

        // "success" seul ne suffit pas
        let partial = json!({"success": false, "message": "nope"});
        assert_eq!(unwrap_envelope(partial.clone()), partial);

        assert_eq!(unwrap_envelope(json!([1])), json!([1]));
    }

    #[test]
    fn test_envelope_with_failure_flag_still_unwrapped() {
        let value = unwrap_envelope(json!({"success": false, "data": null}));
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_scenario_gainers_and_losers() {
        let gainers = top_gainers(scenario(), 10);
        assert_eq!(pairs(&gainers), vec!["ADAUSD", "XBTUSD"]);
        assert_eq!(gainers[0].change_pct_24h, Some(10.0));
        assert_eq!(gainers[0].name.as_deref(), Some("ADAUSD"));
        assert_eq!(gainers[0].symbol.as_deref(), Some("ADAUSD"));

        let losers = top_losers(scenario(), 10);
        assert_eq!(pairs(&losers), vec!["ETHUSD"]);
        assert_eq!(losers[0].change_pct_24h, Some(-2.0));
    }

    #[test]
    fn test_losers_most_negative_first() {
        let list = tickers(json!([
            {"pair": "A", "change_pct_24h": -1.5},
            {"pair": "B", "change_pct_24h": -8},
            {"pair": "C", "change_pct_24h": 0},
            {"pair": "D", "change_pct_24h": -3},
            {"pair": "E"}
        ]));
        let losers = top_losers(list, 2);
        assert_eq!(pairs(&losers), vec!["B", "D"]);
    }

    #[test]
    fn test_gainers_respect_limit_and_order() {
        let list: Vec<KrakenTicker> = (0..30)
            .map(|i| KrakenTicker {
                pair: format!("P{}", i),
                price: None,
                volume: None,
                high_24h: None,
                low_24h: None,
                change_24h: None,
                change_pct_24h: Some((i as f64 * 7.3) % 11.0 - 5.0),
            })
            .collect();

        let gainers = top_gainers(list, 5);
        assert!(gainers.len() <= 5);
        for window in gainers.windows(2) {
            assert!(window[0].change_pct_24h >= window[1].change_pct_24h);
        }
        assert!(gainers.iter().all(|g| g.change_pct_24h.unwrap() > 0.0));
    }

    #[test]
    fn test_top_by_volume() {
        let list = tickers(json!([
            {"pair": "LOW", "volume": 10},
            {"pair": "NONE"},
            {"pair": "HIGH", "volume": 5000},
            {"pair": "MID", "volume": 300}
        ]));
        let top = top_by_volume(list.clone(), 10);
        assert_eq!(pairs(&top), vec!["HIGH", "MID", "LOW", "NONE"]);

        let top = top_by_volume(list, 2);
        assert_eq!(pairs(&top), vec!["HIGH", "MID"]);
    }

    #[test]
    fn test_trending_crypto_defaults() {
        let items = vec![
            json!({"pair": "SOLUSD", "price": 150.5, "volume": "1200"}),
            json!({"name": "DOGEUSD"}),
            json!({"pair": "", "change_pct_24h": 3}),
            json!({"pair": "IGNORED"}),
        ];
        let trending = trending_crypto(items, 3);

        assert_eq!(trending.len(), 3);
        assert_eq!(trending[0].pair, "SOLUSD");
        assert_eq!(trending[0].price, Some(150.5));
        assert_eq!(trending[0].volume, Some(1200.0));
        assert_eq!(trending[0].high_24h, Some(0.0));

        assert_eq!(trending[1].pair, "DOGEUSD");
        assert_eq!(trending[1].symbol.as_deref(), Some("DOGEUSD"));
        assert_eq!(trending[1].price, Some(0.0));

        assert_eq!(trending[2].pair, UNKNOWN);
        assert_eq!(trending[2].name.as_deref(), Some(UNKNOWN));
        assert_eq!(trending[2].change_pct_24h, Some(3.0));
    }

    #[test]
    fn test_news_alternate_keys() {
        let news = news_items(json!([{
            "headline": "Fed holds rates",
            "content": "The central bank kept rates unchanged.",
            "created_at": "2024-05-01T12:00:00Z"
        }]));

        assert_eq!(news.len(), 1);
        let item = &news[0];
        assert_eq!(item.title, "Fed holds rates");
        assert_eq!(item.summary, "The central bank kept rates unchanged.");
        assert_eq!(item.timestamp, "2024-05-01T12:00:00Z");
        assert_eq!(item.sentiment, Sentiment::Neutral);
        assert_eq!(item.url, "#");
        assert_eq!(item.author, "Unknown author");
        assert_eq!(item.source, "Unknown source");
    }

    #[test]
    fn test_news_nested_source_envelope() {
        let news = news_items(json!({
            "alpaca": {
                "news": [
                    {"headline": "A", "summary": "sum A", "source": "benzinga", "url": "https://x/a", "author": "Jane"},
                    {"headline": "B", "summary": ""}
                ]
            }
        }));

        assert_eq!(news.len(), 2);
        assert_eq!(news[0].summary, "sum A");
        assert_eq!(news[0].source, "benzinga");
        assert_eq!(news[0].url, "https://x/a");
        assert_eq!(news[0].author, "Jane");
        assert_eq!(news[1].summary, "No summary available");
    }

    #[test]
    fn test_news_other_source_key() {
        let news = news_items(json!({"benzinga": {"news": [{"title": "T", "timestamp": "ts", "sentiment": "positive"}]}}));
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].title, "T");
        assert_eq!(news[0].timestamp, "ts");
        assert_eq!(news[0].sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_news_unexpected_shapes() {
        assert!(news_items(json!("nope")).is_empty());
        assert!(news_items(json!({"meta": 1})).is_empty());
        assert_eq!(news_items(json!([1, "x", {"title": "ok"}])).len(), 1);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let payload = json!([
            {"headline": "H", "content": "C", "created_at": "t"},
            {"title": "T", "summary": "S", "timestamp": "u", "sentiment": "negative"}
        ]);
        let first = serde_json::to_string(&news_items(payload.clone())).unwrap();
        let second = serde_json::to_string(&news_items(payload)).unwrap();
        assert_eq!(first, second);
    }
}

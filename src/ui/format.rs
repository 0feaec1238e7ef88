// ============================================================================
// Formatage des valeurs affichées
// ============================================================================
// Une valeur absente s'affiche "N/A", jamais 0.
// ============================================================================

use ratatui::style::Color;

pub const MISSING: &str = "N/A";

/// Prix en dollars ; plus de décimales sous 1$
pub fn price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() < 1.0 => format!("${:.6}", v),
        Some(v) => format!("${:.2}", v),
        None => MISSING.to_string(),
    }
}

/// Variation en pourcentage avec flèche
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            let arrow = if v >= 0.0 { "▲" } else { "▼" };
            format!("{} {:+.2}%", arrow, v)
        }
        None => MISSING.to_string(),
    }
}

/// 1_234_567 -> "1.23M"
pub fn compact(value: Option<f64>) -> String {
    let Some(v) = value else {
        return MISSING.to_string();
    };

    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        format!("{:.2}", v)
    }
}

/// Vert si positif, rouge si négatif, gris si inconnu ou nul
pub fn change_color(value: Option<f64>) -> Color {
    match value {
        Some(v) if v > 0.0 => Color::Green,
        Some(v) if v < 0.0 => Color::Red,
        _ => Color::Gray,
    }
}

/// Coupe une chaîne à `max` caractères (avec "…")
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_not_zero() {
        assert_eq!(price(None), "N/A");
        assert_eq!(percent(None), "N/A");
        assert_eq!(compact(None), "N/A");
        assert_eq!(change_color(None), Color::Gray);
    }

    #[test]
    fn test_price_precision() {
        assert_eq!(price(Some(50000.0)), "$50000.00");
        assert_eq!(price(Some(0.1234567)), "$0.123457");
    }

    #[test]
    fn test_percent_sign_and_arrow() {
        assert_eq!(percent(Some(5.0)), "▲ +5.00%");
        assert_eq!(percent(Some(-2.5)), "▼ -2.50%");
    }

    #[test]
    fn test_compact_units() {
        assert_eq!(compact(Some(2.5e12)), "2.50T");
        assert_eq!(compact(Some(1_234_567.0)), "1.23M");
        assert_eq!(compact(Some(999.0)), "999.00");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long headline", 6), "a lon…");
    }
}

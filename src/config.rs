// ============================================================================
// Configuration : ApiConfig
// ============================================================================
// Valeurs de configuration injectées dans le client API à sa construction.
// Rien n'est lu depuis un état global une fois le client créé : les tests
// construisent simplement un ApiConfig avec une URL factice.
//
// Variables d'environnement :
// - TRADINGHUB_API_URL       : URL de base de l'API
// - TRADINGHUB_TIMEOUT_SECS  : timeout optionnel des requêtes (en secondes)
// ============================================================================

use std::time::Duration;

use tracing::{debug, warn};

/// Variable d'environnement pour l'URL de base
pub const API_URL_ENV: &str = "TRADINGHUB_API_URL";

/// Variable d'environnement pour le timeout des requêtes
pub const TIMEOUT_ENV: &str = "TRADINGHUB_TIMEOUT_SECS";

/// Cible du proxy de développement
pub const DEV_API_URL: &str = "http://localhost:3000";

/// Hôte de production
pub const PROD_API_URL: &str = "https://trading-api-wcv5.onrender.com";

/// Configuration du client API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// URL de base, sans slash final (ex: "http://localhost:3000")
    pub base_url: String,

    /// Timeout des requêtes ; None = pas de timeout
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Crée une configuration avec une URL de base explicite
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Ajoute un timeout aux requêtes
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Construit la configuration depuis l'environnement du processus
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Closures génériques
    /// - F: Fn(&str) -> Option<String> accepte std::env::var ou une HashMap de test
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_base_url().to_string());

        let mut config = Self::new(base_url);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_timeout(Duration::from_secs(secs)),
                _ => warn!(value = %raw, "Ignoring invalid request timeout"),
            }
        }

        debug!(base_url = %config.base_url, timeout = ?config.timeout, "Loaded API configuration");
        config
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

/// URL par défaut : proxy local en debug, hôte de production en release
fn default_base_url() -> &'static str {
    if cfg!(debug_assertions) {
        DEV_API_URL
    } else {
        PROD_API_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ApiConfig::new("http://example.test/api/");
        assert_eq!(config.base_url, "http://example.test/api");
    }

    #[test]
    fn test_from_lookup_uses_env_url() {
        let config = ApiConfig::from_lookup(lookup_from(&[(API_URL_ENV, "http://mock:9000")]));
        assert_eq!(config.base_url, "http://mock:9000");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_from_lookup_falls_back_to_default() {
        let config = ApiConfig::from_lookup(lookup_from(&[(API_URL_ENV, "  ")]));
        assert_eq!(config.base_url, default_base_url());
    }

    #[test]
    fn test_timeout_parsing() {
        let config = ApiConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "15")]));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        let config = ApiConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "abc")]));
        assert_eq!(config.timeout, None);
    }
}

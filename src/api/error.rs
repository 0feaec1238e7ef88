// ============================================================================
// Erreur : RequestError
// ============================================================================
// Un seul type d'erreur pour toutes les requêtes vers l'API de trading.
// Les variantes ne servent qu'à conserver la cause (status HTTP, réseau,
// JSON) ; l'interface n'affiche que le message.
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] génère l'implémentation de Display
// ============================================================================

use thiserror::Error;

/// Échec d'une requête vers l'API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Le serveur a répondu avec un status non 2xx
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Serveur injoignable, connexion coupée, timeout, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// Corps de réponse illisible ou qui ne correspond pas au type attendu
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// URL impossible à construire depuis la base configurée
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode(err.to_string())
    }
}

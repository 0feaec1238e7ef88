// ============================================================================
// Transport en mémoire
// ============================================================================
// Remplace HttpTransport dans les tests : chaque chemin d'URL est associé à
// une réponse JSON (ou une erreur) préparée à l'avance. Les URLs demandées
// sont enregistrées pour vérifier les paramètres envoyés.
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::api::error::RequestError;
use crate::api::transport::Transport;

/// Transport qui répond depuis une table chemin -> réponse
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Result<Value, RequestError>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Répond `body` pour le chemin donné (ex: "/api/kraken/ticker")
    pub fn respond(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(path.to_string(), Ok(body));
        self
    }

    /// Échoue avec `error` pour le chemin donné
    pub fn fail(mut self, path: &str, error: RequestError) -> Self {
        self.routes.insert(path.to_string(), Err(error));
        self
    }

    /// Journal partagé des URLs demandées
    pub fn requests(&self) -> Arc<Mutex<Vec<Url>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: Url) -> Result<Value, RequestError> {
        let route = self.routes.get(url.path()).cloned();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url);
        }

        route.unwrap_or(Err(RequestError::Status(404)))
    }
}

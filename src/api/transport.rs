// ============================================================================
// Transport HTTP
// ============================================================================
// Le client API ne parle jamais directement à reqwest : il passe par le trait
// Transport. En production c'est HttpTransport ; les tests injectent un
// transport en mémoire qui renvoie du JSON préparé.
//
// CONCEPT RUST : async-trait
// - Les traits ne supportent pas nativement les méthodes async dyn-compatibles
// - #[async_trait] transforme async fn en fn -> Pin<Box<dyn Future>>
// - Permet d'utiliser Arc<dyn Transport>
// ============================================================================

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::error::RequestError;
use crate::config::ApiConfig;

/// Effectue un GET et renvoie le corps JSON brut
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: Url) -> Result<Value, RequestError>;
}

/// Transport basé sur reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Crée le client HTTP (pool de connexions réutilisé entre les requêtes)
    pub fn new(config: &ApiConfig) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("tradinghub/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| RequestError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn get_json(&self, url: Url) -> Result<Value, RequestError> {
        debug!("Sending HTTP request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            warn!(status = %status, "API returned error status");
            return Err(RequestError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RequestError::Decode(e.to_string()))
    }
}

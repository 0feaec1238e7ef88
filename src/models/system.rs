// ============================================================================
// Structures : santé et métriques du serveur
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Réponse de /health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.to_lowercase().as_str(), "ok" | "healthy")
    }
}

/// État d'un service amont (alpaca, yahoo_finance, reddit, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub last_check: f64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub response_time_ms: f64,
}

/// Réponse de /status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: f64,
    /// Uptime en secondes
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub environment: String,
    /// Services indexés par nom (ordre stable pour l'affichage)
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
}

impl SystemStatus {
    /// Uptime au format "12h 34m"
    pub fn uptime_label(&self) -> String {
        let seconds = self.uptime.max(0.0) as u64;
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Utilisation mémoire du serveur
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(default)]
    pub used_mb: f64,
    #[serde(default)]
    pub total_mb: f64,
    #[serde(default)]
    pub percentage: f64,
}

/// Réponse de /metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub error_rate: f64,
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub active_connections: u64,
    #[serde(default)]
    pub memory_usage: MemoryUsage,
}

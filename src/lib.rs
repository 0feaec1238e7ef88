// ============================================================================
// TradingHub - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;      // Client de l'API de trading
pub mod app;      // État de l'application
pub mod config;   // ApiConfig (URL de base, timeout)
pub mod fetch;    // FetchState + Resource
pub mod models;   // Structures de données
pub mod sections; // Resources regroupées par onglet
pub mod ui;       // Interface utilisateur

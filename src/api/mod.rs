// ============================================================================
// Module : api
// ============================================================================
// Client de l'API de trading : transport HTTP, construction des requêtes,
// enveloppe {success, data} et normalisation des réponses.
// ============================================================================

pub mod client;     // TradingApi : une méthode par endpoint
pub mod error;      // RequestError
pub mod normalize;  // Formes amont -> view models
pub mod params;     // Query parameters
pub mod testing;    // Transport en mémoire pour les tests
pub mod transport;  // Trait Transport + implémentation reqwest

// Re-export des types principaux
pub use client::{TradingApi, DEFAULT_LIMIT, DEFAULT_TOP_LIMIT};
pub use error::RequestError;
pub use params::QueryParams;
pub use transport::{HttpTransport, Transport};

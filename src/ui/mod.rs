// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod dashboard; // Cadre : onglets, footer, mode input
pub mod events;    // Gestion des événements clavier
pub mod format;    // Prix, pourcentages, montants compacts
pub mod views;     // Sections de chaque onglet

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};

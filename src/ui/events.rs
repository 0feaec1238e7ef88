// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : identifier la touche et ses variantes
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Délai max d'attente d'un événement ; borne aussi la latence d'affichage
/// des réponses réseau
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (applique les résultats arrivés, redessine)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: TICK_RATE,
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                // Resize, souris, Release : un tick suffit pour redessiner
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche droite, 'l' (vim) ou Tab
pub fn is_next_tab_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Right | KeyCode::Tab | KeyCode::Char('l'))
    )
}

/// Flèche gauche, 'h' (vim) ou Shift+Tab
pub fn is_previous_tab_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h'))
    )
}

/// '1'..'8' : sélection directe d'un onglet
pub fn tab_digit(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) if ('1'..='8').contains(&c) => Some(c),
        _ => None,
    }
}

/// 'r' : relancer l'onglet actif
pub fn is_retry_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r')))
}

/// 'R' : tout rafraîchir
pub fn is_refresh_all_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('R')))
}

/// 'p' : éditer la paire Kraken / le ticker High OI
pub fn is_edit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('p') | KeyCode::Char('P')))
}

/// 'b' : éditer la liste batch High OI
pub fn is_batch_edit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('b') | KeyCode::Char('B')))
}

/// 'c' : basculer call/put
pub fn is_toggle_option_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('c') | KeyCode::Char('C')))
}

pub fn is_depth_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('+') | KeyCode::Char('=')))
}

pub fn is_depth_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('-') | KeyCode::Char('_')))
}

/// Caractère acceptable dans une paire ou un ticker
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(c)) if c.is_alphanumeric() || matches!(c, '-' | '.' | '/' | ','))
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

// ============================================================================
// TradingHub - Dashboard de trading dans le terminal
// ============================================================================
// Affiche les données de l'API de trading (crypto, actions, options, Kraken,
// état du système, news) dans des onglets ; chaque section charge ses
// données en tâche de fond et se rafraîchit à la demande.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère résultats, rendering et événements
// 3. Async dans sync : un runtime tokio multi-thread pour les requêtes,
//    la boucle UI reste synchrone sur le thread principal
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use tradinghub::api::TradingApi;
use tradinghub::app::{App, Tab};
use tradinghub::config::ApiConfig;
use tradinghub::ui::events::{
    get_char_from_event, is_backspace_event, is_batch_edit_event, is_depth_down_event,
    is_depth_up_event, is_edit_event, is_enter_event, is_escape_event, is_next_tab_event,
    is_previous_tab_event, is_quit_event, is_refresh_all_event, is_retry_event,
    is_ticker_char_event, is_toggle_option_event, tab_digit, Event, EventHandler,
};
use tradinghub::ui::render;

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - stdout appartient au TUI : on log vers un fichier
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/tradinghub/logs
/// - macOS : ~/Library/Application Support/tradinghub/logs
/// - Windows : C:\Users\<user>\AppData\Local\tradinghub\logs
/// - Sinon : ./logs
fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tradinghub").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/tradinghub/logs/tradinghub.log.*
/// RUST_LOG=tradinghub=trace cargo run
/// ```
fn init_logging() -> Result<PathBuf> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "tradinghub.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Les fetchs tournent sur les workers tokio
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradinghub=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(log_dir)
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    }

    let config = ApiConfig::from_env();
    info!(base_url = %config.base_url, timeout = ?config.timeout, "TradingHub starting up");

    // CONCEPT RUST : Runtime possédé par main
    // - Les tâches de fetch tournent sur les workers du runtime
    // - Le thread principal garde la boucle UI, sans block_on
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tradinghub-fetch")
        .build()
        .context("Échec de la création du runtime tokio")?;

    let api = TradingApi::new(config).context("Échec de la création du client API")?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(api, runtime.handle().clone());
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Détruit les Resource (annule les requêtes en vol) avant le runtime
    drop(app);
    runtime.shutdown_background();

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// 0. SYNC   : applique les résultats arrivés (sans bloquer)
// 1. RENDER : dessine l'interface
// 2. INPUT  : attend un événement au plus TICK_RATE
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        let applied = app.sync();
        if applied > 0 {
            debug!(applied, "Applied fetch results");
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => error!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Le mode input capture les caractères avant les raccourcis
/// - Toute touche non reconnue annule la confirmation de quit
fn handle_event(app: &mut App, event: Event) {
    if let Event::Tick = event {
        return;
    }

    // ========================================
    // Input Mode : Gestion de la saisie
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            let changed = app.submit_input();
            debug!(changed, "User submitted input");
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_ticker_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_next_tab_event(&event) => app.next_tab(),
        Event::Key(_) if is_previous_tab_event(&event) => app.previous_tab(),
        Event::Key(_) if tab_digit(&event).is_some() => {
            if let Some(tab) = tab_digit(&event).and_then(Tab::from_digit) {
                app.select_tab(tab);
            }
        }

        Event::Key(_) if is_retry_event(&event) => {
            app.cancel_quit();
            app.retry_active_tab();
        }
        Event::Key(_) if is_refresh_all_event(&event) => {
            app.cancel_quit();
            app.refresh_all();
        }

        Event::Key(_) if is_edit_event(&event) => {
            if !app.start_input() {
                app.cancel_quit();
            }
        }

        Event::Key(_) if is_batch_edit_event(&event) && app.current_tab == Tab::HighOpenInterest => {
            app.start_batch_input();
        }

        Event::Key(_) if is_toggle_option_event(&event) && app.current_tab == Tab::HighOpenInterest => {
            app.cancel_quit();
            app.toggle_option_type();
        }

        Event::Key(_) if is_depth_up_event(&event) && app.current_tab == Tab::Kraken => {
            app.cancel_quit();
            app.increase_depth();
        }
        Event::Key(_) if is_depth_down_event(&event) && app.current_tab == Tab::Kraken => {
            app.cancel_quit();
            app.decrease_depth();
        }

        _ => app.cancel_quit(),
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Échec de l'ouverture de l'alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

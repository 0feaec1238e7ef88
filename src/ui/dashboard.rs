// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine le cadre du dashboard : onglets, contenu de l'onglet actif, footer
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, Tabs)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Screen, Tab};
use crate::ui::views;

/// Dessine l'interface complète
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    views::render_tab(frame, app, chunks[1]);

    match app.current_screen {
        Screen::Dashboard => render_footer(frame, app, chunks[2]),
        Screen::InputMode(_) => render_input_footer(frame, app, chunks[2]),
    }
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : onglets
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(4), // Footer : raccourcis ou saisie
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : onglets et dernière mise à jour
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let loading = if app.any_loading() { " ⟳" } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" TradingHub ")
        .title(
            Title::from(format!(
                " Last updated: {}{} ",
                app.last_updated.format("%H:%M:%S"),
                loading
            ))
            .alignment(Alignment::Right),
        );

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(index, tab)| Line::from(format!("{} {}", index + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.current_tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

    frame.render_widget(tabs, area);
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn key(label: &str, color: Color) -> Span<'static> {
    Span::styled(
        label.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = if app.is_awaiting_quit_confirmation() {
        vec![Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])]
    } else {
        let global = vec![
            key("[q]", Color::Yellow),
            Span::raw(" Quit  "),
            key("[←→ / 1-8]", Color::Yellow),
            Span::raw(" Tabs  "),
            key("[r]", Color::Green),
            Span::raw(" Retry tab  "),
            key("[R]", Color::Green),
            Span::raw(" Refresh all"),
        ];
        let contextual = match app.current_tab {
            Tab::Kraken => vec![
                key("[p]", Color::Cyan),
                Span::raw(format!(" Pair ({})  ", app.kraken_pair)),
                key("[+/-]", Color::Cyan),
                Span::raw(format!(" Depth ({})", app.order_book_depth)),
            ],
            Tab::HighOpenInterest => vec![
                key("[p]", Color::Cyan),
                Span::raw(format!(" Ticker ({})  ", app.oi_ticker)),
                key("[b]", Color::Cyan),
                Span::raw(" Batch  "),
                key("[c]", Color::Cyan),
                Span::raw(format!(" Call/Put ({})", app.option_type)),
            ],
            _ => Vec::new(),
        };

        if contextual.is_empty() {
            vec![Line::from(global)]
        } else {
            vec![Line::from(global), Line::from(contextual)]
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode input : prompt, buffer et curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        key("[Enter]", Color::Green),
        Span::raw(" Confirm  "),
        key("[ESC]", Color::Red),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

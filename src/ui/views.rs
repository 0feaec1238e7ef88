// ============================================================================
// Vues des onglets
// ============================================================================
// Chaque section est rendue indépendamment selon l'état de sa Resource :
// - chargement sans donnée   : "Loading..."
// - erreur                   : message + "[r] Retry" (+ données périmées)
// - données                  : contenu de la section
// - données + refetch en vol : contenu, titre marqué "⟳"
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Tab};
use crate::fetch::Resource;
use crate::models::{
    FinvizRecommendation, GroupData, HealthResponse, HighOpenInterestResponse, InsiderData,
    KrakenAssetPair, KrakenOrderBook, KrakenTicker, ListEntry, MarketOverview, MarketRecord,
    NewsItem, OptionContract, Quote, Sentiment, SystemMetrics, SystemStatus, TrendingItem,
    TrendingOptionsResponse,
};
use crate::ui::format;

/// Dessine le contenu de l'onglet actif
pub fn render_tab(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Overview => render_overview(frame, app, area),
        Tab::Crypto => render_crypto(frame, app, area),
        Tab::Stocks => render_stocks(frame, app, area),
        Tab::Options => render_options(frame, app, area),
        Tab::Kraken => render_kraken(frame, app, area),
        Tab::HighOpenInterest => render_open_interest(frame, app, area),
        Tab::System => render_system(frame, app, area),
        Tab::News => render_news(frame, app, area),
    }
}

// ============================================================================
// Layout et section générique
// ============================================================================

/// Découpe `area` en lignes égales, chaque ligne en `columns[i]` colonnes
fn grid(area: Rect, columns: &[u16]) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, columns.len() as u32); columns.len()])
        .split(area);

    rows.iter()
        .zip(columns)
        .flat_map(|(row, count)| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, *count as u32); *count as usize])
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Dessine une section à partir de l'état de sa Resource
///
/// CONCEPT RUST : impl FnOnce
/// - `body` n'est appelé que si des données sont disponibles
/// - Les vues restent de simples fonctions &T -> lignes
fn section<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    resource: &Resource<T>,
    body: impl FnOnce(&T) -> Vec<Line<'static>>,
) {
    let state = resource.state();
    let refreshing = state.is_loading() && state.data().is_some();

    let title = if refreshing {
        format!(" {} ⟳ ", title)
    } else {
        format!(" {} ", title)
    };

    let border = if state.error().is_some() {
        Color::Red
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let mut lines = Vec::new();
    if let Some(error) = state.error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Retry"),
        ]));
    }

    match state.data() {
        Some(data) => {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            let body = body(data);
            if body.is_empty() {
                lines.push(muted("No data available"));
            } else {
                lines.extend(body);
            }
        }
        None if state.is_loading() => lines.push(muted("Loading...")),
        None if lines.is_empty() => lines.push(muted("Not loaded")),
        None => {}
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn muted(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Gray)))
}

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn status_color(ok: bool) -> Color {
    if ok {
        Color::Green
    } else {
        Color::Red
    }
}

// ============================================================================
// Lignes par type de données
// ============================================================================

fn record_lines(records: &Vec<MarketRecord>) -> Vec<Line<'static>> {
    records
        .iter()
        .map(|r| {
            let color = format::change_color(r.change_pct_24h);
            Line::from(vec![
                Span::styled(
                    format!("{:>3} ", r.rank.map(|n| format!("#{}", n)).unwrap_or_default()),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:<12}", format::truncate(&r.symbol, 12)),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{:>14} ", format::price(r.price))),
                Span::styled(format!("{:>10} ", format::percent(r.change_pct_24h)), Style::default().fg(color)),
                Span::styled(
                    format!("vol {}", format::compact(r.volume)),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect()
}

fn list_entry_lines(entries: &Vec<ListEntry>, fallback: &str) -> Vec<Line<'static>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut spans = vec![Span::styled(
                format!("{:<10}", entry.label(fallback, index)),
                Style::default().add_modifier(Modifier::BOLD),
            )];

            if let Some(item) = entry.item() {
                if item.price.is_some() {
                    spans.push(Span::raw(format!("{:>12} ", format::price(item.price))));
                }
                if item.change.is_some() {
                    spans.push(Span::styled(
                        format!("{:>10} ", format::percent(item.change)),
                        Style::default().fg(format::change_color(item.change)),
                    ));
                }
                if let Some(mentions) = item.mentions {
                    spans.push(Span::styled(
                        format!("{} mentions ", mentions),
                        Style::default().fg(Color::Gray),
                    ));
                }
                if let Some(sentiment) = item.sentiment {
                    spans.push(sentiment_span(sentiment));
                }
                if let Some(text) = item.name.as_deref().or(item.description.as_deref()) {
                    spans.push(Span::styled(
                        format!(" {}", format::truncate(text, 30)),
                        Style::default().fg(Color::Gray),
                    ));
                }
            }

            Line::from(spans)
        })
        .collect()
}

fn sentiment_span(sentiment: Sentiment) -> Span<'static> {
    let color = match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
        Sentiment::Neutral => Color::Gray,
    };
    Span::styled(sentiment.label().to_string(), Style::default().fg(color))
}

fn quote_lines(quotes: &Vec<Quote>) -> Vec<Line<'static>> {
    quotes
        .iter()
        .map(|q| {
            Line::from(vec![
                Span::styled(format!("{:<10}", q.symbol), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("{:>14} ", format::price(q.price))),
                Span::styled(
                    format::percent(q.change_percent),
                    Style::default().fg(format::change_color(q.change_percent)),
                ),
            ])
        })
        .collect()
}

fn contract_lines(label: &str, contract: Option<&OptionContract>) -> Vec<Line<'static>> {
    let Some(c) = contract else {
        return vec![label_value(label, "none".to_string())];
    };
    vec![
        Line::from(Span::styled(
            format!("{}: {}", label, c.symbol),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        label_value("  Strike", format::price(Some(c.strike_price))),
        label_value("  Expiration", c.expiration_date.clone()),
        label_value("  Open interest", format::compact(c.open_interest)),
        label_value("  Last", format::price(c.last_price)),
        label_value(
            "  Bid / Ask",
            format!("{} / {}", format::price(c.bid_price), format::price(c.ask_price)),
        ),
        label_value(
            "  Implied vol",
            c.implied_volatility
                .map(|iv| format!("{:.1}%", iv * 100.0))
                .unwrap_or_else(|| format::MISSING.to_string()),
        ),
    ]
}

fn open_interest_lines(response: &HighOpenInterestResponse) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        response.ticker.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];
    if let Some(error) = &response.result.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    lines.extend(contract_lines("Short term", response.result.short_term.as_ref()));
    lines.extend(contract_lines("LEAP", response.result.leap.as_ref()));
    lines
}

// ============================================================================
// Onglets
// ============================================================================

fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[2, 2]);
    let overview = &app.overview;

    section(frame, cells[0], "Market Overview", &overview.market, |m: &MarketOverview| {
        vec![
            label_value("Total market cap", format!("${}", format::compact(Some(m.total_market_cap)))),
            label_value("24h volume", format!("${}", format::compact(Some(m.total_volume)))),
            label_value("BTC dominance", format!("{:.2}%", m.bitcoin_dominance)),
        ]
    });
    section(frame, cells[1], "Market Context", &overview.context, |text: &String| {
        vec![Line::from(text.clone())]
    });
    section(frame, cells[2], "Top Gainers (Kraken)", &overview.gainers, record_lines);
    section(frame, cells[3], "Top Losers (Kraken)", &overview.losers, record_lines);
}

fn render_crypto(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[3, 2]);
    let crypto = &app.crypto;

    section(frame, cells[0], "Top Cryptocurrencies (volume)", &crypto.top, record_lines);
    section(frame, cells[1], "Trending (Kraken)", &crypto.trending, record_lines);
    section(
        frame,
        cells[2],
        "Trending (CoinGecko)",
        &crypto.coingecko_trending,
        |items: &Vec<TrendingItem>| {
            items
                .iter()
                .map(|item| {
                    let rank = item
                        .market_cap_rank
                        .map(|r| format!("#{}", r))
                        .unwrap_or_else(|| "-".to_string());
                    Line::from(vec![
                        Span::styled(format!("{:<6}", rank), Style::default().fg(Color::Gray)),
                        Span::styled(
                            format!("{:<8}", item.symbol.to_uppercase()),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format::truncate(&item.name, 24)),
                    ])
                })
                .collect()
        },
    );
    section(frame, cells[3], "Top Market Cap (CoinGecko)", &crypto.coingecko_top, record_lines);
    section(frame, cells[4], "Crypto", &crypto.listed, |entries| {
        list_entry_lines(entries, "Crypto")
    });
}

fn render_stocks(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[3, 4]);
    let stocks = &app.stocks;

    section(frame, cells[0], "Trending Stocks", &stocks.trending, |entries| {
        list_entry_lines(entries, "Stock")
    });
    section(frame, cells[1], "Reddit Trending", &stocks.reddit, |entries| {
        list_entry_lines(entries, "Stock")
    });
    section(
        frame,
        cells[2],
        "Finviz Recommendations",
        &stocks.finviz,
        |recs: &Vec<FinvizRecommendation>| {
            recs.iter()
                .map(|r| {
                    Line::from(vec![
                        Span::styled(format!("{:<7}", r.ticker), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(format!("{:<12}", format::truncate(&r.recommendation, 12))),
                        Span::raw(format!("tgt {} ", format::price(r.price_target))),
                        Span::styled(
                            format::percent(r.upside),
                            Style::default().fg(format::change_color(r.upside)),
                        ),
                    ])
                })
                .collect()
        },
    );
    section(frame, cells[3], "Forex", &stocks.forex, quote_lines);
    section(frame, cells[4], "Futures", &stocks.futures, quote_lines);
    section(frame, cells[5], "Groups", &stocks.groups, |groups: &Vec<GroupData>| {
        groups
            .iter()
            .map(|g| {
                Line::from(vec![
                    Span::raw(format!("{:<18}", format::truncate(&g.name, 18))),
                    Span::styled(
                        format::percent(g.performance),
                        Style::default().fg(format::change_color(g.performance)),
                    ),
                ])
            })
            .collect()
    });
    section(frame, cells[6], "Insider", &stocks.insider, |trades: &Vec<InsiderData>| {
        trades
            .iter()
            .map(|t| {
                Line::from(vec![
                    Span::styled(format!("{:<6}", t.ticker), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("{:<10}", format::truncate(&t.transaction, 10))),
                    Span::raw(format!("{:>8} ", format::compact(t.shares))),
                    Span::styled(t.date.clone(), Style::default().fg(Color::Gray)),
                ])
            })
            .collect()
    });
}

fn render_options(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[2]);
    let options = &app.options;

    section(
        frame,
        cells[0],
        "Trending Options",
        &options.trending,
        |response: &TrendingOptionsResponse| {
            let summary = &response.summary;
            let mut lines = vec![
                label_value("Analyzed", summary.total_analyzed.to_string()),
                label_value("With options", summary.total_with_options.to_string()),
                Line::from(""),
            ];
            lines.extend(response.results.iter().enumerate().map(|(index, result)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<8}", result.label(index)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        "underlying {:>6} ",
                        result
                            .underlying_score
                            .map(|s| format!("{:.2}", s))
                            .unwrap_or_else(|| format::MISSING.to_string())
                    )),
                    Span::raw(format!(
                        "undervalued {:>6}",
                        result
                            .undervalued_score
                            .map(|s| format!("{:.2}", s))
                            .unwrap_or_else(|| format::MISSING.to_string())
                    )),
                ])
            }));
            lines
        },
    );
    section(
        frame,
        cells[1],
        "Options Recommendations",
        &options.recommendations,
        |entries| list_entry_lines(entries, "Option"),
    );
}

fn render_kraken(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[2, 2]);
    let kraken = &app.kraken;
    let depth = app.order_book_depth as usize;

    section(
        frame,
        cells[0],
        &format!("Ticker {}", app.kraken_pair),
        &kraken.ticker,
        |t: &KrakenTicker| {
            vec![
                label_value("Price", format::price(t.price)),
                Line::from(vec![
                    Span::styled(format!("{:<18}", "24h change"), Style::default().fg(Color::Gray)),
                    Span::styled(
                        format::percent(t.change_pct_24h),
                        Style::default().fg(format::change_color(t.change_pct_24h)),
                    ),
                ]),
                label_value("24h high", format::price(t.high_24h)),
                label_value("24h low", format::price(t.low_24h)),
                label_value("Volume", format::compact(t.volume)),
            ]
        },
    );
    section(
        frame,
        cells[1],
        &format!("Order Book (Depth: {})", depth),
        &kraken.order_book,
        |book: &KrakenOrderBook| {
            let mut lines = vec![label_value(
                "Spread",
                book.spread()
                    .map(|s| format!("{:.6}", s))
                    .unwrap_or_else(|| format::MISSING.to_string()),
            )];
            lines.extend(book.asks.iter().take(depth).rev().map(|[price, qty]| {
                Line::from(Span::styled(
                    format!("ask {:>14.6} {:>14.6}", price, qty),
                    Style::default().fg(Color::Red),
                ))
            }));
            lines.extend(book.bids.iter().take(depth).map(|[price, qty]| {
                Line::from(Span::styled(
                    format!("bid {:>14.6} {:>14.6}", price, qty),
                    Style::default().fg(Color::Green),
                ))
            }));
            lines
        },
    );
    section(frame, cells[2], "Trending Pairs", &kraken.trending, |entries| {
        list_entry_lines(entries, "Pair")
    });
    section(frame, cells[3], "Asset Pairs", &kraken.pairs, |pairs: &Vec<KrakenAssetPair>| {
        pairs
            .iter()
            .map(|p| {
                let marker = if p.altname == app.kraken_pair { "▶ " } else { "  " };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:<12}", p.altname), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        p.wsname.clone().unwrap_or_default(),
                        Style::default().fg(Color::Gray),
                    ),
                ])
            })
            .collect()
    });
}

fn render_open_interest(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[2]);
    let oi = &app.open_interest;
    let kind = app.option_type.as_str().to_uppercase();

    section(
        frame,
        cells[0],
        &format!("Single Ticker ({} {})", app.oi_ticker, kind),
        &oi.single,
        open_interest_lines,
    );
    section(
        frame,
        cells[1],
        &format!("Batch ({} {})", app.batch_tickers.join(","), kind),
        &oi.batch,
        |responses: &Vec<HighOpenInterestResponse>| {
            responses.iter().flat_map(open_interest_lines).collect()
        },
    );
}

fn render_system(frame: &mut Frame, app: &App, area: Rect) {
    let cells = grid(area, &[2, 1]);
    let system = &app.system;

    section(frame, cells[0], "Health", &system.health, |h: &HealthResponse| {
        vec![Line::from(Span::styled(
            h.status.clone(),
            Style::default()
                .fg(status_color(h.is_healthy()))
                .add_modifier(Modifier::BOLD),
        ))]
    });
    section(frame, cells[1], "Performance Metrics", &system.metrics, |m: &SystemMetrics| {
        vec![
            label_value("Requests", m.total_requests.to_string()),
            label_value("Error rate", format!("{:.2}%", m.error_rate * 100.0)),
            label_value("Avg response", format!("{:.0} ms", m.average_response_time)),
            label_value("Connections", m.active_connections.to_string()),
            label_value(
                "Memory",
                format!(
                    "{:.0} / {:.0} MB ({:.1}%)",
                    m.memory_usage.used_mb, m.memory_usage.total_mb, m.memory_usage.percentage
                ),
            ),
        ]
    });
    section(frame, cells[2], "Service Status", &system.status, |s: &SystemStatus| {
        let mut lines = vec![
            label_value("Status", s.status.clone()),
            label_value("Version", s.version.clone()),
            label_value("Environment", s.environment.clone()),
            label_value("Uptime", s.uptime_label()),
            Line::from(""),
        ];
        lines.extend(s.services.iter().map(|(name, service)| {
            let ok = matches!(service.status.to_lowercase().as_str(), "ok" | "healthy" | "up");
            Line::from(vec![
                Span::raw(format!("{:<18}", name)),
                Span::styled(format!("{:<10}", service.status), Style::default().fg(status_color(ok))),
                Span::styled(
                    format!("{:.0} ms, {} errors", service.response_time_ms, service.error_count),
                    Style::default().fg(Color::Gray),
                ),
            ])
        }));
        lines
    });
}

fn render_news(frame: &mut Frame, app: &App, area: Rect) {
    section(frame, area, "Market News", &app.news.items, |items: &Vec<NewsItem>| {
        items
            .iter()
            .flat_map(|item| {
                vec![
                    Line::from(vec![
                        sentiment_span(item.sentiment),
                        Span::raw(" "),
                        Span::styled(item.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::raw(format!("  {}", format::truncate(&item.summary, 200)))),
                    Line::from(Span::styled(
                        format!("  {} · {} · {}", item.source, item.author, item.display_date()),
                        Style::default().fg(Color::Gray),
                    )),
                    Line::from(""),
                ]
            })
            .collect()
    });
}

// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du dashboard TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Ownership : App possède toutes les Resource ; les détruire annule
//    leurs requêtes en vol
//
// PATTERN : "Application State"
// - Toutes les vues lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::api::TradingApi;
use crate::fetch::Refresh;
use crate::models::OptionType;
use crate::sections::{
    Binder, CryptoSection, KrakenSection, NewsSection, OpenInterestSection, OptionsSection,
    OverviewSection, StocksSection, SystemSection,
};

/// Paire Kraken affichée au démarrage
pub const DEFAULT_KRAKEN_PAIR: &str = "XBTUSD";

/// Ticker High OI affiché au démarrage
pub const DEFAULT_OI_TICKER: &str = "AAPL";

/// Tickers de l'analyse batch
pub const DEFAULT_BATCH_TICKERS: &str = "AAPL,TSLA,NVDA,AMD,SPY";

/// Profondeurs d'order book proposées
pub const ORDER_BOOK_DEPTHS: [u32; 4] = [5, 10, 20, 50];

/// Profondeur par défaut
pub const DEFAULT_DEPTH: u32 = 10;

// ============================================================================
// Enum : Tab
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul onglet actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Onglets du dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Crypto,
    Stocks,
    Options,
    Kraken,
    HighOpenInterest,
    System,
    News,
}

impl Tab {
    /// Ordre d'affichage (touches 1 à 8)
    pub const ALL: [Tab; 8] = [
        Tab::Overview,
        Tab::Crypto,
        Tab::Stocks,
        Tab::Options,
        Tab::Kraken,
        Tab::HighOpenInterest,
        Tab::System,
        Tab::News,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Crypto => "Crypto",
            Tab::Stocks => "Stocks",
            Tab::Options => "Options",
            Tab::Kraken => "Kraken",
            Tab::HighOpenInterest => "High OI",
            Tab::System => "System",
            Tab::News => "News",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Onglet suivant (cyclique)
    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Onglet précédent (cyclique)
    pub fn previous(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// '1' -> Overview, ..., '8' -> News
    pub fn from_digit(c: char) -> Option<Tab> {
        let digit = c.to_digit(10)? as usize;
        digit.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Écran actuellement affiché
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Navigation normale entre les onglets
    Dashboard,

    /// Saisie d'un paramètre (Enter valide, ESC annule)
    InputMode(InputTarget),
}

/// Paramètre en cours de saisie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    KrakenPair,
    OpenInterestTicker,
    /// Liste séparée par des virgules
    BatchTickers,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' arme, seconde quitte
    pub confirm_quit: bool,

    pub current_tab: Tab,
    pub current_screen: Screen,

    /// Buffer et prompt du mode input
    pub input_buffer: String,
    pub input_prompt: String,

    /// Dernier rafraîchissement demandé
    pub last_updated: DateTime<Local>,

    /// Au moins une section chargeait lors du dernier sync()
    loading: bool,

    // Paramètres des sections dépendantes
    pub kraken_pair: String,
    pub order_book_depth: u32,
    pub oi_ticker: String,
    pub batch_tickers: Vec<String>,
    pub option_type: OptionType,

    binder: Binder,

    pub overview: OverviewSection,
    pub crypto: CryptoSection,
    pub stocks: StocksSection,
    pub options: OptionsSection,
    pub kraken: KrakenSection,
    pub open_interest: OpenInterestSection,
    pub system: SystemSection,
    pub news: NewsSection,
}

impl App {
    /// Crée l'application et monte l'onglet Overview
    ///
    /// Les autres onglets ne chargent rien tant qu'ils ne sont pas affichés.
    /// Doit être appelé depuis un contexte où `runtime` est valide.
    pub fn new(api: TradingApi, runtime: Handle) -> Self {
        let binder = Binder::new(api, runtime);
        let batch_tickers = split_tickers(DEFAULT_BATCH_TICKERS);
        let option_type = OptionType::default();

        let mut app = Self {
            running: true,
            confirm_quit: false,
            current_tab: Tab::Overview,
            current_screen: Screen::Dashboard,
            input_buffer: String::new(),
            input_prompt: String::new(),
            last_updated: Local::now(),
            loading: true,
            kraken_pair: DEFAULT_KRAKEN_PAIR.to_string(),
            order_book_depth: DEFAULT_DEPTH,
            oi_ticker: DEFAULT_OI_TICKER.to_string(),
            overview: OverviewSection::new(&binder),
            crypto: CryptoSection::new(&binder),
            stocks: StocksSection::new(&binder),
            options: OptionsSection::new(&binder),
            kraken: KrakenSection::new(&binder, DEFAULT_KRAKEN_PAIR, DEFAULT_DEPTH),
            open_interest: OpenInterestSection::new(
                &binder,
                DEFAULT_OI_TICKER,
                &batch_tickers,
                option_type,
            ),
            system: SystemSection::new(&binder),
            news: NewsSection::new(&binder),
            batch_tickers,
            option_type,
            binder,
        };

        app.mount_tab(Tab::Overview);
        app
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Onglets
    // ========================================================================

    /// Resources d'un onglet, type effacé
    pub fn tab_resources(&mut self, tab: Tab) -> Vec<&mut dyn Refresh> {
        match tab {
            Tab::Overview => self.overview.resources(),
            Tab::Crypto => self.crypto.resources(),
            Tab::Stocks => self.stocks.resources(),
            Tab::Options => self.options.resources(),
            Tab::Kraken => self.kraken.resources(),
            Tab::HighOpenInterest => self.open_interest.resources(),
            Tab::System => self.system.resources(),
            Tab::News => self.news.resources(),
        }
    }

    /// Premier affichage : monte chaque Resource une seule fois
    fn mount_tab(&mut self, tab: Tab) -> usize {
        let mounted = self
            .tab_resources(tab)
            .into_iter()
            .map(|r| r.mount())
            .filter(|mounted| *mounted)
            .count();
        if mounted > 0 {
            debug!(tab = tab.title(), mounted, "Tab mounted");
        }
        mounted
    }

    /// Affiche un onglet (et le charge à sa première apparition)
    pub fn select_tab(&mut self, tab: Tab) {
        self.confirm_quit = false;
        if self.current_tab != tab {
            info!(tab = tab.title(), "User switched tab");
        }
        self.current_tab = tab;
        self.mount_tab(tab);
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.current_tab.next());
    }

    pub fn previous_tab(&mut self) {
        self.select_tab(self.current_tab.previous());
    }

    // ========================================================================
    // Rafraîchissement
    // ========================================================================

    /// Relance toutes les sections de l'onglet actif
    pub fn retry_active_tab(&mut self) -> usize {
        let tab = self.current_tab;
        let mut count = 0;
        for resource in self.tab_resources(tab) {
            debug!(resource = resource.name(), failed = resource.has_error(), "Retrying section");
            resource.refetch();
            count += 1;
        }
        info!(tab = tab.title(), count, "Retrying tab");
        self.last_updated = Local::now();
        count
    }

    /// Relance toutes les sections déjà montées, sans attendre
    pub fn refresh_all(&mut self) -> usize {
        let mut count = 0;
        for tab in Tab::ALL {
            for resource in self.tab_resources(tab) {
                if resource.is_mounted() {
                    resource.refetch();
                    count += 1;
                }
            }
        }
        info!(count, "Refreshing all mounted sections");
        self.last_updated = Local::now();
        count
    }

    /// Applique les résultats arrivés (appelé à chaque tour de boucle)
    ///
    /// Met aussi à jour l'indicateur de chargement global.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        let mut loading = false;
        for tab in Tab::ALL {
            for resource in self.tab_resources(tab) {
                applied += resource.sync();
                loading |= resource.is_loading();
            }
        }
        self.loading = loading;
        applied
    }

    /// Vrai si une section chargeait lors du dernier sync()
    pub fn any_loading(&self) -> bool {
        self.loading
    }

    // ========================================================================
    // Paramètres des sections
    // ========================================================================

    /// Change la paire Kraken : ticker et order book sont recréés
    pub fn set_kraken_pair(&mut self, pair: &str) -> bool {
        let pair = pair.trim().to_uppercase();
        if pair.is_empty() || pair == self.kraken_pair {
            return false;
        }
        info!(pair = %pair, "Kraken pair changed");
        self.kraken_pair = pair;
        self.rebuild_kraken();
        true
    }

    /// Passe à la profondeur d'order book suivante
    pub fn increase_depth(&mut self) {
        let next = ORDER_BOOK_DEPTHS
            .iter()
            .copied()
            .find(|d| *d > self.order_book_depth);
        if let Some(depth) = next {
            self.set_depth(depth);
        }
    }

    /// Passe à la profondeur d'order book précédente
    pub fn decrease_depth(&mut self) {
        let previous = ORDER_BOOK_DEPTHS
            .iter()
            .rev()
            .copied()
            .find(|d| *d < self.order_book_depth);
        if let Some(depth) = previous {
            self.set_depth(depth);
        }
    }

    fn set_depth(&mut self, depth: u32) {
        debug!(depth, "Order book depth changed");
        self.order_book_depth = depth;
        let mounted = self.kraken.order_book.is_mounted();
        self.kraken.order_book = KrakenSection::order_book(&self.binder, &self.kraken_pair, depth);
        if mounted {
            self.kraken.order_book.mount();
        }
    }

    fn rebuild_kraken(&mut self) {
        let mounted = self.kraken.ticker.is_mounted();
        self.kraken.ticker = KrakenSection::ticker(&self.binder, &self.kraken_pair);
        self.kraken.order_book =
            KrakenSection::order_book(&self.binder, &self.kraken_pair, self.order_book_depth);
        if mounted {
            self.kraken.ticker.mount();
            self.kraken.order_book.mount();
        }
    }

    /// Change le ticker de l'analyse High OI
    pub fn set_oi_ticker(&mut self, ticker: &str) -> bool {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() || ticker == self.oi_ticker {
            return false;
        }
        info!(ticker = %ticker, "High OI ticker changed");
        self.oi_ticker = ticker;

        let mounted = self.open_interest.single.is_mounted();
        self.open_interest.single =
            OpenInterestSection::single(&self.binder, &self.oi_ticker, self.option_type);
        if mounted {
            self.open_interest.single.mount();
        }
        true
    }

    /// Change la liste de tickers de l'analyse batch
    pub fn set_batch_tickers(&mut self, raw: &str) -> bool {
        let tickers = split_tickers(raw);
        if tickers.is_empty() || tickers == self.batch_tickers {
            return false;
        }
        info!(tickers = %tickers.join(","), "High OI batch tickers changed");
        self.batch_tickers = tickers;

        let mounted = self.open_interest.batch.is_mounted();
        self.open_interest.batch =
            OpenInterestSection::batch(&self.binder, &self.batch_tickers, self.option_type);
        if mounted {
            self.open_interest.batch.mount();
        }
        true
    }

    /// Bascule call/put : les deux analyses High OI sont recréées
    pub fn toggle_option_type(&mut self) {
        self.option_type = self.option_type.toggled();
        info!(option_type = %self.option_type, "Option type toggled");

        let mounted = self.open_interest.single.is_mounted();
        self.open_interest = OpenInterestSection::new(
            &self.binder,
            &self.oi_ticker,
            &self.batch_tickers,
            self.option_type,
        );
        if mounted {
            self.open_interest.single.mount();
            self.open_interest.batch.mount();
        }
    }

    // ========================================================================
    // Quit
    // ========================================================================

    /// Première pression de 'q'
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Toute autre touche annule la demande
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode input pour le paramètre de l'onglet actif
    ///
    /// Retourne false si l'onglet n'a rien à saisir.
    pub fn start_input(&mut self) -> bool {
        let target = match self.current_tab {
            Tab::Kraken => InputTarget::KrakenPair,
            Tab::HighOpenInterest => InputTarget::OpenInterestTicker,
            _ => return false,
        };
        self.enter_input(target);
        true
    }

    /// Entre en mode input pour la liste batch (onglet High OI uniquement)
    pub fn start_batch_input(&mut self) -> bool {
        if self.current_tab != Tab::HighOpenInterest {
            return false;
        }
        self.enter_input(InputTarget::BatchTickers);
        true
    }

    fn enter_input(&mut self, target: InputTarget) {
        let prompt = match target {
            InputTarget::KrakenPair => "Kraken pair: ",
            InputTarget::OpenInterestTicker => "Ticker: ",
            InputTarget::BatchTickers => "Batch tickers (comma separated): ",
        };
        self.confirm_quit = false;
        self.current_screen = Screen::InputMode(target);
        self.input_buffer.clear();
        self.input_prompt = prompt.to_string();
    }

    /// Annule le mode input
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Valide la saisie et applique le paramètre
    ///
    /// Retourne true si le paramètre a changé.
    pub fn submit_input(&mut self) -> bool {
        let value = std::mem::take(&mut self.input_buffer);
        let target = match self.current_screen {
            Screen::InputMode(target) => target,
            Screen::Dashboard => return false,
        };
        self.cancel_input();

        match target {
            InputTarget::KrakenPair => self.set_kraken_pair(&value),
            InputTarget::OpenInterestTicker => self.set_oi_ticker(&value),
            InputTarget::BatchTickers => self.set_batch_tickers(&value),
        }
    }

    /// Ajoute un caractère ; la virgule n'est acceptée que pour la liste batch
    pub fn append_char(&mut self, c: char) {
        if c == ',' && self.current_screen != Screen::InputMode(InputTarget::BatchTickers) {
            return;
        }
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        matches!(self.current_screen, Screen::InputMode(_))
    }
}

/// "AAPL, TSLA,,NVDA" -> ["AAPL", "TSLA", "NVDA"]
pub fn split_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

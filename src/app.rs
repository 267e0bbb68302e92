// ============================================================================
// Structure : App
// ============================================================================
// Contexte applicatif : possède tout l'état partagé du dashboard
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Partage async : Arc<tokio::sync::Mutex<App>> entre la boucle de
//    rafraîchissement et le shell
//
// PATTERN : Cette structure suit le pattern "Application State"
// - La synchronisation de marché écrit dans App
// - Le shell lit depuis App pour afficher
// - Les stores (alertes, sessions) sont passés via App, pas capturés
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::alerts::AlertStore;
use crate::models::samples::MEMECOIN_SYMBOLS;
use crate::models::{
    AlertDraft, AlertRule, Asset, ChartInterval, ChartWidget, Currency, TradeIntent,
};
use crate::session::SessionStore;

/// App partagée entre tâches
pub type SharedApp = Arc<Mutex<App>>;

// ============================================================================
// Enum : MarketFilter
// ============================================================================

/// Filtre du tableau de marché
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketFilter {
    #[default]
    All,
    /// Variation 24h > 0
    Gainers,
    /// Variation 24h < 0
    Losers,
    /// Symbole dans la liste des memecoins
    Memes,
}

impl MarketFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            MarketFilter::All => true,
            MarketFilter::Gainers => asset.is_gainer(),
            MarketFilter::Losers => asset.is_loser(),
            MarketFilter::Memes => MEMECOIN_SYMBOLS.contains(&asset.symbol.as_str()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarketFilter::All => "all",
            MarketFilter::Gainers => "gainers",
            MarketFilter::Losers => "losers",
            MarketFilter::Memes => "memes",
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Snapshot courant, remplacé en bloc à chaque synchronisation réussie
    pub assets: Vec<Asset>,

    pub alerts: AlertStore,

    pub sessions: SessionStore,

    /// Devise demandée au fournisseur
    pub currency: Currency,

    /// Vrai quand les données affichées ne sont pas "live"
    /// (rate-limit, ou échantillon statique)
    pub demo_mode: bool,

    /// Indicateur de rafraîchissement en cours (feedback UI uniquement)
    pub is_updating: bool,

    /// Horodatage de la dernière synchronisation réussie
    pub last_updated: Option<DateTime<Utc>>,

    pub filter: MarketFilter,

    /// Texte de recherche (nom ou symbole)
    pub search: String,

    /// Actif sélectionné pour la vue détail
    pub selected_id: Option<String>,

    /// Intervalle du widget graphique
    pub chart_interval: ChartInterval,
}

impl App {
    /// Crée une App vide (aucun actif tant que la première sync n'a pas eu lieu)
    pub fn new(currency: Currency, sessions: SessionStore) -> Self {
        Self {
            assets: Vec::new(),
            alerts: AlertStore::new(),
            sessions,
            currency,
            demo_mode: false,
            is_updating: false,
            last_updated: None,
            filter: MarketFilter::default(),
            search: String::new(),
            selected_id: None,
            chart_interval: ChartInterval::default(),
        }
    }

    /// Emballe l'App pour partage entre tâches
    pub fn into_shared(self) -> SharedApp {
        Arc::new(Mutex::new(self))
    }

    /// Remplace toute la collection (une seule affectation)
    pub fn replace_assets(&mut self, assets: Vec<Asset>) {
        self.assets = assets;
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Actifs à afficher : recherche, tri par capitalisation, puis filtre
    pub fn visible_assets(&self) -> Vec<&Asset> {
        let mut visible: Vec<&Asset> = self
            .assets
            .iter()
            .filter(|a| a.matches_search(&self.search))
            .collect();

        visible.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
        visible.retain(|a| self.filter.matches(a));
        visible
    }

    pub fn set_filter(&mut self, filter: MarketFilter) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Change la devise. Retourne true si elle a changé
    /// (l'appelant doit alors relancer une synchronisation).
    pub fn set_currency(&mut self, currency: Currency) -> bool {
        let changed = self.currency != currency;
        self.currency = currency;
        changed
    }

    /// Sélectionne un actif. Retourne false si l'id est inconnu.
    pub fn select(&mut self, id: &str) -> bool {
        if self.asset(id).is_some() {
            self.selected_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Actif sélectionné, ou le premier de la collection à défaut
    ///
    /// CONCEPT RUST : Option chaining
    /// - La sélection peut "pendre" après une sync qui retire l'actif
    pub fn selected_asset(&self) -> Option<&Asset> {
        self.selected_id
            .as_deref()
            .and_then(|id| self.asset(id))
            .or_else(|| self.assets.first())
    }

    /// Passe à l'intervalle graphique suivant
    pub fn next_interval(&mut self) {
        self.chart_interval = self.chart_interval.next();
    }

    /// Passe à l'intervalle graphique précédent
    pub fn previous_interval(&mut self) {
        self.chart_interval = self.chart_interval.previous();
    }

    /// Paramètres du widget graphique pour l'actif sélectionné
    pub fn chart_widget(&self) -> Option<ChartWidget> {
        self.selected_asset()
            .map(|asset| ChartWidget::new(&asset.symbol, self.chart_interval))
    }

    /// Crée une alerte pré-remplie depuis un bouton acheter/vendre
    ///
    /// None si l'actif n'est pas dans la collection courante.
    pub fn create_trade_alert(&mut self, asset_id: &str, intent: TradeIntent) -> Option<AlertRule> {
        let draft = AlertDraft::from_intent(self.asset(asset_id)?, intent);
        Some(self.alerts.add(draft))
    }

    /// Démarre l'indicateur de rafraîchissement
    pub fn start_updating(&mut self) {
        self.is_updating = true;
    }

    /// Termine l'indicateur de rafraîchissement
    pub fn stop_updating(&mut self) {
        self.is_updating = false;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

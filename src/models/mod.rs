// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod alert;    // Règles d'alerte
pub mod asset;    // Snapshot de marché d'un actif
pub mod currency; // Devise de cotation
pub mod interval; // Paramètres du widget graphique
pub mod news;     // News et projets à venir
pub mod samples;  // Données statiques du mode démo
pub mod user;     // Comptes et session (mock)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use cryvex::models::asset::Asset;
// On peut faire : use cryvex::models::Asset;
pub use alert::{AlertCondition, AlertDraft, AlertRule, TradeIntent};
pub use asset::{format_price, Asset, Macd, Strength, Trend};
pub use currency::Currency;
pub use interval::{ChartInterval, ChartWidget};
pub use news::{Impact, NewsItem, UpcomingCoin};
pub use user::{PlanTier, Session, UserRecord};

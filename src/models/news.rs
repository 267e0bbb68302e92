// ============================================================================
// Structures : NewsItem / UpcomingCoin
// ============================================================================
// Contenus générés par le fournisseur d'IA (ou les échantillons statiques)
//
// CONCEPT RUST : #[serde(rename_all = "camelCase")]
// - Le JSON généré utilise "launchDate", "hypeScore"
// - Côté Rust on garde snake_case
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Impact estimé d'une news sur le marché
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Une news de marché
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Absent dans les réponses générées, complété à la réception
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub impact: Impact,
    /// Symboles concernés (ex: ["BTC", "ETH"])
    #[serde(default)]
    pub coins: Vec<String>,
}

impl NewsItem {
    /// Vrai si la news mentionne le symbole
    pub fn mentions(&self, symbol: &str) -> bool {
        self.coins.iter().any(|c| c.eq_ignore_ascii_case(symbol))
    }
}

/// Projet crypto "à venir" projeté par l'IA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingCoin {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub category: String,
    pub platform: String,
    pub launch_date: String,
    /// Score 0-100 (borné à la lecture)
    #[serde(deserialize_with = "deserialize_hype_score")]
    pub hype_score: u8,
    pub summary: String,
}

/// Lit n'importe quel nombre JSON et le ramène dans 0..=100
///
/// Le modèle renvoie parfois 300, -5 ou 87.5 : on arrondit et on borne
/// plutôt que de perdre toute la liste.
fn deserialize_hype_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

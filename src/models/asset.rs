// ============================================================================
// Structure : Asset
// ============================================================================
// Représente le snapshot de marché d'une cryptomonnaie
//
// CONCEPTS RUST :
// 1. Enums dérivés d'une valeur : Trend et Strength sont calculés depuis
//    la variation 24h, jamais saisis à la main
// 2. Composition : Asset contient un Macd (paire valeur/signal)
// 3. Serde : l'asset entier est sérialisable (export JSON, logs, tests)
//
// NOTE : RSI et MACD sont des placeholders aléatoires, pas des indicateurs
// calculés depuis un historique de prix.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Currency;

/// Tendance affichée pour un actif
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    /// Hausse si la variation 24h est positive, baisse si négative
    pub fn from_change(change_24h: f64) -> Self {
        if change_24h > 0.0 {
            Trend::Bullish
        } else if change_24h < 0.0 {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Neutral => "Neutral",
        }
    }
}

/// Force du mouvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    /// Seuils sur la valeur absolue de la variation 24h :
    /// - > 5% : Strong
    /// - >= 1% : Medium
    /// - sinon : Weak
    pub fn from_change(change_24h: f64) -> Self {
        let magnitude = change_24h.abs();
        if magnitude > 5.0 {
            Strength::Strong
        } else if magnitude >= 1.0 {
            Strength::Medium
        } else {
            Strength::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        }
    }
}

/// Paire MACD (valeur / ligne de signal)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macd {
    pub value: f64,
    pub signal: f64,
}

/// Snapshot de marché d'un actif
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifiant du fournisseur (ex: "bitcoin")
    pub id: String,

    /// Symbole en majuscules (ex: "BTC")
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// URL de l'icône (vide si inconnue)
    pub image: String,

    /// Prix actuel dans la devise sélectionnée
    pub price: f64,

    /// Variations en pourcentage
    pub change_1h: f64,
    pub change_24h: f64,
    pub change_7d: f64,

    pub market_cap: f64,
    pub volume_24h: f64,

    /// RSI synthétique (placeholder)
    pub rsi: f64,

    /// MACD synthétique (placeholder)
    pub macd: Macd,

    pub trend: Trend,
    pub strength: Strength,
}

impl Asset {
    /// Retourne true si l'actif est en hausse sur 24h
    pub fn is_gainer(&self) -> bool {
        self.change_24h > 0.0
    }

    /// Retourne true si l'actif est en baisse sur 24h
    pub fn is_loser(&self) -> bool {
        self.change_24h < 0.0
    }

    /// Recherche insensible à la casse sur le nom ou le symbole
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query) || self.symbol.to_lowercase().contains(&query)
    }

    /// Formatte l'actif pour une ligne de tableau
    ///
    /// Format : "BTC      Bitcoin              $64230.45  ▲ +3.42%  RSI 58"
    ///
    /// Note : Le nom est tronqué à 20 caractères pour éviter le débordement
    pub fn display(&self, currency: Currency) -> String {
        let price_str = format_price(self.price, currency);

        let arrow = if self.change_24h >= 0.0 { "▲" } else { "▼" };
        let change_str = format!("{} {:+.2}%", arrow, self.change_24h);

        let truncated_name = if self.name.chars().count() <= 20 {
            self.name.clone()
        } else {
            let truncated: String = self.name.chars().take(19).collect();
            format!("{}…", truncated)
        };

        format!(
            "{:<8} {:<20} {:>16}  {:<10} RSI {:.0}",
            self.symbol, truncated_name, price_str, change_str, self.rsi
        )
    }
}

/// Formatte un prix avec le préfixe de la devise
///
/// Les actifs sous 1 unité gardent 6 décimales (ex: SHIB, PEPE)
pub fn format_price(price: f64, currency: Currency) -> String {
    if price > 1.0 {
        format!("{}{:.2}", currency.prefix(), price)
    } else {
        format!("{}{:.6}", currency.prefix(), price)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

// ============================================================================
// Enum : ChartInterval
// ============================================================================
// Intervalle affiché par le widget graphique tiers
//
// CONCEPT : Le rendu du graphique est délégué au widget embarqué.
// Ici on ne calcule que ses paramètres : le symbole de la paire et le code
// d'intervalle attendu par le script d'embed.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Intervalle de temps entre les chandelles du widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartInterval {
    /// 15 minutes
    M15,
    /// 1 heure
    H1,
    /// 4 heures
    H4,
    /// 1 jour (daily), intervalle par défaut du widget
    #[default]
    D1,
    /// 1 semaine (weekly)
    W1,
}

impl ChartInterval {
    /// Code d'intervalle du widget ("15", "60", "240", "D", "W")
    ///
    /// CONCEPT RUST : &'static str
    /// - Retourne une string littérale (dans le binaire)
    /// - Pas d'allocation
    pub fn widget_code(&self) -> &'static str {
        match self {
            ChartInterval::M15 => "15",
            ChartInterval::H1 => "60",
            ChartInterval::H4 => "240",
            ChartInterval::D1 => "D",
            ChartInterval::W1 => "W",
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            ChartInterval::M15 => "15m",
            ChartInterval::H1 => "1h",
            ChartInterval::H4 => "4h",
            ChartInterval::D1 => "1d",
            ChartInterval::W1 => "1w",
        }
    }

    /// Parse un label ("1h", "4h", ...). Les labels inconnus retombent sur D1,
    /// comme le widget qui utilise "D" par défaut.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "15m" => ChartInterval::M15,
            "1h" => ChartInterval::H1,
            "4h" => ChartInterval::H4,
            "1w" => ChartInterval::W1,
            _ => ChartInterval::D1,
        }
    }

    /// Retourne l'intervalle suivant (cycle)
    pub fn next(&self) -> ChartInterval {
        match self {
            ChartInterval::M15 => ChartInterval::H1,
            ChartInterval::H1 => ChartInterval::H4,
            ChartInterval::H4 => ChartInterval::D1,
            ChartInterval::D1 => ChartInterval::W1,
            ChartInterval::W1 => ChartInterval::M15, // Boucle
        }
    }

    /// Retourne l'intervalle précédent (cycle)
    pub fn previous(&self) -> ChartInterval {
        match self {
            ChartInterval::M15 => ChartInterval::W1, // Boucle
            ChartInterval::H1 => ChartInterval::M15,
            ChartInterval::H4 => ChartInterval::H1,
            ChartInterval::D1 => ChartInterval::H4,
            ChartInterval::W1 => ChartInterval::D1,
        }
    }
}

/// Paramètres d'embed du widget graphique pour un actif
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartWidget {
    /// Ex: "BINANCE:BTCUSDT"
    pub symbol: String,
    /// Ex: "D"
    pub interval: &'static str,
    /// Identifiant unique du conteneur, change avec le symbole et l'intervalle
    pub widget_id: String,
}

impl ChartWidget {
    pub fn new(symbol: &str, interval: ChartInterval) -> Self {
        let symbol = symbol.to_uppercase();
        Self {
            widget_id: format!("tv-widget-{}-{}", symbol, interval.label()),
            symbol: format!("BINANCE:{}USDT", symbol),
            interval: interval.widget_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_cycle() {
        let mut interval = ChartInterval::M15;
        for _ in 0..5 {
            interval = interval.next();
        }
        assert_eq!(interval, ChartInterval::M15);
        assert_eq!(ChartInterval::M15.previous(), ChartInterval::W1);
    }

    #[test]
    fn test_unknown_label_defaults_to_daily() {
        assert_eq!(ChartInterval::from_label("1s"), ChartInterval::D1);
        assert_eq!(ChartInterval::from_label("4h"), ChartInterval::H4);
    }

    #[test]
    fn test_widget_params() {
        let widget = ChartWidget::new("sol", ChartInterval::H4);
        assert_eq!(widget.symbol, "BINANCE:SOLUSDT");
        assert_eq!(widget.interval, "240");
        assert_eq!(widget.widget_id, "tv-widget-SOL-4h");
    }
}

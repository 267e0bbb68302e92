// ============================================================================
// Structure : AlertRule
// ============================================================================
// Règle d'alerte définie par l'utilisateur sur un actif
//
// CONCEPTS RUST :
// 1. Enum sérialisé en snake_case : "price_above", "rsi_level", ...
// 2. Option<TradeIntent> : l'intention d'achat/vente est facultative
// 3. Pas de clé étrangère : asset_id peut pointer vers un actif disparu
//    après une synchronisation
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Asset;

/// Condition de déclenchement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    /// Prix supérieur ou égal à la valeur
    PriceAbove,
    /// Prix inférieur ou égal à la valeur
    PriceBelow,
    /// Variation 24h (en valeur absolue) supérieure ou égale à la valeur
    PercentChange,
    /// RSI supérieur ou égal à la valeur
    RsiLevel,
}

impl AlertCondition {
    pub fn label(&self) -> &'static str {
        match self {
            AlertCondition::PriceAbove => "price above",
            AlertCondition::PriceBelow => "price below",
            AlertCondition::PercentChange => "percent change",
            AlertCondition::RsiLevel => "rsi level",
        }
    }
}

/// Intention de trade associée à une alerte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeIntent {
    Buy,
    Sell,
}

/// Données saisies par l'utilisateur avant création de la règle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub asset_id: String,
    pub condition: AlertCondition,
    pub value: f64,
    pub intent: Option<TradeIntent>,
}

impl AlertDraft {
    pub fn new(asset_id: impl Into<String>, condition: AlertCondition, value: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            condition,
            value,
            intent: None,
        }
    }

    /// Pré-remplit le formulaire depuis un bouton "acheter" / "vendre"
    ///
    /// - Buy : prévenir quand le prix descend sous le prix actuel
    /// - Sell : prévenir quand le prix monte au-dessus du prix actuel
    pub fn from_intent(asset: &Asset, intent: TradeIntent) -> Self {
        let condition = match intent {
            TradeIntent::Buy => AlertCondition::PriceBelow,
            TradeIntent::Sell => AlertCondition::PriceAbove,
        };
        Self {
            asset_id: asset.id.clone(),
            condition,
            value: asset.price,
            intent: Some(intent),
        }
    }
}

/// Règle d'alerte stockée
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub asset_id: String,
    pub condition: AlertCondition,
    pub value: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub intent: Option<TradeIntent>,
}

impl AlertRule {
    /// Vérifie la condition contre un snapshot d'actif
    ///
    /// Retourne false si la règle est inactive ou vise un autre actif.
    /// Rien dans la synchronisation n'appelle cette méthode automatiquement.
    pub fn is_met_by(&self, asset: &Asset) -> bool {
        if !self.active || asset.id != self.asset_id {
            return false;
        }

        match self.condition {
            AlertCondition::PriceAbove => asset.price >= self.value,
            AlertCondition::PriceBelow => asset.price <= self.value,
            AlertCondition::PercentChange => asset.change_24h.abs() >= self.value.abs(),
            AlertCondition::RsiLevel => asset.rsi >= self.value,
        }
    }

    /// Description courte pour l'affichage
    pub fn describe(&self) -> String {
        let intent = match self.intent {
            Some(TradeIntent::Buy) => " [buy]",
            Some(TradeIntent::Sell) => " [sell]",
            None => "",
        };
        format!(
            "{}: notify when {} reaches {}{}",
            self.asset_id,
            self.condition.label(),
            self.value,
            intent
        )
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::samples::sample_assets;

    fn rule(asset_id: &str, condition: AlertCondition, value: f64) -> AlertRule {
        AlertRule {
            id: "r1".to_string(),
            asset_id: asset_id.to_string(),
            condition,
            value,
            active: true,
            created_at: Utc::now(),
            intent: None,
        }
    }

    #[test]
    fn test_condition_serde_names() {
        let json = serde_json::to_string(&AlertCondition::PriceAbove).unwrap();
        assert_eq!(json, "\"price_above\"");
        let parsed: AlertCondition = serde_json::from_str("\"rsi_level\"").unwrap();
        assert_eq!(parsed, AlertCondition::RsiLevel);
    }

    #[test]
    fn test_draft_from_intent() {
        let btc = sample_assets().into_iter().next().unwrap();

        let buy = AlertDraft::from_intent(&btc, TradeIntent::Buy);
        assert_eq!(buy.condition, AlertCondition::PriceBelow);
        assert_eq!(buy.value, btc.price);
        assert_eq!(buy.intent, Some(TradeIntent::Buy));

        let sell = AlertDraft::from_intent(&btc, TradeIntent::Sell);
        assert_eq!(sell.condition, AlertCondition::PriceAbove);
    }

    #[test]
    fn test_is_met_by() {
        let btc = sample_assets().into_iter().next().unwrap();
        assert_eq!(btc.id, "bitcoin");

        assert!(rule("bitcoin", AlertCondition::PriceAbove, 60_000.0).is_met_by(&btc));
        assert!(!rule("bitcoin", AlertCondition::PriceBelow, 60_000.0).is_met_by(&btc));
        assert!(rule("bitcoin", AlertCondition::RsiLevel, 58.0).is_met_by(&btc));
        assert!(rule("bitcoin", AlertCondition::PercentChange, 3.0).is_met_by(&btc));

        // Autre actif : jamais déclenchée
        assert!(!rule("ethereum", AlertCondition::PriceAbove, 0.0).is_met_by(&btc));

        // Inactive : jamais déclenchée
        let mut inactive = rule("bitcoin", AlertCondition::PriceAbove, 0.0);
        inactive.active = false;
        assert!(!inactive.is_met_by(&btc));
    }
}

// ============================================================================
// Structure : AlertStore
// ============================================================================
// Stockage en mémoire des règles d'alerte
//
// - add : ajoute avec un id généré et l'horodatage courant (infaillible)
// - remove : supprime par id (no-op si absent)
// - Aucune évaluation automatique contre les données de marché :
//   AlertRule::is_met_by existe mais le store ne l'appelle jamais seul
// ============================================================================

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{AlertDraft, AlertRule, Asset};

/// Règles d'alerte, dans l'ordre de création
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertStore {
    rules: Vec<AlertRule>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une règle et la retourne
    pub fn add(&mut self, draft: AlertDraft) -> AlertRule {
        let rule = AlertRule {
            id: Uuid::new_v4().to_string(),
            asset_id: draft.asset_id,
            condition: draft.condition,
            value: draft.value,
            active: true,
            created_at: Utc::now(),
            intent: draft.intent,
        };

        info!(alert = %rule.id, asset = %rule.asset_id, condition = rule.condition.label(), value = rule.value, "Alert created");
        self.rules.push(rule.clone());
        rule
    }

    /// Supprime une règle par id
    ///
    /// Retourne la règle supprimée, None si l'id est inconnu.
    pub fn remove(&mut self, id: &str) -> Option<AlertRule> {
        let index = self.rules.iter().position(|r| r.id == id)?;
        let removed = self.rules.remove(index);
        info!(alert = %removed.id, "Alert removed");
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&AlertRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Règles visant un actif donné
    pub fn for_asset<'a>(&'a self, asset_id: &'a str) -> impl Iterator<Item = &'a AlertRule> + 'a {
        self.rules.iter().filter(move |r| r.asset_id == asset_id)
    }

    /// Règles dont l'actif n'est plus dans la collection
    ///
    /// CONCEPT : Pas de clé étrangère
    /// - Une synchronisation peut retirer un actif du top-N
    /// - Les règles restent, leur référence "pend"
    pub fn dangling<'a>(&'a self, assets: &'a [Asset]) -> Vec<&'a AlertRule> {
        let dangling: Vec<&AlertRule> = self
            .rules
            .iter()
            .filter(|r| !assets.iter().any(|a| a.id == r.asset_id))
            .collect();
        if !dangling.is_empty() {
            debug!(count = dangling.len(), "Alerts reference assets no longer listed");
        }
        dangling
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

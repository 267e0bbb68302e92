// ============================================================================
// Structures : UserRecord / Session
// ============================================================================
// Compte utilisateur de démo, stocké en clair dans le fichier local
//
// ATTENTION : placeholder volontaire. Pas de hash, pas de token, pas
// d'expiration. Ne jamais réutiliser ce format pour de vrais identifiants.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Formule d'abonnement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    pub fn label(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Pro => "Pro",
        }
    }
}

/// Enregistrement persisté : {name, email, phone, password}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    pub password: String,
}

impl UserRecord {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
            phone: None,
            password: password.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Comparaison d'email insensible à la casse
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

/// Session ouverte après login ou inscription confirmée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub plan: PlanTier,
}

impl Session {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            plan: PlanTier::Free,
        }
    }

    /// Nom affiché, avec repli générique
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Cryvex user")
    }

    /// Initiale pour l'avatar : nom sinon email
    pub fn initial(&self) -> char {
        self.name
            .as_deref()
            .and_then(|n| n.trim().chars().next())
            .or_else(|| self.email.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

// ============================================================================
// Enum : Currency
// ============================================================================
// Devise de cotation demandée au fournisseur de données (vs_currency)
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Devises supportées par le dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Brl,
}

impl Currency {
    /// Code attendu par l'API (paramètre vs_currency)
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Brl => "brl",
        }
    }

    /// Préfixe d'affichage des prix
    pub fn prefix(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Brl => "R$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "brl" => Ok(Currency::Brl),
            other => Err(ConfigError::UnknownCurrency(other.to_string())),
        }
    }
}

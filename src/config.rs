// ============================================================================
// Configuration
// ============================================================================
// Chargée depuis les variables d'environnement (+ fichier .env optionnel)
//
// CONCEPT : Valeurs par défaut tolérantes
// - Une valeur numérique invalide retombe sur le défaut avec un warning
// - Une devise inconnue est une vraie erreur (ConfigError)
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::models::Currency;

/// Bornes de l'intervalle de rafraîchissement (secondes)
pub const MIN_REFRESH_SECS: u64 = 45;
pub const MAX_REFRESH_SECS: u64 = 90;

const DEFAULT_REFRESH_SECS: u64 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PER_PAGE: u32 = 50;
const DEFAULT_VERIFICATION_CODE: &str = "123456";

#[derive(Debug, Clone)]
pub struct Settings {
    pub currency: Currency,
    pub per_page: u32,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub coingecko_base_url: String,

    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,

    /// Fichier JSON qui joue le rôle du "local storage"
    pub users_file: PathBuf,
    pub verification_code: String,

    pub log_dir: PathBuf,
}

impl Settings {
    /// Charge la configuration depuis l'environnement du process
    pub fn load() -> Result<Settings, ConfigError> {
        // Charge .env s'il existe (pas d'erreur sinon)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la configuration depuis une fonction de lookup
    ///
    /// Permet de tester sans toucher aux variables du process.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let currency = match lookup("CRYVEX_CURRENCY") {
            Some(raw) => raw.parse::<Currency>()?,
            None => Currency::default(),
        };

        let per_page = parse_or(&lookup, "CRYVEX_PER_PAGE", DEFAULT_PER_PAGE).clamp(1, 250);

        let refresh_secs = parse_or(&lookup, "CRYVEX_REFRESH_SECS", DEFAULT_REFRESH_SECS);
        let clamped = refresh_secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        if clamped != refresh_secs {
            warn!(requested = refresh_secs, used = clamped, "Refresh interval clamped");
        }

        let timeout_secs = parse_or(&lookup, "CRYVEX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).max(1);

        let coingecko_base_url = lookup("COINGECKO_BASE_URL")
            .unwrap_or_else(|| "https://api.coingecko.com/api/v3".to_string());

        let gemini_api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .unwrap_or_default();
        let gemini_model =
            lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-3-flash-preview".to_string());
        let gemini_base_url = lookup("GEMINI_BASE_URL")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let users_file = lookup("CRYVEX_USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("cryvex_users.json"));

        let verification_code = lookup("CRYVEX_VERIFICATION_CODE")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERIFICATION_CODE.to_string());

        let log_dir = lookup("CRYVEX_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        Ok(Settings {
            currency,
            per_page,
            refresh_interval: Duration::from_secs(clamped),
            request_timeout: Duration::from_secs(timeout_secs),
            coingecko_base_url,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            users_file,
            verification_code,
            log_dir,
        })
    }
}

/// Répertoire de données de l'utilisateur
/// - Linux : ~/.local/share/cryvex
/// - macOS : ~/Library/Application Support/cryvex
/// - repli : répertoire courant
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("cryvex"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

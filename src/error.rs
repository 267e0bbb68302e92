// ============================================================================
// Erreurs typées
// ============================================================================
// Une enum par préoccupation. Le binaire et le code de colle utilisent
// anyhow ; la bibliothèque expose ces types pour que l'appelant puisse
// distinguer les cas (ex: rate-limit vs panne réseau).
// ============================================================================

use thiserror::Error;

/// Erreurs du fournisseur de données de marché
#[derive(Error, Debug)]
pub enum MarketError {
    /// HTTP 429 : cas attendu, déclenche le mode démo
    #[error("rate limited by market data provider (HTTP 429)")]
    RateLimited,

    #[error("market data provider returned HTTP {0}")]
    Status(u16),

    #[error("market data request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Erreurs de l'authentification de démo, affichées telles quelles
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Cet e-mail est déjà utilisé")]
    EmailTaken,

    #[error("E-mail ou mot de passe invalide")]
    InvalidCredentials,

    #[error("Code de vérification invalide")]
    InvalidCode,

    #[error("Aucune inscription en attente de vérification")]
    NoPendingRegistration,

    #[error("Aucune session ouverte")]
    NotLoggedIn,

    #[error("E-mail et mot de passe sont obligatoires")]
    MissingFields,

    #[error("Erreur de stockage local : {0}")]
    Storage(String),
}

/// Erreurs du fournisseur d'IA générative
#[derive(Error, Debug)]
pub enum AiError {
    #[error("GEMINI_API_KEY is missing")]
    MissingApiKey,

    #[error("AI provider returned HTTP {0}")]
    Status(u16),

    #[error("AI provider returned an empty response")]
    EmptyResponse,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Erreurs de configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown currency '{0}' (expected usd or brl)")]
    UnknownCurrency(String),
}

// ============================================================================
// Cryvex - Library
// ============================================================================
// Cœur du dashboard crypto : données, synchronisation, alertes, sessions
// ============================================================================

pub mod alerts;    // Règles d'alerte en mémoire
pub mod api;       // Clients CoinGecko et Gemini
pub mod app;       // État de l'application
pub mod config;    // Configuration (variables d'environnement)
pub mod error;     // Erreurs typées
pub mod models;    // Structures de données
pub mod session;   // Authentification de démo
pub mod sync;      // Synchronisation du marché

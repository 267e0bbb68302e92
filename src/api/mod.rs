// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les clients des services externes :
// - CoinGecko : données de marché
// - Gemini : commentaires, news et projections générés par IA
// ============================================================================

pub mod coingecko; // Client API CoinGecko
pub mod gemini;    // Client API Gemini

// Re-export des types principaux
pub use coingecko::{CoinGeckoClient, CoinMarket, MarketProvider};
pub use gemini::GeminiClient;

// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère le top-N des cryptomonnaies depuis /coins/markets
//
// CONCEPTS RUST AVANCÉS :
// 1. Trait async (async-trait) : le fournisseur est interchangeable,
//    les tests utilisent un mock (mockall) ou un faux fournisseur
// 2. Erreurs typées : HTTP 429 devient MarketError::RateLimited
// 3. Serde : champs optionnels (null ou absents) => 0
// ============================================================================

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::MarketError;
use crate::models::{Asset, Currency, Macd, Strength, Trend};

// ============================================================================
// Structure pour parser la réponse JSON de CoinGecko
// ============================================================================
// CoinGecko retourne un tableau plat d'objets. Seul "id" est obligatoire :
// tous les champs numériques peuvent être null ou absents.
// ============================================================================

/// Un élément du tableau retourné par /coins/markets
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
}

impl CoinMarket {
    /// Convertit l'enregistrement fournisseur en Asset interne
    ///
    /// RSI et MACD sont tirés au hasard (placeholders d'affichage).
    /// Le générateur est passé en paramètre pour que les tests soient
    /// déterministes.
    pub fn into_asset<R: Rng + ?Sized>(self, rng: &mut R) -> Asset {
        let change_24h = self.price_change_percentage_24h.unwrap_or(0.0);

        Asset {
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            image: self.image.unwrap_or_default(),
            price: self.current_price.unwrap_or(0.0),
            change_1h: self.price_change_percentage_1h_in_currency.unwrap_or(0.0),
            change_24h,
            change_7d: self.price_change_percentage_7d_in_currency.unwrap_or(0.0),
            market_cap: self.market_cap.unwrap_or(0.0),
            volume_24h: self.total_volume.unwrap_or(0.0),
            rsi: f64::from(rng.gen_range(35u8..75)),
            macd: Macd {
                value: rng.gen_range(0.0..100.0),
                signal: rng.gen_range(0.0..80.0),
            },
            trend: Trend::from_change(change_24h),
            strength: Strength::from_change(change_24h),
            id: self.id,
        }
    }
}

/// Convertit tout le tableau, sans jamais filtrer d'élément
pub fn map_markets<R: Rng + ?Sized>(coins: Vec<CoinMarket>, rng: &mut R) -> Vec<Asset> {
    coins.into_iter().map(|coin| coin.into_asset(rng)).collect()
}

/// Parse le corps JSON d'une réponse /coins/markets
pub fn parse_markets(body: &[u8]) -> Result<Vec<CoinMarket>, MarketError> {
    Ok(serde_json::from_slice(body)?)
}

// ============================================================================
// Trait : MarketProvider
// ============================================================================
// CONCEPT RUST : Trait object + async
// - async fn dans un trait nécessite async-trait (Box<dyn Future>)
// - Send + Sync : le fournisseur est partagé entre tâches tokio
// ============================================================================

/// Source de données de marché
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Récupère le top `per_page` des actifs, cotés dans `currency`
    async fn fetch_markets(
        &self,
        currency: Currency,
        per_page: u32,
    ) -> Result<Vec<CoinMarket>, MarketError>;
}

/// Client HTTP CoinGecko
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// Crée un client pour l'URL de base donnée
    /// (ex: "https://api.coingecko.com/api/v3")
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cryvex/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Construit l'URL /coins/markets
    fn markets_url(&self, currency: Currency, per_page: u32) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=1h,24h,7d",
            self.base_url,
            currency.code(),
            per_page
        )
    }
}

#[async_trait]
impl MarketProvider for CoinGeckoClient {
    #[instrument(skip(self), fields(currency = %currency))]
    async fn fetch_markets(
        &self,
        currency: Currency,
        per_page: u32,
    ) -> Result<Vec<CoinMarket>, MarketError> {
        let url = self.markets_url(currency, per_page);
        debug!(url = %url, "Sending HTTP request to CoinGecko");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // 429 est un cas attendu avec son propre chemin de reprise
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("CoinGecko rate limit reached");
            return Err(MarketError::RateLimited);
        }

        if !status.is_success() {
            error!(status = %status, "CoinGecko returned error status");
            return Err(MarketError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let coins = parse_markets(&body)?;

        info!(assets = coins.len(), "Successfully fetched market data");
        Ok(coins)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

// ============================================================================
// API Client : Gemini (IA générative)
// ============================================================================
// Deux types d'appels :
// 1. Complétion texte : commentaire court sur un actif
// 2. Complétion structurée (JSON schema) : news et projets à venir
//
// En cas d'indisponibilité :
// - analyze_market retourne un texte de repli (jamais d'erreur)
// - fetch_news / fetch_upcoming_coins remontent l'erreur à l'appelant
// ============================================================================

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::AiError;
use crate::models::{Asset, NewsItem, UpcomingCoin};

/// Texte affiché quand l'analyse ne peut pas être générée
pub const ANALYSIS_FALLBACK: &str = "Erreur lors du traitement de l'analyse intelligente.";

/// Texte affiché quand la réponse est vide
pub const ANALYSIS_EMPTY: &str = "Impossible de générer l'analyse pour le moment.";

// ============================================================================
// Structures pour parser la réponse generateContent
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatène les parties texte du premier candidat
    fn into_text(self) -> Result<String, AiError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Client HTTP Gemini
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cryvex/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Appel generateContent brut
    ///
    /// `schema` : Some(...) pour une réponse JSON structurée
    async fn generate(&self, prompt: &str, schema: Option<Value>) -> Result<String, AiError> {
        if !self.has_key() {
            return Err(AiError::MissingApiKey);
        }

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if let Some(schema) = schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }

        let response = self
            .http
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "Received AI provider response");
        if !status.is_success() {
            error!(status = %status, "AI provider returned error status");
            return Err(AiError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text()
    }

    /// Appel structuré : parse le texte retourné comme JSON
    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
    ) -> Result<T, AiError> {
        let text = self.generate(prompt, Some(schema)).await?;
        Ok(serde_json::from_str(text.trim())?)
    }

    /// Commentaire court (3 phrases max) sur un actif
    ///
    /// Ne retourne jamais d'erreur : repli sur un texte statique.
    #[instrument(skip(self, asset), fields(asset = %asset.id))]
    pub async fn analyze_market(&self, asset: &Asset) -> String {
        match self.generate(&analysis_prompt(asset), None).await {
            Ok(text) => {
                info!(chars = text.len(), "Market analysis generated");
                text.trim().to_string()
            }
            Err(AiError::EmptyResponse) => {
                warn!("AI provider returned an empty analysis");
                ANALYSIS_EMPTY.to_string()
            }
            Err(e) => {
                error!(error = %e, "AI analysis failed, using fallback");
                ANALYSIS_FALLBACK.to_string()
            }
        }
    }

    /// Génère des news de marché pour les actifs donnés
    #[instrument(skip(self, assets), fields(assets = assets.len()))]
    pub async fn fetch_news(&self, assets: &[Asset]) -> Result<Vec<NewsItem>, AiError> {
        let mut news: Vec<NewsItem> =
            self.generate_json(&news_prompt(assets), news_schema()).await?;

        for item in news.iter_mut() {
            if item.id.is_empty() {
                item.id = Uuid::new_v4().to_string();
            }
            item.coins.iter_mut().for_each(|c| *c = c.to_uppercase());
        }

        info!(items = news.len(), "News generated");
        Ok(news)
    }

    /// Génère des projections de projets crypto à venir
    #[instrument(skip(self))]
    pub async fn fetch_upcoming_coins(&self) -> Result<Vec<UpcomingCoin>, AiError> {
        let mut coins: Vec<UpcomingCoin> = self
            .generate_json(UPCOMING_PROMPT, upcoming_schema())
            .await?;

        for coin in coins.iter_mut() {
            if coin.id.is_empty() {
                coin.id = Uuid::new_v4().to_string();
            }
        }

        info!(items = coins.len(), "Upcoming coins generated");
        Ok(coins)
    }
}

// ============================================================================
// Prompts et schémas
// ============================================================================

/// Prompt construit depuis le snapshot courant d'un actif
pub fn analysis_prompt(asset: &Asset) -> String {
    format!(
        "Agis comme un analyste senior en cryptomonnaies.\n\
         Analyse brièvement les données techniques actuelles de {} ({}) :\n\
         - Prix : {}\n\
         - RSI : {:.0}\n\
         - Variation 24h : {:.2}%\n\
         - Tendance : {}\n\
         - Force du mouvement : {}\n\n\
         Donne une conclusion rapide (3 phrases maximum) en français, orientée décision : \
         \"Acheter\", \"Vendre\" ou \"Attendre\", en expliquant pourquoi simplement pour un débutant.",
        asset.name,
        asset.symbol,
        asset.price,
        asset.rsi,
        asset.change_24h,
        asset.trend.label(),
        asset.strength.label(),
    )
}

fn news_prompt(assets: &[Asset]) -> String {
    let symbols: Vec<&str> = assets.iter().take(10).map(|a| a.symbol.as_str()).collect();
    format!(
        "Génère 5 news récentes et plausibles du marché crypto concernant en priorité : {}. \
         Pour chaque news : titre, résumé d'une phrase, source, impact (Low, Medium ou High) \
         et la liste des symboles concernés.",
        symbols.join(", ")
    )
}

const UPCOMING_PROMPT: &str = "Liste 6 projets crypto dont le lancement du token est prévu en 2026, \
     d'après leurs roadmaps publiques et leur activité GitHub. Pour chacun : nom, symbole, \
     catégorie, plateforme, date de lancement estimée, score de hype (0-100) et résumé court.";

fn news_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "summary": { "type": "STRING" },
                "source": { "type": "STRING" },
                "impact": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
                "coins": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["title", "summary", "source", "impact", "coins"]
        }
    })
}

fn upcoming_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "symbol": { "type": "STRING" },
                "category": { "type": "STRING" },
                "platform": { "type": "STRING" },
                "launchDate": { "type": "STRING" },
                "hypeScore": { "type": "INTEGER" },
                "summary": { "type": "STRING" }
            },
            "required": ["name", "symbol", "category", "platform", "launchDate", "hypeScore", "summary"]
        }
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::samples::sample_assets;

    fn client_without_key() -> GeminiClient {
        GeminiClient::new("http://127.0.0.1:9", "test-model", "").unwrap()
    }

    #[test]
    fn test_prompt_contains_snapshot() {
        let btc = sample_assets().remove(0);
        let prompt = analysis_prompt(&btc);
        assert!(prompt.contains("Bitcoin (BTC)"));
        assert!(prompt.contains("RSI : 58"));
        assert!(prompt.contains("Bullish"));
    }

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new("https://host/v1beta/", "m1", "k").unwrap();
        assert_eq!(client.generate_url(), "https://host/v1beta/models/m1:generateContent");
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Attendre. "},{"text":"RSI neutre."}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "Attendre. RSI neutre.");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(AiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_without_network() {
        let client = client_without_key();
        let btc = sample_assets().remove(0);

        assert_eq!(client.analyze_market(&btc).await, ANALYSIS_FALLBACK);
        assert!(matches!(
            client.fetch_news(&[btc]).await,
            Err(AiError::MissingApiKey)
        ));
        assert!(matches!(
            client.fetch_upcoming_coins().await,
            Err(AiError::MissingApiKey)
        ));
    }
}

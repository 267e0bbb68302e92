// ============================================================================
// Données d'échantillon (mode démo)
// ============================================================================
// Jeu statique affiché quand le fournisseur est injoignable ou limité
// et qu'aucune donnée précédente n'est disponible.
// ============================================================================

use chrono::{Duration, Utc};

use crate::models::{Asset, Impact, Macd, NewsItem, Strength, Trend};

/// Symboles considérés comme memecoins par le filtre du dashboard
pub const MEMECOIN_SYMBOLS: [&str; 10] = [
    "DOGE", "SHIB", "PEPE", "FLOKI", "BONK", "WIF", "MYRO", "MEME", "COQ", "BOME",
];

/// Construit un asset d'échantillon
///
/// CONCEPT RUST : fonction privée utilitaire
/// - Évite de répéter 14 champs pour chaque actif
#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    symbol: &str,
    name: &str,
    price: f64,
    changes: (f64, f64, f64),
    market_cap: f64,
    volume_24h: f64,
    rsi: f64,
    macd: (f64, f64),
    trend: Trend,
    strength: Strength,
) -> Asset {
    let (change_1h, change_24h, change_7d) = changes;
    Asset {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        image: String::new(),
        price,
        change_1h,
        change_24h,
        change_7d,
        market_cap,
        volume_24h,
        rsi,
        macd: Macd {
            value: macd.0,
            signal: macd.1,
        },
        trend,
        strength,
    }
}

/// Actifs d'échantillon (toujours non vide, contient "bitcoin")
pub fn sample_assets() -> Vec<Asset> {
    vec![
        sample(
            "bitcoin",
            "BTC",
            "Bitcoin",
            64230.45,
            (0.25, 3.42, -1.2),
            1_260_000_000_000.0,
            35_000_000_000.0,
            58.0,
            (120.0, 95.0),
            Trend::Bullish,
            Strength::Strong,
        ),
        sample(
            "ethereum",
            "ETH",
            "Ethereum",
            3450.12,
            (-0.12, 1.5, 5.4),
            415_000_000_000.0,
            15_000_000_000.0,
            62.0,
            (45.0, 30.0),
            Trend::Bullish,
            Strength::Medium,
        ),
        sample(
            "solana",
            "SOL",
            "Solana",
            145.67,
            (1.2, 8.9, 12.5),
            65_000_000_000.0,
            4_200_000_000.0,
            71.0,
            (8.0, 2.0),
            Trend::Bullish,
            Strength::Strong,
        ),
        sample(
            "cardano",
            "ADA",
            "Cardano",
            0.45,
            (-0.5, -2.3, -4.1),
            16_000_000_000.0,
            300_000_000.0,
            35.0,
            (-0.01, -0.005),
            Trend::Bearish,
            Strength::Medium,
        ),
        sample(
            "ripple",
            "XRP",
            "XRP",
            0.61,
            (0.05, 0.4, 2.1),
            33_000_000_000.0,
            1_200_000_000.0,
            48.0,
            (0.002, 0.001),
            Trend::Neutral,
            Strength::Weak,
        ),
    ]
}

/// News statiques, horodatées relativement à maintenant
pub fn sample_news() -> Vec<NewsItem> {
    let now = Utc::now();
    vec![
        NewsItem {
            id: "1".to_string(),
            title: "SEC Greenlights New Crypto ETF Structure".to_string(),
            summary: "A major breakthrough in regulation as the SEC approves a novel diversified index fund strategy.".to_string(),
            source: "CoinDesk".to_string(),
            timestamp: now - Duration::hours(1),
            impact: Impact::High,
            coins: vec!["BTC".to_string(), "ETH".to_string()],
        },
        NewsItem {
            id: "2".to_string(),
            title: "Solana Network Activity Hits All-Time High".to_string(),
            summary: "DEX volume on Solana surpasses Ethereum as memecoin mania continues to drive users.".to_string(),
            source: "Decrypt".to_string(),
            timestamp: now - Duration::hours(2),
            impact: Impact::Medium,
            coins: vec!["SOL".to_string()],
        },
        NewsItem {
            id: "3".to_string(),
            title: "Central Bank Explores Digital Currency Integration".to_string(),
            summary: "Preliminary reports suggest a major economy is ready to pilot a retail CBDC by year-end.".to_string(),
            source: "Reuters Finance".to_string(),
            timestamp: now - Duration::hours(4),
            impact: Impact::Low,
            coins: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_assets_contain_bitcoin() {
        let assets = sample_assets();
        assert!(!assets.is_empty());
        assert!(assets.iter().any(|a| a.id == "bitcoin"));
    }

    #[test]
    fn test_sample_news_is_ordered_newest_first() {
        let news = sample_news();
        assert_eq!(news.len(), 3);
        assert!(news[0].timestamp > news[1].timestamp);
        assert!(news[1].timestamp > news[2].timestamp);
    }
}

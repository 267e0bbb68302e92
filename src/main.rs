// ============================================================================
// Cryvex - Dashboard crypto en ligne de commande
// ============================================================================
// Synchronise périodiquement le top du marché et affiche le tableau
//
// CONCEPTS RUST CLÉS :
// 1. #[tokio::main] : runtime async pour les appels HTTP
// 2. Arc<Mutex<App>> : état partagé entre la boucle et la synchronisation
// 3. tokio::select! : rafraîchissement périodique OU Ctrl+C
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use cryvex::api::{CoinGeckoClient, GeminiClient};
use cryvex::app::{App, SharedApp};
use cryvex::config::Settings;
use cryvex::models::samples::sample_news;
use cryvex::session::SessionStore;
use cryvex::sync::{MarketSync, SyncOutcome};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Logs vers un fichier à rotation quotidienne : la sortie standard reste
// réservée au tableau de marché.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/cryvex/logs/cryvex.log
/// RUST_LOG=cryvex=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "cryvex.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryvex=debug,info".into()),
        )
        .init();

    info!(log_dir = %log_dir.display(), "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Configuration invalide")?;

    // Sans logs on continue quand même
    init_logging(&settings.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        currency = %settings.currency,
        per_page = settings.per_page,
        refresh_secs = settings.refresh_interval.as_secs(),
        "Cryvex starting up"
    );

    let sessions = SessionStore::open(&settings.users_file, settings.verification_code.clone())
        .context("Impossible d'ouvrir le fichier utilisateurs")?;
    let app = App::new(settings.currency, sessions).into_shared();

    let provider = Arc::new(CoinGeckoClient::new(&settings.coingecko_base_url)?);
    let sync = MarketSync::from_settings(provider, &settings);
    let gemini = GeminiClient::new(
        &settings.gemini_base_url,
        &settings.gemini_model,
        &settings.gemini_api_key,
    )?;

    println!("📊 Chargement des données...\n");

    // Première synchronisation, puis insights IA une seule fois
    let outcome = sync.sync(&app).await;
    print_dashboard(&app, &outcome).await;
    print_insights(&gemini, &app).await;

    // CONCEPT : Timer possédé par l'appelant
    // - MarketSync ne se replanifie jamais lui-même
    // - interval() tick immédiatement : on consomme ce premier tick
    let mut ticker = tokio::time::interval(settings.refresh_interval);
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = &mut shutdown => {
                sync.shutdown(&app).await;
                break;
            }
            outcome = sync.sync(&app) => print_dashboard(&app, &outcome).await,
        }
    }

    info!("Cryvex shutting down");
    println!("\n👋 Au revoir");
    Ok(())
}

// ============================================================================
// Affichage
// ============================================================================

/// Affiche le tableau de marché (actifs visibles, triés et filtrés)
async fn print_dashboard(app: &SharedApp, outcome: &SyncOutcome) {
    let state = app.lock().await;

    let status = match outcome {
        SyncOutcome::Live { .. } => "LIVE",
        SyncOutcome::RateLimited { .. } => "DEMO (rate limit)",
        SyncOutcome::Fallback { .. } if state.demo_mode => "DEMO (hors ligne)",
        SyncOutcome::Fallback { .. } => "HORS LIGNE (données précédentes)",
        SyncOutcome::Superseded => return,
    };

    let updated = state
        .last_updated
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "=== Cryvex [{}] {} | filtre: {} | maj: {} ===",
        state.currency,
        status,
        state.filter.label(),
        updated
    );

    for asset in state.visible_assets() {
        println!("  {}", asset.display(state.currency));
    }

    let dangling = state.alerts.dangling(&state.assets).len();
    if dangling > 0 {
        println!("  ⚠️  {} alerte(s) sur des actifs absents du classement", dangling);
    }
    println!();
}

/// Analyse IA de l'actif sélectionné et news du marché
async fn print_insights(gemini: &GeminiClient, app: &SharedApp) {
    // Copie des données : le verrou n'est pas tenu pendant les appels réseau
    let (selected, assets) = {
        let state = app.lock().await;
        (state.selected_asset().cloned(), state.assets.clone())
    };

    if let Some(asset) = selected {
        let analysis = gemini.analyze_market(&asset).await;
        println!("🤖 {} : {}\n", asset.name, analysis);
    }

    let news = match gemini.fetch_news(&assets).await {
        Ok(news) if !news.is_empty() => news,
        Ok(_) => sample_news(),
        Err(e) => {
            warn!(error = %e, "News unavailable, using sample news");
            sample_news()
        }
    };

    println!("📰 News :");
    for item in news {
        println!("  [{}] {} ({})", item.coins.join(","), item.title, item.source);
    }
    println!();
}

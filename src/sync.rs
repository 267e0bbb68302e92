// ============================================================================
// Market Sync
// ============================================================================
// Synchronise la collection d'actifs de l'App avec le fournisseur
//
// Contrat d'un appel à sync() :
// 1. Annule la requête précédente si elle est encore en vol
// 2. Active is_updating
// 3. Une seule requête, bornée par un timeout côté client
// 4. Succès : remplace toute la collection, horodate, sort du mode démo
// 5. HTTP 429 : mode démo ; données précédentes ou échantillon
// 6. Autre échec : données précédentes, sinon échantillon (mode démo)
//
// CONCEPT : Single-flight
// - Un CancellationToken par appel, annulé par l'appel suivant
// - Un numéro de génération vérifié sous le verrou de l'App : un appel
//   dépassé ne peut jamais écrire après le plus récent
//
// Le timer qui rappelle sync() appartient à l'appelant (pas de backoff).
// ============================================================================

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::api::coingecko::{map_markets, CoinMarket, MarketProvider};
use crate::app::{App, SharedApp};
use crate::config::Settings;
use crate::error::MarketError;
use crate::models::samples::sample_assets;

/// Résultat d'un appel, pour les logs et l'affichage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Données live appliquées
    Live { count: usize },
    /// HTTP 429 : mode démo
    RateLimited { used_sample: bool },
    /// Réseau, timeout, parsing... : données conservées ou échantillon
    Fallback { reason: String, used_sample: bool },
    /// Annulé par un appel plus récent, rien n'a été écrit
    Superseded,
}

/// Requête en vol (protégée par un Mutex std, jamais tenu pendant un await)
#[derive(Debug, Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

pub struct MarketSync {
    provider: Arc<dyn MarketProvider>,
    per_page: u32,
    timeout: Duration,
    in_flight: Mutex<InFlight>,
}

impl MarketSync {
    pub fn new(provider: Arc<dyn MarketProvider>, per_page: u32, timeout: Duration) -> Self {
        Self {
            provider,
            per_page,
            timeout,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn from_settings(provider: Arc<dyn MarketProvider>, settings: &Settings) -> Self {
        Self::new(provider, settings.per_page, settings.request_timeout)
    }

    /// Lance une synchronisation
    ///
    /// Ne retourne jamais d'erreur : chaque échec dégrade vers un état de repli.
    #[instrument(skip(self, app))]
    pub async fn sync(&self, app: &SharedApp) -> SyncOutcome {
        let (generation, token) = self.begin();

        let currency = {
            let mut state = app.lock().await;
            state.start_updating();
            state.currency
        };
        debug!(generation, currency = %currency, "Market sync started");

        let fetch = tokio::time::timeout(
            self.timeout,
            self.provider.fetch_markets(currency, self.per_page),
        );

        // CONCEPT : select! sur l'annulation
        // - Si un appel plus récent annule le token, la future HTTP est
        //   droppée (requête abandonnée) et on sort sans rien écrire
        let result = tokio::select! {
            _ = token.cancelled() => None,
            result = fetch => Some(match result {
                Ok(inner) => inner,
                Err(_) => Err(MarketError::Timeout(self.timeout.as_secs())),
            }),
        };

        let mut state = app.lock().await;

        let Some(result) = result else {
            info!(generation, "Market sync cancelled");
            self.release_orphaned_flag(&mut state);
            return SyncOutcome::Superseded;
        };

        // Vérifié sous le verrou de l'App : l'appel plus récent ne peut pas
        // avoir déjà écrit puis être écrasé par celui-ci
        if !self.is_current(generation) {
            info!(generation, "Market sync result discarded (superseded)");
            self.release_orphaned_flag(&mut state);
            return SyncOutcome::Superseded;
        }

        let outcome = apply_result(&mut state, result);
        state.stop_updating();
        drop(state);

        self.finish(generation);
        log_outcome(&outcome);
        outcome
    }

    /// Annule la requête en vol
    ///
    /// L'appel annulé retourne Superseded et éteint lui-même is_updating.
    pub fn cancel(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = in_flight.token.take() {
            token.cancel();
            // Invalide aussi la génération en cours
            in_flight.generation += 1;
            debug!("In-flight market sync cancelled");
        }
    }

    /// Arrêt : annule la requête en vol et éteint l'indicateur
    ///
    /// Pour l'appelant qui a droppé la future de sync() (ex: Ctrl+C) :
    /// l'appel abandonné ne peut plus remettre is_updating à false.
    pub async fn shutdown(&self, app: &SharedApp) {
        self.cancel();
        let mut state = app.lock().await;
        self.release_orphaned_flag(&mut state);
    }

    /// Vrai si une requête est en cours
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    /// Enregistre un nouvel appel et annule le précédent
    fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = in_flight.token.replace(token.clone()) {
            debug!(previous = in_flight.generation, "Cancelling previous market sync");
            previous.cancel();
        }
        in_flight.generation += 1;

        (in_flight.generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
            == generation
    }

    /// Éteint is_updating si aucun appel n'est plus enregistré
    ///
    /// Appelé sous le verrou de l'App. Si un appel plus récent existe,
    /// c'est lui qui possède l'indicateur.
    fn release_orphaned_flag(&self, state: &mut App) {
        if !self.is_in_flight() {
            state.stop_updating();
        }
    }

    fn finish(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.generation == generation {
            in_flight.token = None;
        }
    }
}

/// Applique le résultat du fournisseur à l'état
///
/// Fonction synchrone : appelée sous le verrou de l'App, aucune attente.
fn apply_result(state: &mut App, result: Result<Vec<CoinMarket>, MarketError>) -> SyncOutcome {
    match result {
        Ok(coins) => {
            let assets = map_markets(coins, &mut rand::thread_rng());
            let count = assets.len();
            state.replace_assets(assets);
            state.last_updated = Some(Utc::now());
            state.demo_mode = false;
            SyncOutcome::Live { count }
        }
        Err(MarketError::RateLimited) => {
            state.demo_mode = true;
            let used_sample = fill_with_sample_if_empty(state);
            SyncOutcome::RateLimited { used_sample }
        }
        Err(e) => {
            let used_sample = fill_with_sample_if_empty(state);
            if used_sample {
                state.demo_mode = true;
            }
            SyncOutcome::Fallback {
                reason: e.to_string(),
                used_sample,
            }
        }
    }
}

/// Garde les données précédentes, sinon installe l'échantillon statique
fn fill_with_sample_if_empty(state: &mut App) -> bool {
    if state.assets.is_empty() {
        state.replace_assets(sample_assets());
        true
    } else {
        false
    }
}

fn log_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Live { count } => info!(assets = count, "Market data updated"),
        SyncOutcome::RateLimited { used_sample } => {
            warn!(used_sample, "Rate limited, demo mode enabled")
        }
        SyncOutcome::Fallback { reason, used_sample } => {
            warn!(reason = %reason, used_sample, "Market sync failed, keeping fallback data")
        }
        SyncOutcome::Superseded => debug!("Market sync superseded"),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::coingecko::MockMarketProvider;
    use crate::app::tests::test_app;
    use crate::models::{Currency, Trend};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn coin(id: &str, price: f64, change_24h: f64) -> CoinMarket {
        CoinMarket {
            id: id.to_string(),
            symbol: id[..3.min(id.len())].to_string(),
            name: id.to_string(),
            current_price: Some(price),
            price_change_percentage_24h: Some(change_24h),
            ..Default::default()
        }
    }

    fn sync_with(mock: MockMarketProvider) -> MarketSync {
        MarketSync::new(Arc::new(mock), 50, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_replaces_collection() {
        let mut mock = MockMarketProvider::new();
        mock.expect_fetch_markets()
            .times(1)
            .returning(|currency, per_page| {
                assert_eq!(currency, Currency::Usd);
                assert_eq!(per_page, 50);
                Ok(vec![
                    coin("bitcoin", 70000.0, 5.0),
                    coin("ethereum", 3000.0, -1.0),
                    coin("tether", 1.0, 0.0),
                ])
            });

        let app = test_app().into_shared();
        app.lock().await.demo_mode = true;

        let outcome = sync_with(mock).sync(&app).await;
        assert_eq!(outcome, SyncOutcome::Live { count: 3 });

        let state = app.lock().await;
        assert_eq!(state.assets.len(), 3);
        assert!(!state.demo_mode);
        assert!(!state.is_updating);
        assert!(state.last_updated.is_some());

        let btc = state.asset("bitcoin").unwrap();
        assert_eq!(btc.price, 70000.0);
        assert_eq!(btc.trend, Trend::Bullish);
        assert_eq!(state.asset("ethereum").unwrap().trend, Trend::Bearish);
        assert_eq!(state.asset("tether").unwrap().trend, Trend::Neutral);
    }

    #[tokio::test]
    async fn test_rate_limit_on_empty_state_uses_sample() {
        let mut mock = MockMarketProvider::new();
        mock.expect_fetch_markets()
            .returning(|_, _| Err(MarketError::RateLimited));

        let app = test_app().into_shared();
        let outcome = sync_with(mock).sync(&app).await;
        assert_eq!(outcome, SyncOutcome::RateLimited { used_sample: true });

        let state = app.lock().await;
        assert!(state.demo_mode);
        assert!(!state.is_updating);
        assert!(state.asset("bitcoin").is_some());
        assert!(state.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_keeps_previous_data() {
        let mut mock = MockMarketProvider::new();
        let mut calls = 0;
        mock.expect_fetch_markets().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(vec![coin("dogecoin", 0.15, 12.0)])
            } else {
                Err(MarketError::RateLimited)
            }
        });

        let app = test_app().into_shared();
        let sync = sync_with(mock);
        sync.sync(&app).await;
        let outcome = sync.sync(&app).await;

        assert_eq!(outcome, SyncOutcome::RateLimited { used_sample: false });
        let state = app.lock().await;
        assert!(state.demo_mode);
        assert_eq!(state.assets.len(), 1);
        assert_eq!(state.assets[0].id, "dogecoin");
    }

    #[tokio::test]
    async fn test_network_failure_keeps_previous_data() {
        let mut mock = MockMarketProvider::new();
        mock.expect_fetch_markets()
            .returning(|_, _| Err(MarketError::Status(503)));

        let app = test_app().into_shared();
        app.lock().await.replace_assets(vec![
            coin("solana", 150.0, 2.0).into_asset(&mut rand::thread_rng()),
        ]);

        let outcome = sync_with(mock).sync(&app).await;
        assert!(matches!(
            outcome,
            SyncOutcome::Fallback { used_sample: false, .. }
        ));

        let state = app.lock().await;
        assert!(!state.demo_mode);
        assert_eq!(state.assets.len(), 1);
        assert_eq!(state.assets[0].id, "solana");
    }

    #[tokio::test]
    async fn test_network_failure_on_empty_state_uses_sample() {
        let mut mock = MockMarketProvider::new();
        mock.expect_fetch_markets()
            .returning(|_, _| Err(MarketError::Status(500)));

        let app = test_app().into_shared();
        let outcome = sync_with(mock).sync(&app).await;

        assert!(matches!(outcome, SyncOutcome::Fallback { used_sample: true, .. }));
        let state = app.lock().await;
        assert!(state.demo_mode);
        assert!(!state.assets.is_empty());
    }

    // ========================================================================
    // Faux fournisseurs pour le timeout et l'annulation
    // ========================================================================

    /// Ne répond jamais avant 60 secondes
    struct SlowProvider;

    #[async_trait]
    impl MarketProvider for SlowProvider {
        async fn fetch_markets(&self, _: Currency, _: u32) -> Result<Vec<CoinMarket>, MarketError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![coin("late", 1.0, 1.0)])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_failure() {
        let sync = MarketSync::new(Arc::new(SlowProvider), 50, Duration::from_secs(10));
        let app = test_app().into_shared();

        let outcome = sync.sync(&app).await;
        assert_eq!(
            outcome,
            SyncOutcome::Fallback {
                reason: MarketError::Timeout(10).to_string(),
                used_sample: true,
            }
        );
        assert!(app.lock().await.asset("late").is_none());
        assert!(!sync.is_in_flight());
    }

    /// Premier appel : bloqué jusqu'à ouverture de la porte, retourne "stale"
    /// Appels suivants : immédiats, retournent "fresh"
    struct GatedProvider {
        calls: AtomicUsize,
        started: Notify,
        gate: Notify,
        returned: Notify,
    }

    impl GatedProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                gate: Notify::new(),
                returned: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl MarketProvider for GatedProvider {
        async fn fetch_markets(&self, _: Currency, _: u32) -> Result<Vec<CoinMarket>, MarketError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.started.notify_one();
                self.gate.notified().await;
                self.returned.notify_one();
                Ok(vec![coin("stale", 1.0, -1.0)])
            } else {
                Ok(vec![coin("fresh", 2.0, 1.0), coin("fresher", 3.0, 1.0)])
            }
        }
    }

    fn spawn_sync(sync: &Arc<MarketSync>, app: &SharedApp) -> tokio::task::JoinHandle<SyncOutcome> {
        let sync = sync.clone();
        let app = app.clone();
        tokio::spawn(async move { sync.sync(&app).await })
    }

    fn generation(sync: &MarketSync) -> u64 {
        sync.in_flight.lock().unwrap().generation
    }

    #[tokio::test]
    async fn test_newer_sync_cancels_older_one() {
        let provider = GatedProvider::new();
        let sync = Arc::new(MarketSync::new(provider.clone(), 50, Duration::from_secs(30)));
        let app = test_app().into_shared();

        let first = spawn_sync(&sync, &app);

        // Le premier appel est en vol
        provider.started.notified().await;
        assert!(app.lock().await.is_updating);
        assert!(sync.is_in_flight());

        let second = sync.sync(&app).await;
        assert_eq!(second, SyncOutcome::Live { count: 2 });

        // Même si la première requête finit par répondre, elle est ignorée
        provider.gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first, SyncOutcome::Superseded);

        let state = app.lock().await;
        assert!(state.asset("stale").is_none());
        assert!(state.asset("fresh").is_some());
        assert_eq!(state.assets.len(), 2);
        assert!(!state.is_updating);
        assert!(!sync.is_in_flight());
    }

    #[tokio::test]
    async fn test_ready_response_discarded_when_newer_call_registers() {
        let provider = GatedProvider::new();
        let sync = Arc::new(MarketSync::new(provider.clone(), 50, Duration::from_secs(30)));
        let app = test_app().into_shared();

        let first = spawn_sync(&sync, &app);
        provider.started.notified().await;

        // La réponse arrive pendant que l'App est verrouillée :
        // le premier appel a passé le select! et attend le verrou
        let guard = app.lock().await;
        provider.gate.notify_one();
        provider.returned.notified().await;

        // Un appel plus récent s'enregistre avant que le verrou soit libéré
        let second = spawn_sync(&sync, &app);
        while generation(&sync) < 2 {
            tokio::task::yield_now().await;
        }
        drop(guard);

        assert_eq!(first.await.unwrap(), SyncOutcome::Superseded);
        assert_eq!(second.await.unwrap(), SyncOutcome::Live { count: 2 });

        let state = app.lock().await;
        assert!(state.asset("stale").is_none());
        assert!(state.asset("fresh").is_some());
        assert!(!state.is_updating);
        assert!(!sync.is_in_flight());
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_request() {
        let provider = GatedProvider::new();
        let sync = Arc::new(MarketSync::new(provider.clone(), 50, Duration::from_secs(30)));
        let app = test_app().into_shared();

        let first = spawn_sync(&sync, &app);

        provider.started.notified().await;
        assert!(app.lock().await.is_updating);
        sync.cancel();

        assert_eq!(first.await.unwrap(), SyncOutcome::Superseded);
        let state = app.lock().await;
        assert!(state.assets.is_empty());
        assert!(!state.is_updating);
        assert!(!sync.is_in_flight());
    }

    #[tokio::test]
    async fn test_shutdown_after_dropped_sync_clears_flag() {
        let provider = GatedProvider::new();
        let sync = MarketSync::new(provider.clone(), 50, Duration::from_secs(30));
        let app = test_app().into_shared();

        // La future de sync() est droppée en plein vol (ex: Ctrl+C)
        tokio::select! {
            _ = sync.sync(&app) => panic!("the gated request cannot complete"),
            _ = provider.started.notified() => {}
        }
        assert!(app.lock().await.is_updating);
        assert!(sync.is_in_flight());

        sync.shutdown(&app).await;

        assert!(!app.lock().await.is_updating);
        assert!(!sync.is_in_flight());
        assert!(app.lock().await.assets.is_empty());
    }
}

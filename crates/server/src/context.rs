//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use homedash_core::{
    ConnectivityProbe, ContactNotifier, FavoritesService, HybridReconciler, SessionManager,
};
use homedash_domain::{AppConfig, Result};
use homedash_infra::{
    build_http_client, DbManager, DiscordNotifier, GoogleCalendarClient, GoogleIdentityProvider,
    GoogleIdentitySettings, SharedConnectivity, SqliteEventStore, SqliteFavoriteStore,
};
use homedash_infra::http::DEFAULT_HTTP_TIMEOUT;
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<DbManager>,
    pub sessions: Arc<SessionManager>,
    pub reconciler: Arc<HybridReconciler>,
    pub favorites: Arc<FavoritesService>,
    pub notifier: Option<Arc<dyn ContactNotifier>>,
    pub connectivity: Arc<SharedConnectivity>,
}

impl AppContext {
    /// Wire up the full context from configuration.
    ///
    /// Runs schema migrations and the startup reachability probe before
    /// returning.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let http = build_http_client(DEFAULT_HTTP_TIMEOUT)?;

        // Database + migrations
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        // Startup reachability probe initializes the connectivity state
        let probe_http =
            build_http_client(Duration::from_secs(config.connectivity.probe_timeout_secs))?;
        let connectivity =
            Arc::new(SharedConnectivity::from_probe(&probe_http, &config.connectivity.probe_url).await);
        info!(state = ?connectivity.state(), "startup connectivity");

        // Identity provider + session manager
        let identity = Arc::new(GoogleIdentityProvider::new(
            GoogleIdentitySettings::from_config(&config.google),
            http.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(identity));

        // Hybrid reconciler over the local store and remote calendar
        let remote =
            Arc::new(GoogleCalendarClient::new(config.google.calendar_endpoint.clone(), http.clone()));
        let event_store = Arc::new(SqliteEventStore::new(Arc::clone(&db)));
        let reconciler =
            Arc::new(HybridReconciler::new(
                remote,
                event_store,
                Arc::clone(&connectivity) as Arc<dyn ConnectivityProbe>,
            ));

        // Favorites
        let favorites =
            Arc::new(FavoritesService::new(Arc::new(SqliteFavoriteStore::new(Arc::clone(&db)))));

        // Contact notifier is optional; without a webhook the endpoint
        // reports a configuration error
        let notifier: Option<Arc<dyn ContactNotifier>> = config
            .discord
            .webhook_url
            .as_ref()
            .map(|url| Arc::new(DiscordNotifier::new(url.clone(), http)) as Arc<dyn ContactNotifier>);

        Ok(Self { config, db, sessions, reconciler, favorites, notifier, connectivity })
    }
}

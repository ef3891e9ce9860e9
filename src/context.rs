/// Application context - shared state for all request handlers
use crate::{
    config::ServerConfig,
    coordinator::VerificationCoordinator,
    db,
    error::AppResult,
    store::{SqliteVerificationStore, StoreHealth},
    verification::HttpVerificationClient,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context shared across all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Verification store database
    pub db: SqlitePool,

    /// Store connectivity, checked before every gated route
    pub store_health: StoreHealth,

    /// Lookup-or-verify flow
    pub coordinator: Arc<VerificationCoordinator>,
}

impl AppContext {
    /// Create a new application context
    ///
    /// Fails if the store cannot be reached; callers treat this as fatal.
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        // Validate configuration
        config.validate()?;

        let db_options = db::DatabaseOptions {
            max_connections: config.storage.max_connections,
            acquire_timeout: config.timeout(),
            ..Default::default()
        };
        let db = db::create_pool(&config.storage.database_url, &db_options).await?;

        // Run migrations
        db::run_migrations(&db).await?;

        // Test connection
        db::test_connection(&db).await?;
        let store_health = StoreHealth::new(true);

        let store = Arc::new(SqliteVerificationStore::new(db.clone(), config.timeout()));
        let verifier = Arc::new(HttpVerificationClient::new(
            &config.verification.api_url,
            config.timeout(),
        )?);
        tracing::info!(endpoint = verifier.endpoint(), "Remote verification client ready");
        let coordinator = Arc::new(VerificationCoordinator::new(store, verifier));

        Ok(Self::from_parts(config, db, store_health, coordinator))
    }

    /// Assemble a context from already-built components
    pub fn from_parts(
        config: ServerConfig,
        db: SqlitePool,
        store_health: StoreHealth,
        coordinator: Arc<VerificationCoordinator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            store_health,
            coordinator,
        }
    }

    /// Start the store connectivity monitor
    pub fn start_health_monitor(&self) -> tokio::task::JoinHandle<()> {
        self.store_health.spawn_monitor(
            self.db.clone(),
            self.config.health_check_interval(),
            self.config.timeout(),
        )
    }
}

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use brainbot_core::access::{AccessRole, AccessStore, AuthorizationGate};
use brainbot_core::config::{AppConfig, ConfigError, LoadOptions};
use brainbot_core::domain::{Actor, UserId};
use brainbot_core::errors::StoreError;
use brainbot_db::repositories::{SqlAccessStore, SqlSecretPhrases, SqlSubscriptionStore};
use brainbot_db::{connect, migrations, DbPool};
use brainbot_quotes::QuoteServiceClient;
use brainbot_telegram::middleware::{AuthorizationMiddleware, MiddlewareStack, ModerationGuard};
use brainbot_telegram::notifier::NoopNotifier;
use brainbot_telegram::transport::ReconnectPolicy;
use brainbot_telegram::{BotService, NoopUpdateTransport, Notifier, UpdatePump};

use crate::scheduler::SubscriptionScheduler;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: Arc<BotService>,
    pub pump: UpdatePump,
    pub scheduler: Arc<SubscriptionScheduler>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("quote service client could not be built: {0}")]
    QuotesClient(#[from] brainbot_quotes::ApiError),
    #[error("access store seeding failed: {0}")]
    Seed(#[from] StoreError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!("database connected and migrated");

    let access_store = Arc::new(SqlAccessStore::new(db_pool.clone()));
    let seeded = seed_administrators(access_store.as_ref(), &config.telegram.admin_chat_ids).await?;
    info!(seeded, configured = config.telegram.admin_chat_ids.len(), "administrators seeded");
    let gate = AuthorizationGate::new(access_store);

    let subscriptions = Arc::new(SqlSubscriptionStore::new(db_pool.clone()));
    let secrets = Arc::new(SqlSecretPhrases::new(db_pool.clone()));
    let quotes = Arc::new(QuoteServiceClient::new(
        config.quotes_api.base_url.clone(),
        config.quotes_api.timeout_secs,
    )?);
    let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);

    let scheduler = Arc::new(SubscriptionScheduler::new(notifier.clone(), quotes.clone()));
    let rearmed = scheduler.rearm_all(subscriptions.as_ref()).await?;
    info!(rearmed, "subscription timers re-armed");

    let middleware = MiddlewareStack::new()
        .with_stage(Arc::new(AuthorizationMiddleware::new(gate.clone(), notifier.clone())))
        .with_stage(Arc::new(ModerationGuard::new(gate.clone(), notifier.clone())));

    let service = Arc::new(
        BotService::new(
            gate,
            notifier,
            quotes,
            subscriptions,
            scheduler.clone(),
            secrets,
            config.quotes_api.quote_page_size,
        )
        .with_middleware(middleware),
    );
    let pump = UpdatePump::new(
        Arc::new(NoopUpdateTransport),
        service.clone(),
        ReconnectPolicy::default(),
    );

    Ok(Application { config, db_pool, service, pump, scheduler })
}

/// Configured administrator chats become Administrator records unless one
/// already exists; display metadata captured earlier is never overwritten.
async fn seed_administrators(
    store: &dyn AccessStore,
    chat_ids: &[i64],
) -> Result<usize, StoreError> {
    let mut seeded = 0;
    for &chat_id in chat_ids {
        let id = UserId(chat_id);
        if store.find(AccessRole::Administrator, id).await?.is_none() {
            store.insert(AccessRole::Administrator, Actor::unnamed(id)).await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

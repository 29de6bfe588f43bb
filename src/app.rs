use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::net::TcpListener;

use crate::{
    api,
    cache::{CacheStore, MemoryStore, NullStore, RedisStore},
    config::{CacheBackend, CacheSettings, Settings},
    provider::{ForecastFetcher, VisualCrossing},
    resolver::Resolver,
    scheduler::Scheduler,
    tasks::diag::print_diagnostics_task,
};

const SHUTDOWN_TIMEOUT_S: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

/// Opens the configured store
///
/// An unreachable redis is not fatal, the store keeps failing open and
/// connects once the server comes up.
pub async fn build_cache_store(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match &settings.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new(settings.capacity)),
        CacheBackend::None => Arc::new(NullStore),
        CacheBackend::Redis { url } => {
            let store = RedisStore::new(url, settings.op_timeout)?;
            if let Err(e) = store.check().await {
                tracing::warn!(error = %e, "redis unavailable at startup, will retry on use");
            }
            Arc::new(store)
        }
    };

    Ok(store)
}

pub async fn build_app_state(config: &Settings) -> Result<AppState> {
    let cache = build_cache_store(&config.cache).await?;

    let fetcher: Arc<dyn ForecastFetcher> = Arc::new(VisualCrossing::new(
        &config.upstream.base_url,
        &config.upstream.api_key,
        config.upstream.timeout,
    )?);

    let resolver = Resolver::new(cache, fetcher);
    tracing::info!(cache = resolver.cache_name(), "resolver ready");

    Ok(AppState::new(resolver))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

pub async fn run(config: Settings) -> Result<()> {
    let state = build_app_state(&config).await?;

    let mut scheduler = Scheduler::new();
    scheduler.spawn_task(
        Duration::from_secs(config.diag_interval_s),
        "print_diagnostics",
        state.resolver.diag(),
        print_diagnostics_task,
    );

    let router = api::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("App running on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown(SHUTDOWN_TIMEOUT_S).await;

    Ok(())
}

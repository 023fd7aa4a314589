//! clanpanel: renders a boss-battle status panel on demand and serves it
//! over HTTP.
//!
//! Startup order follows the data flow: prepare assets, take an initial
//! dataset snapshot, stand up the engine thread, composite the initial
//! panel, then serve. `/quit` unwinds it in reverse.

mod bootstrap;
mod config;
mod logging;
mod render_data;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info};

use clanpanel_core::{Aggregator, DatasetCell, DiskStore, Fetch, HttpFetcher};
use clanpanel_render::{EngineConfig, PanelEngine, spawn_engine};

use crate::config::Cli;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let config = Cli::parse().into_config();

    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new());
    let store = Arc::new(DiskStore::new(config.icon_dir.clone()));
    let aggregator = Arc::new(Aggregator::new(
        Arc::clone(&fetcher),
        store,
        config.metadata_base.clone(),
        config.icon_base.clone(),
    ));

    // Asset bootstrap and the initial refresh both block on the network.
    let initial = {
        let config = config.clone();
        let fetcher = Arc::clone(&fetcher);
        let aggregator = Arc::clone(&aggregator);
        tokio::task::spawn_blocking(move || {
            bootstrap::init_assets(&config, fetcher.as_ref());
            aggregator.refresh()
        })
        .await?
    };

    let dataset = Arc::new(DatasetCell::default());
    let ids = routes::slot_ids(initial.region(config.region));
    info!(region = %config.region, ?ids, "initial dataset loaded");
    dataset.publish(initial);

    let engine_config = EngineConfig {
        icon_dir: config.icon_dir.clone(),
        font_path: Some(config.font_path()),
    };
    let (engine, engine_thread) = spawn_engine(move || PanelEngine::new(engine_config))?;

    let slot = engine.submit(move |engine| {
        engine.prepare(&ids);
        Ok(())
    })?;
    slot.await.map_err(|_| "engine exited during startup")??;

    let state = AppState {
        engine,
        dataset,
        aggregator,
        region: config.region,
        refresh_guard: Arc::new(tokio::sync::Mutex::new(())),
        shutdown: Arc::new(Notify::new()),
    };
    let shutdown = Arc::clone(&state.shutdown);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, region = %config.region, "serving clan battle panel");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;

    if engine_thread.join().is_err() {
        error!("engine thread panicked during shutdown");
    }
    info!("shutdown complete");
    Ok(())
}

//! Boss Spawn Monitor: binary entrypoint.
//! Wires config, the spawn store, the pruner, the Discord listener, and the
//! Axum HTTP server into one process.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use boss_spawn_monitor::{
    api, gateway::GatewayClient, metrics::Metrics, pruner, Listener, MonitorConfig, SpawnStore,
};

/// `RUST_LOG` picks the filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boss_spawn_monitor=info,listener=info,pruner=info,gateway=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer().compact()))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MonitorConfig::from_env()?;
    tracing::info!(
        sources = cfg.sources.len(),
        retention_secs = cfg.retention.as_secs(),
        "starting boss spawn monitor"
    );

    // Recorder must exist before the first counter is touched.
    let metrics = if cfg.metrics_enabled {
        Some(Metrics::init()?)
    } else {
        None
    };

    let store = Arc::new(SpawnStore::new(cfg.sources.clone(), cfg.retention));
    pruner::spawn_pruner(store.clone(), cfg.prune_every);

    let listener = Arc::new(Listener::new(store.clone()));
    let gateway = GatewayClient::new(cfg.token.clone());
    tokio::spawn(async move {
        if let Err(e) = gateway.run(listener).await {
            tracing::error!(error = %format!("{e:#}"), "gateway listener stopped");
        }
    });

    let mut app = api::router(api::AppState::new(store));
    if let Some(m) = &metrics {
        app = app.merge(m.router());
    }

    let addr = cfg.listen_addr();
    let tcp = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {addr}"))?;
    tracing::info!(%addr, "API listening");

    axum::serve(tcp, app).await.context("HTTP server failed")?;
    Ok(())
}

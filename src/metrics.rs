use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call at most once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "listener_messages_total",
            "Messages seen from monitored channels."
        );
        describe_counter!(
            "listener_spawns_recorded_total",
            "Spawns extracted and stored, per source."
        );
        describe_counter!(
            "listener_messages_skipped_total",
            "Messages dropped before storage, by reason."
        );
        describe_counter!(
            "store_evicted_total",
            "Records removed by the pruner, per source."
        );
        describe_gauge!(
            "store_active_records",
            "Records currently held, per source."
        );
    });
}

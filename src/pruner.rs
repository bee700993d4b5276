// src/pruner.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::store::{PruneReport, SpawnStore};

/// Run one eviction pass and publish its telemetry.
pub fn prune_once(store: &SpawnStore) -> PruneReport {
    crate::metrics::ensure_described();

    let report = store.prune();
    for (key, removed) in &report.removed {
        if *removed > 0 {
            let name = store.source(key).map_or(key.as_str(), |s| s.name.as_str());
            tracing::info!(target: "pruner", source = %name, removed, "evicted expired spawns");
            counter!("store_evicted_total", "source" => key.clone()).increment(*removed as u64);
        }
    }
    for st in store.statuses() {
        gauge!("store_active_records", "source" => st.key).set(st.active_spawns as f64);
    }
    report
}

/// Spawn the background eviction loop.
///
/// The first pass runs one `every` after start. The loop never exits on its own;
/// abort the handle (or end the runtime) to stop it.
pub fn spawn_pruner(store: Arc<SpawnStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            target: "pruner",
            every_secs = every.as_secs(),
            retention_secs = store.retention_secs(),
            "pruner started"
        );

        loop {
            ticker.tick().await;
            let report = prune_once(&store);
            tracing::trace!(target: "pruner", removed = report.total_removed(), "prune tick");
        }
    })
}

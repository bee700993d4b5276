// tests/metrics.rs
//
// Telemetry emitted by the listener and pruner, captured with a local
// Prometheus recorder (no global install, no HTTP listener).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusBuilder;

use boss_spawn_monitor::clock::ManualClock;
use boss_spawn_monitor::gateway::{Embed, EmbedField, InboundMessage};
use boss_spawn_monitor::pruner::prune_once;
use boss_spawn_monitor::{Listener, SourceDef, SpawnStore};

fn spawn_message(channel_id: u64) -> InboundMessage {
    InboundMessage {
        channel_id,
        embeds: vec![Embed {
            title: None,
            fields: vec![
                EmbedField {
                    name: "Job ID".into(),
                    value: "job".into(),
                },
                EmbedField {
                    name: "Server Information".into(),
                    value: "Players: 4/12".into(),
                },
            ],
        }],
    }
}

#[test]
fn listener_and_pruner_series_are_exported() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(SpawnStore::with_clock(
        vec![SourceDef::new("darkbeard", 7, "Dark Beard")],
        Duration::from_secs(200),
        clock.clone(),
    ));
    let listener = Listener::new(store.clone());

    metrics::with_local_recorder(&recorder, || {
        listener.handle(&spawn_message(7)).expect("recorded");
        assert!(listener.handle(&spawn_message(8)).is_err());
        clock.advance_secs(250);
        prune_once(&store);
    });

    let text = handle.render();
    for needle in [
        "listener_messages_total",
        "listener_spawns_recorded_total",
        "listener_messages_skipped_total",
        "store_evicted_total",
        "store_active_records",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
    assert!(text.contains(r#"source="darkbeard""#), "{text}");
    assert!(text.contains(r#"reason="unrouted""#), "{text}");
}

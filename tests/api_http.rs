// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /
// - GET /health
// - GET /api/{source} (known + unknown)
// - GET /api/all (merge + age ordering)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use boss_spawn_monitor::api::{self, AppState};
use boss_spawn_monitor::clock::ManualClock;
use boss_spawn_monitor::config::sources::default_sources;
use boss_spawn_monitor::model::Spawn;
use boss_spawn_monitor::SpawnStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn fixture() -> (Router, Arc<SpawnStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(SpawnStore::with_clock(
        default_sources(),
        Duration::from_secs(200),
        clock.clone(),
    ));
    let app = api::router(AppState::new(store.clone()));
    (app, store, clock)
}

fn spawn(job: &str, players: &str) -> Spawn {
    Spawn {
        job_id: job.into(),
        players: players.into(),
        server_info: format!("Players: {players}"),
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

#[tokio::test]
async fn root_lists_endpoints_with_live_counts() {
    let (app, store, _) = fixture();
    store.insert("doughking", spawn("j1", "3/12"));

    let (status, v) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "running");
    assert_eq!(v["message"], "Blox Fruits Boss Monitor API");
    assert_eq!(v["total_messages"], 1);
    assert_eq!(v["endpoints"]["/api/doughking"], "Dough King spawns (1 active)");
    assert_eq!(v["endpoints"]["/api/rip_indra"], "Rip Indra spawns (0 active)");
    assert_eq!(v["endpoints"]["/api/all"], "All boss spawns");
}

#[tokio::test]
async fn health_reports_every_channel() {
    let (app, store, _) = fixture();
    store.insert("soulreaper", spawn("a", "1/12"));
    store.insert("soulreaper", spawn("b", "2/12"));

    let (status, v) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["total_messages"], 2);
    let channels = v["channels"].as_object().expect("channels object");
    assert_eq!(channels.len(), 4);
    assert_eq!(v["channels"]["soulreaper"]["name"], "Soul Reaper");
    assert_eq!(v["channels"]["soulreaper"]["active_spawns"], 2);
    assert_eq!(v["channels"]["darkbeard"]["active_spawns"], 0);
}

#[tokio::test]
async fn source_listing_has_contract_fields_and_newest_first() {
    let (app, store, clock) = fixture();
    store.insert("rip_indra", spawn("older", "10/12"));
    clock.advance_secs(30);
    store.insert("rip_indra", spawn("newer", "12/12"));
    clock.advance_secs(2);

    let (status, v) = get_json(&app, "/api/rip_indra").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 2);
    assert_eq!(v["count"], 2);

    let data = v["data"].as_array().expect("data array");
    assert_eq!(data[0]["jobid"], "newer");
    assert_eq!(data[0]["Players"], "12/12");
    assert_eq!(data[0]["name"], "Rip Indra");
    assert_eq!(data[0]["age"], 2);
    assert_eq!(data[1]["jobid"], "older");
    assert_eq!(data[1]["age"], 32);
}

#[tokio::test]
async fn unknown_source_is_404() {
    let (app, _, _) = fixture();
    let (status, v) = get_json(&app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "unknown source");
    assert_eq!(v["source"], "nope");
}

#[tokio::test]
async fn all_merges_sources_sorted_by_age() {
    let (app, store, clock) = fixture();
    store.insert("darkbeard", spawn("d-90", "1/12"));
    clock.advance_secs(40);
    store.insert("rip_indra", spawn("r-50", "2/12"));
    clock.advance_secs(45);
    store.insert("darkbeard", spawn("d-5", "3/12"));
    clock.advance_secs(5);

    let (status, v) = get_json(&app, "/api/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 3);
    assert_eq!(v["count"], 3);

    let data = v["data"].as_array().unwrap();
    let ids: Vec<_> = data.iter().map(|d| d["jobid"].as_str().unwrap()).collect();
    assert_eq!(ids, ["d-5", "r-50", "d-90"]);
    let ages: Vec<_> = data.iter().map(|d| d["age"].as_u64().unwrap()).collect();
    assert_eq!(ages, [5, 50, 90]);

    // union of per-source listings
    let mut per_source = 0;
    for key in ["rip_indra", "doughking", "darkbeard", "soulreaper"] {
        let (_, s) = get_json(&app, &format!("/api/{key}")).await;
        per_source += s["count"].as_u64().unwrap();
    }
    assert_eq!(per_source, 3);
}

#[tokio::test]
async fn pruned_records_disappear_but_total_stays() {
    let (app, store, clock) = fixture();
    store.insert("doughking", spawn("gone", "1/12"));
    clock.advance_secs(201);
    store.prune();

    let (_, v) = get_json(&app, "/api/doughking").await;
    assert_eq!(v["count"], 0);
    assert_eq!(v["total"], 1);

    let (_, h) = get_json(&app, "/health").await;
    assert_eq!(h["total_messages"], 1);
    assert_eq!(h["channels"]["doughking"]["active_spawns"], 0);
}

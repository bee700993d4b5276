//! Records kept by the store and the JSON views served by the API.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sentinel occupancy used whenever the player count can't be read.
pub const UNKNOWN_PLAYERS: &str = "Unknown";

/// Fields pulled out of one notification embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawn {
    pub job_id: String,
    /// e.g. "12/12" or [`UNKNOWN_PLAYERS`].
    pub players: String,
    /// Raw "Server Information" text, kept for debugging.
    pub server_info: String,
}

/// A spawn as stored: extracted fields + origin + ingestion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub job_id: String,
    pub players: String,
    pub server_info: String,
    pub source_name: String,
    pub received_at: DateTime<Utc>,
}

impl Record {
    /// Whole seconds since insertion (floored, never negative).
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.received_at).num_seconds().max(0) as u64
    }

    pub fn view(&self, now: DateTime<Utc>) -> SpawnView {
        SpawnView {
            players: self.players.clone(),
            jobid: self.job_id.clone(),
            name: self.source_name.clone(),
            age: self.age_secs(now),
        }
    }
}

/// One row of `/api/...` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnView {
    #[serde(rename = "Players")]
    pub players: String,
    pub jobid: String,
    pub name: String,
    pub age: u64,
}

/// Body of `/api/{source}` and `/api/all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Global ingest counter (never decremented).
    pub total: u64,
    pub count: usize,
    pub data: Vec<SpawnView>,
}

impl Listing {
    pub fn new(total: u64, data: Vec<SpawnView>) -> Self {
        Self {
            total,
            count: data.len(),
            data,
        }
    }
}

/// Per-source line of `/health` and `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    #[serde(skip)]
    pub key: String,
    pub name: String,
    pub active_spawns: usize,
}

//! # Spawn Store
//! Time-windowed, per-source list of recent spawns.
//!
//! Each configured source owns a `VecDeque<Record>` with the newest record at
//! the front. The listener pushes to the front, the pruner drops everything
//! older than the retention horizon, and API handlers copy values out.
//! A single mutex guards all lists plus the global ingest counter, so every
//! read sees one consistent snapshot.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::clock::{Clock, SystemClock};
use crate::config::SourceDef;
use crate::model::{Listing, Record, SourceStatus, Spawn, SpawnView};

/// Thread-safe store shared by the listener, the pruner, and the API.
pub struct SpawnStore {
    inner: Mutex<Inner>,
    sources: Vec<SourceDef>,
    retention: chrono::Duration,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct Inner {
    lists: HashMap<String, VecDeque<Record>>,
    /// Spawns ever ingested. Pruning never lowers it.
    total: u64,
}

/// What one prune pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// `(source key, removed)` for every source, in config order.
    pub removed: Vec<(String, usize)>,
}

impl PruneReport {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }
}

impl SpawnStore {
    /// Store on the wall clock.
    pub fn new(sources: Vec<SourceDef>, retention: Duration) -> Self {
        Self::with_clock(sources, retention, Arc::new(SystemClock))
    }

    pub fn with_clock(sources: Vec<SourceDef>, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        let lists = sources
            .iter()
            .map(|s| (s.key.clone(), VecDeque::new()))
            .collect();
        Self {
            inner: Mutex::new(Inner { lists, total: 0 }),
            sources,
            retention: chrono::Duration::from_std(retention)
                .unwrap_or_else(|_| chrono::Duration::seconds(i64::MAX / 1000)),
            clock,
        }
    }

    pub fn sources(&self) -> &[SourceDef] {
        &self.sources
    }

    pub fn source(&self, key: &str) -> Option<&SourceDef> {
        self.sources.iter().find(|s| s.key == key)
    }

    pub fn retention_secs(&self) -> u64 {
        self.retention.num_seconds().max(0) as u64
    }

    /// Record a spawn at the head of `source_key`'s list.
    ///
    /// Returns the new global total, or `None` if the key isn't configured.
    pub fn insert(&self, source_key: &str, spawn: Spawn) -> Option<u64> {
        let source = self.source(source_key)?;
        let record = Record {
            job_id: spawn.job_id,
            players: spawn.players,
            server_info: spawn.server_info,
            source_name: source.name.clone(),
            received_at: self.clock.now(),
        };

        let mut inner = self.inner.lock().expect("spawn store mutex poisoned");
        inner.lists.get_mut(source_key)?.push_front(record);
        inner.total += 1;
        Some(inner.total)
    }

    /// Drop every record whose age has reached the retention horizon.
    ///
    /// Relative order of survivors is preserved; the global total is untouched.
    pub fn prune(&self) -> PruneReport {
        let now = self.clock.now();
        let retention = self.retention;

        let mut inner = self.inner.lock().expect("spawn store mutex poisoned");
        let removed = self
            .sources
            .iter()
            .map(|s| {
                let n = inner.lists.get_mut(&s.key).map_or(0, |list| {
                    let before = list.len();
                    list.retain(|r| now - r.received_at < retention);
                    before - list.len()
                });
                (s.key.clone(), n)
            })
            .collect();
        PruneReport { removed }
    }

    /// Current records of one source, newest insertion first.
    pub fn listing(&self, source_key: &str) -> Option<Listing> {
        let now = self.clock.now();
        let inner = self.inner.lock().expect("spawn store mutex poisoned");
        let list = inner.lists.get(source_key)?;
        let data = list.iter().map(|r| r.view(now)).collect();
        Some(Listing::new(inner.total, data))
    }

    /// Records of all sources merged and ordered by ascending age.
    ///
    /// Sources are concatenated in config order first; the sort is stable, so
    /// equal ages keep that order.
    pub fn all_listing(&self) -> Listing {
        let now = self.clock.now();
        let inner = self.inner.lock().expect("spawn store mutex poisoned");
        let mut data: Vec<SpawnView> = self
            .sources
            .iter()
            .filter_map(|s| inner.lists.get(&s.key))
            .flat_map(|list| list.iter().map(|r| r.view(now)))
            .collect();
        data.sort_by_key(|v| v.age);
        Listing::new(inner.total, data)
    }

    /// Name and live record count per source, in config order.
    pub fn statuses(&self) -> Vec<SourceStatus> {
        self.summary().1
    }

    /// Global total plus per-source statuses from one snapshot.
    pub fn summary(&self) -> (u64, Vec<SourceStatus>) {
        let inner = self.inner.lock().expect("spawn store mutex poisoned");
        let statuses = self
            .sources
            .iter()
            .map(|s| SourceStatus {
                key: s.key.clone(),
                name: s.name.clone(),
                active_spawns: inner.lists.get(&s.key).map_or(0, VecDeque::len),
            })
            .collect();
        (inner.total, statuses)
    }

    pub fn total(&self) -> u64 {
        self.inner.lock().expect("spawn store mutex poisoned").total
    }

    pub fn active_count(&self, source_key: &str) -> Option<usize> {
        let inner = self.inner.lock().expect("spawn store mutex poisoned");
        inner.lists.get(source_key).map(VecDeque::len)
    }
}

impl std::fmt::Debug for SpawnStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnStore")
            .field("sources", &self.sources)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

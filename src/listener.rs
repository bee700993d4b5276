// src/listener.rs
//! Ingest side: turns inbound channel messages into stored spawns.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;

use crate::config::SourceDef;
use crate::extract::extract_spawn;
use crate::gateway::{InboundMessage, MessageHandler};
use crate::store::SpawnStore;

/// Why a message produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Channel isn't one of the configured sources.
    Unrouted,
    NoEmbed,
    /// First embed lacks a job id or server info.
    MissingFields,
}

impl Skip {
    pub fn as_str(self) -> &'static str {
        match self {
            Skip::Unrouted => "unrouted",
            Skip::NoEmbed => "no_embed",
            Skip::MissingFields => "missing_fields",
        }
    }
}

pub struct Listener {
    store: Arc<SpawnStore>,
    /// channel id -> source key
    routes: HashMap<u64, String>,
}

impl Listener {
    pub fn new(store: Arc<SpawnStore>) -> Self {
        let routes = store
            .sources()
            .iter()
            .map(|s| (s.channel_id, s.key.clone()))
            .collect();
        Self { store, routes }
    }

    pub fn route(&self, channel_id: u64) -> Option<&SourceDef> {
        self.routes
            .get(&channel_id)
            .and_then(|key| self.store.source(key))
    }

    /// Extract and store one message. Returns the new global total on success.
    ///
    /// Every skip is counted under `listener_messages_skipped_total{reason}`.
    pub fn handle(&self, msg: &InboundMessage) -> Result<u64, Skip> {
        let res = self.ingest(msg);
        if let Err(skip) = res {
            counter!("listener_messages_skipped_total", "reason" => skip.as_str()).increment(1);
            if skip == Skip::Unrouted {
                tracing::trace!(target: "listener", channel_id = msg.channel_id, "unmonitored channel");
            } else {
                tracing::debug!(
                    target: "listener",
                    channel_id = msg.channel_id,
                    reason = skip.as_str(),
                    "message skipped"
                );
            }
        }
        res
    }

    fn ingest(&self, msg: &InboundMessage) -> Result<u64, Skip> {
        let source = self.route(msg.channel_id).ok_or(Skip::Unrouted)?;
        counter!("listener_messages_total").increment(1);

        let embed = msg.embeds.first().ok_or(Skip::NoEmbed)?;
        let spawn = extract_spawn(embed).ok_or(Skip::MissingFields)?;
        let (job_id, players) = (spawn.job_id.clone(), spawn.players.clone());

        let total = self
            .store
            .insert(&source.key, spawn)
            .ok_or(Skip::Unrouted)?;

        counter!("listener_spawns_recorded_total", "source" => source.key.clone()).increment(1);
        tracing::info!(
            target: "listener",
            source = %source.name,
            job_id = %job_id,
            players = %players,
            total,
            "spawn recorded"
        );
        Ok(total)
    }
}

#[async_trait::async_trait]
impl MessageHandler for Listener {
    async fn on_ready(&self, user: &str) {
        tracing::info!(target: "listener", user, "logged in to gateway");
        for s in self.store.sources() {
            tracing::info!(
                target: "listener",
                source = %s.name,
                channel_id = s.channel_id,
                "monitoring channel"
            );
        }
    }

    async fn on_message(&self, msg: InboundMessage) {
        let _ = self.handle(&msg);
    }
}

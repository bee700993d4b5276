// src/gateway/mod.rs
//! Minimal Discord gateway client.
//!
//! Connects, identifies, keeps the heartbeat going, and hands `READY` /
//! `MESSAGE_CREATE` dispatches to a [`MessageHandler`]. There is no RESUME:
//! any dropped session reconnects and identifies from scratch.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::time::{self, Instant};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

pub use types::{Embed, EmbedField, GatewayEvent, InboundMessage};

pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Receives decoded events from the gateway.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_ready(&self, _user: &str) {}
    async fn on_message(&self, msg: InboundMessage);
}

/// Close codes after which reconnecting cannot help (bad token, shard or intents).
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010..=4014)
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Reconnect(&'static str),
    Fatal(u16, String),
}

pub struct GatewayClient {
    token: String,
    url: String,
    intents: u64,
    reconnect_delay: Duration,
}

impl GatewayClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url: GATEWAY_URL.to_string(),
            intents: types::DEFAULT_INTENTS,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_intents(mut self, intents: u64) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Keep a session alive forever. Returns only on a fatal close code.
    pub async fn run<H>(&self, handler: Arc<H>) -> Result<()>
    where
        H: MessageHandler + ?Sized,
    {
        loop {
            match self.session(handler.as_ref()).await {
                Ok(SessionEnd::Reconnect(why)) => {
                    tracing::info!(target: "gateway", reason = why, "session ended, reconnecting");
                }
                Ok(SessionEnd::Fatal(code, reason)) => {
                    bail!("gateway closed the session with code {code}: {reason}");
                }
                Err(e) => {
                    tracing::warn!(target: "gateway", error = %format!("{e:#}"), "session failed");
                }
            }
            time::sleep(self.reconnect_delay).await;
        }
    }

    async fn session<H>(&self, handler: &H) -> Result<SessionEnd>
    where
        H: MessageHandler + ?Sized,
    {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("connecting to {}", self.url))?;
        let (mut sink, mut stream) = ws.split();

        // Hello comes first and tells us the heartbeat period.
        let period = loop {
            let msg = stream
                .next()
                .await
                .ok_or_else(|| anyhow!("gateway closed before HELLO"))??;
            if let Message::Text(text) = msg {
                if let GatewayEvent::Hello {
                    heartbeat_interval_ms,
                } = types::decode(&text)?.event
                {
                    break Duration::from_millis(heartbeat_interval_ms.max(1));
                }
            }
        };

        sink.send(Message::Text(types::identify_payload(&self.token, self.intents)))
            .await
            .context("sending IDENTIFY")?;
        tracing::debug!(target: "gateway", heartbeat_ms = period.as_millis() as u64, "identified");

        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        let mut seq: Option<u64> = None;
        let mut acked = true;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !acked {
                        return Ok(SessionEnd::Reconnect("heartbeat not acknowledged"));
                    }
                    acked = false;
                    sink.send(Message::Text(types::heartbeat_payload(seq)))
                        .await
                        .context("sending heartbeat")?;
                }
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        return Ok(SessionEnd::Reconnect("stream ended"));
                    };
                    match msg.context("reading gateway frame")? {
                        Message::Text(text) => {
                            let frame = match types::decode(&text) {
                                Ok(f) => f,
                                Err(e) => {
                                    tracing::debug!(target: "gateway", error = %format!("{e:#}"), "undecodable frame");
                                    continue;
                                }
                            };
                            if frame.seq.is_some() {
                                seq = frame.seq;
                            }
                            match frame.event {
                                GatewayEvent::MessageCreate(m) => handler.on_message(m).await,
                                GatewayEvent::Ready { user } => handler.on_ready(&user).await,
                                GatewayEvent::HeartbeatAck => acked = true,
                                GatewayEvent::Heartbeat => {
                                    sink.send(Message::Text(types::heartbeat_payload(seq)))
                                        .await
                                        .context("sending requested heartbeat")?;
                                }
                                GatewayEvent::Reconnect => {
                                    return Ok(SessionEnd::Reconnect("server requested reconnect"));
                                }
                                GatewayEvent::InvalidSession => {
                                    return Ok(SessionEnd::Reconnect("invalid session"));
                                }
                                GatewayEvent::Hello { .. }
                                | GatewayEvent::Dispatch(_)
                                | GatewayEvent::Unknown(_) => {}
                            }
                        }
                        Message::Close(frame) => {
                            return Ok(match frame {
                                Some(f) if is_fatal_close(u16::from(f.code)) => {
                                    SessionEnd::Fatal(u16::from(f.code), f.reason.to_string())
                                }
                                _ => SessionEnd::Reconnect("closed by server"),
                            });
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

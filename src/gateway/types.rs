// src/gateway/types.rs
//! Discord gateway v10 wire types (JSON encoding), trimmed to what the monitor reads.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

/// Intents needed to see embeds posted in guild channels.
pub const DEFAULT_INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

/// A chat message as delivered by `MESSAGE_CREATE`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InboundMessage {
    #[serde(deserialize_with = "snowflake")]
    pub channel_id: u64,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Embed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Decoded gateway frame: optional sequence number + typed event.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub seq: Option<u64>,
    pub event: GatewayEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Hello { heartbeat_interval_ms: u64 },
    Ready { user: String },
    MessageCreate(InboundMessage),
    /// Any other dispatch, by event name.
    Dispatch(String),
    /// Server asks for an immediate heartbeat.
    Heartbeat,
    HeartbeatAck,
    Reconnect,
    InvalidSession,
    Unknown(u8),
}

#[derive(Deserialize)]
struct RawFrame {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Deserialize)]
struct HelloData {
    heartbeat_interval: u64,
}

#[derive(Deserialize)]
struct ReadyData {
    user: ReadyUser,
}

#[derive(Deserialize)]
struct ReadyUser {
    username: String,
}

/// Parse one text frame from the gateway.
pub fn decode(text: &str) -> Result<Frame> {
    let raw: RawFrame = serde_json::from_str(text).context("gateway frame is not valid JSON")?;
    let event = match raw.op {
        OP_DISPATCH => {
            let name = raw.t.unwrap_or_default();
            match name.as_str() {
                "MESSAGE_CREATE" => GatewayEvent::MessageCreate(
                    serde_json::from_value(raw.d).context("decoding MESSAGE_CREATE")?,
                ),
                "READY" => {
                    let ready: ReadyData =
                        serde_json::from_value(raw.d).context("decoding READY")?;
                    GatewayEvent::Ready {
                        user: ready.user.username,
                    }
                }
                _ => GatewayEvent::Dispatch(name),
            }
        }
        OP_HELLO => {
            let hello: HelloData = serde_json::from_value(raw.d).context("decoding HELLO")?;
            GatewayEvent::Hello {
                heartbeat_interval_ms: hello.heartbeat_interval,
            }
        }
        OP_HEARTBEAT => GatewayEvent::Heartbeat,
        OP_HEARTBEAT_ACK => GatewayEvent::HeartbeatAck,
        OP_RECONNECT => GatewayEvent::Reconnect,
        OP_INVALID_SESSION => GatewayEvent::InvalidSession,
        other => GatewayEvent::Unknown(other),
    };
    Ok(Frame { seq: raw.s, event })
}

/// Op 2 IDENTIFY frame.
pub fn identify_payload(token: &str, intents: u64) -> String {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": env!("CARGO_PKG_NAME"),
                "device": env!("CARGO_PKG_NAME"),
            }
        }
    })
    .to_string()
}

/// Op 1 HEARTBEAT frame carrying the last seen sequence number (or null).
pub fn heartbeat_payload(seq: Option<u64>) -> String {
    json!({ "op": OP_HEARTBEAT, "d": seq }).to_string()
}

/// Snowflake ids come as JSON strings from Discord; config files may use integers.
pub fn snowflake<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(d)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

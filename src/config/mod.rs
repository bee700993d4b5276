// src/config/mod.rs
//! Process configuration, read once at startup from the environment.

pub mod sources;

use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

pub use sources::SourceDef;

pub const ENV_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_RETENTION_SECS: &str = "RETENTION_SECS";
pub const ENV_PRUNE_INTERVAL_SECS: &str = "PRUNE_INTERVAL_SECS";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_RETENTION_SECS: u64 = 200;
pub const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 10;

#[derive(Clone)]
pub struct MonitorConfig {
    /// Gateway bot token. Never logged.
    pub token: String,
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Records at least this old are evicted.
    pub retention: Duration,
    pub prune_every: Duration,
    pub metrics_enabled: bool,
    pub sources: Vec<SourceDef>,
}

impl std::fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("token", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("retention", &self.retention)
            .field("prune_every", &self.prune_every)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("sources", &self.sources)
            .finish()
    }
}

impl MonitorConfig {
    /// Build the config from env vars. Fails if the token is missing or blank.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(ENV_TOKEN).unwrap_or_default();
        let token = token.trim();
        if token.is_empty() {
            bail!("{ENV_TOKEN} must be set in the environment");
        }

        let retention_secs = env_parse(ENV_RETENTION_SECS, DEFAULT_RETENTION_SECS)?;
        let prune_secs = env_parse(ENV_PRUNE_INTERVAL_SECS, DEFAULT_PRUNE_INTERVAL_SECS)?;
        if retention_secs == 0 || prune_secs == 0 {
            bail!("{ENV_RETENTION_SECS} and {ENV_PRUNE_INTERVAL_SECS} must be positive");
        }

        Ok(Self {
            token: token.to_string(),
            bind_addr: env_parse(ENV_BIND_ADDR, IpAddr::from([0, 0, 0, 0]))?,
            port: env_parse(ENV_PORT, DEFAULT_PORT)?,
            retention: Duration::from_secs(retention_secs),
            prune_every: Duration::from_secs(prune_secs),
            metrics_enabled: env_flag(ENV_METRICS_ENABLED)?,
            sources: sources::load_sources_default().context("loading source table")?,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Parse an optional env var; unset or blank means `default`, garbage is an error.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {v:?}")),
        _ => Ok(default),
    }
}

/// Boolean env var: 1/true/yes/on or 0/false/no/off (any case); unset or blank is false.
fn env_flag(name: &str) -> Result<bool> {
    let raw = std::env::var(name).unwrap_or_default();
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => bail!("invalid value for {name}: {raw:?} (expected true/false)"),
    }
}

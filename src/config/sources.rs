// src/config/sources.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SOURCES_PATH: &str = "MONITOR_SOURCES_PATH";

/// Route segment taken by `/api/all`, so no source may use it.
pub const RESERVED_KEY: &str = "all";

/// One monitored channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDef {
    /// URL-safe key, e.g. `rip_indra` -> `/api/rip_indra`.
    pub key: String,
    /// Discord channel snowflake.
    #[serde(deserialize_with = "crate::gateway::types::snowflake")]
    pub channel_id: u64,
    /// Display name attached to every record, e.g. "Rip Indra".
    pub name: String,
}

impl SourceDef {
    pub fn new(key: &str, channel_id: u64, name: &str) -> Self {
        Self {
            key: key.to_string(),
            channel_id,
            name: name.to_string(),
        }
    }
}

/// Built-in channel table used when no sources file is configured.
pub fn default_sources() -> Vec<SourceDef> {
    vec![
        SourceDef::new("rip_indra", 1451756589810974882, "Rip Indra"),
        SourceDef::new("doughking", 1451756588237979658, "Dough King"),
        SourceDef::new("darkbeard", 1451756602196758650, "Dark Beard"),
        SourceDef::new("soulreaper", 1451756593346777128, "Soul Reaper"),
    ]
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceDef>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sources = parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources from {}", path.display()))?;
    validate(&sources)?;
    Ok(sources)
}

/// Load sources using env var + fallbacks:
/// 1) $MONITOR_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in defaults
pub fn load_sources_default() -> Result<Vec<SourceDef>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDef>> {
    match hint_ext {
        "toml" => parse_toml(s),
        "json" => parse_json(s),
        _ => parse_json(s).or_else(|_| parse_toml(s)),
    }
}

fn parse_toml(s: &str) -> Result<Vec<SourceDef>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<SourceDef>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceDef>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum JsonSources {
        List(Vec<SourceDef>),
        Wrapped { sources: Vec<SourceDef> },
    }
    let v: JsonSources = serde_json::from_str(s)?;
    Ok(match v {
        JsonSources::List(v) | JsonSources::Wrapped { sources: v } => v,
    })
}

/// Keys must be usable as route segments and unique; channels must map to one source.
pub fn validate(sources: &[SourceDef]) -> Result<()> {
    if sources.is_empty() {
        bail!("no sources configured");
    }
    let mut keys = HashSet::new();
    let mut channels = HashSet::new();
    for s in sources {
        let key = s.key.trim();
        if key.is_empty() || key != s.key {
            bail!("source key {:?} must be non-empty and untrimmed", s.key);
        }
        if key.contains('/') {
            bail!("source key {key:?} must not contain '/'");
        }
        if key.eq_ignore_ascii_case(RESERVED_KEY) {
            bail!("source key {key:?} is reserved");
        }
        if s.name.trim().is_empty() {
            bail!("source {key:?} has an empty name");
        }
        if !keys.insert(key) {
            bail!("duplicate source key {key:?}");
        }
        if !channels.insert(s.channel_id) {
            bail!("channel {} is mapped to more than one source", s.channel_id);
        }
    }
    Ok(())
}

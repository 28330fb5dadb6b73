// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Root configuration. Loaded once at startup and never reloaded.
///
/// Unknown top-level keys are ignored; every section defaults so that an
/// empty file is a valid (if useless) configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: Vec<String>,
    pub outputs: Vec<SinkDescriptor>,
    pub redis: RedisConfig,
}

/// One configured output: a kind tag plus a flat string map of options.
/// The sink factory decodes the map into a typed options struct per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkDescriptor {
    pub kind: String,
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
}

/// Load configuration from a YAML file.
pub fn load(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    // An empty or comment-only file parses as YAML null, hence the Option.
    let parsed: Option<Config> = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing config from {}", path.display()))?;
    Ok(parsed.unwrap_or_default())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration types for the engine and its modules
//!
//! Field names follow the external config surface (kebab-case). Scalar
//! leniency matters here: users write `delay = 30` and `delay = "30s"`
//! interchangeably, and a `start-at` that is not a string is ignored with
//! a warning rather than failing the whole config.

use crate::duration::dehumanize;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors reading or decoding a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub execution: Vec<ExecutionConfig>,
    pub monitoring: MonitoringConfig,
    pub criteria: Vec<CriteriaConfig>,
    pub engine: EngineSettings,
}

/// Load a config file from disk
pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Engine run-loop settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
    #[serde(deserialize_with = "de_opt_interval")]
    pub check_interval: Option<Duration>,
}

/// Per-executor execution block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExecutionConfig {
    #[serde(deserialize_with = "de_start_at")]
    pub start_at: Option<String>,
    pub time_format: Option<String>,
    #[serde(deserialize_with = "de_opt_scalar_string")]
    pub delay: Option<String>,
}

/// Monitoring section: protocol-type key -> client blocks
///
/// Keys are kept open-ended here; the monitoring orchestrator resolves
/// them against its constructor registry and skips unknown ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitoringConfig {
    #[serde(flatten)]
    pub clients: BTreeMap<String, Vec<ClientConfig>>,
}

/// One monitoring client block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientConfig {
    pub address: Option<String>,
    pub label: Option<String>,
    pub metrics: Vec<String>,
    #[serde(deserialize_with = "de_opt_interval")]
    pub interval: Option<Duration>,
}

/// One alerting criteria block
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CriteriaConfig {
    /// `"<source>/<metric>"` key to watch
    pub subject: String,
    pub threshold: f64,
    #[serde(default = "default_condition")]
    pub condition: String,
}

fn default_condition() -> String {
    ">".to_string()
}

/// A TOML scalar in any of the shapes users actually write
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

fn de_start_at<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(s)) => Ok(Some(s)),
        Some(other) => {
            tracing::warn!(value = ?other, "start-at must be a string, ignored");
            Ok(None)
        }
    }
}

fn de_opt_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(s)) => Ok(Some(s)),
        Some(Scalar::Int(n)) => Ok(Some(n.to_string())),
        Some(Scalar::Float(n)) => Ok(Some(n.to_string())),
        Some(Scalar::Bool(b)) => Err(D::Error::custom(format!(
            "expected a duration, found boolean '{}'",
            b
        ))),
    }
}

fn de_opt_interval<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = match Option::<Scalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(s) => s,
    };
    let text = match scalar {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => {
            return Err(D::Error::custom(format!(
                "expected an interval, found boolean '{}'",
                b
            )))
        }
    };
    dehumanize(&text).map(Some).map_err(D::Error::custom)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::fs;

use crate::table::TableVariant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Prefix every API path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String { common::DEFAULT_BASE_URL.to_string() }
fn default_timeout_ms() -> u64 { 10_000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Credentials for `/api/login`. Without them no login is attempted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn credentials(&self) -> Option<common::LoginRequest> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(common::LoginRequest {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub output: Option<PathBuf>,
}

fn default_log_level() -> String { "warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_view")]
    pub view: TableVariant,
}

fn default_view() -> TableVariant { TableVariant::List }

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { view: default_view() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Detect file type by extension and load
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "toml" => Self::from_toml_file(path),
            _ => Err(anyhow::anyhow!("Unsupported config file format. Use .yaml, .yml, or .toml")),
        }
    }

    /// Loads `explicit` if given. Otherwise the system file and then the user
    /// file are layered over the built-in defaults, each if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let existing: Vec<PathBuf> = default_locations()
            .into_iter()
            .filter(|candidate| candidate.exists())
            .collect();
        Self::layered(&existing)
    }

    /// Layers `paths` in order. A later file only overrides the keys it
    /// actually sets; everything else keeps the earlier value or the default.
    pub fn layered(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = Value::Null;
        for path in paths {
            log::debug!("using config file {:?}", path);
            merge(&mut merged, read_layer(path)?);
        }
        if merged.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(merged).context("Failed to parse layered config")
    }
}

/// Reads a config file as an untyped tree. TOML is converted to the same tree.
fn read_layer(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path)),
        "toml" => {
            let table: toml::Value = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(serde_yaml::to_value(table)?)
        }
        _ => Err(anyhow::anyhow!("Unsupported config file format. Use .yaml, .yml, or .toml")),
    }
}

/// Merges `overlay` into `base`, preferring values from overlay. Mappings
/// merge key by key; an absent or null overlay value keeps the base.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(common::DEFAULT_CONFIG_PATH)];
    if let Ok(home) = std::env::var("HOME") {
        let user = common::USER_CONFIG_PATH.trim_start_matches("~/");
        paths.push(Path::new(&home).join(user));
    }
    paths
}

//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".maya"))
            .unwrap_or_else(|| PathBuf::from(".maya"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Path of the JSON configuration file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Path of the optional TOML secrets file holding `[google_credentials]`
    pub fn secrets_path(&self) -> PathBuf {
        self.config_dir.join("secrets.toml")
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`; objects merge key by key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Interpret an env value: JSON literals (numbers, booleans, objects) as-is,
/// everything else as a plain string
fn parse_env_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Build the nested object `{"a": {"b": value}}` for `path = ["a", "b"]`
fn nest(path: &[&str], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert((*segment).to_string(), inner);
        Value::Object(map)
    })
}

fn apply_alias_overrides(config: &mut Value) {
    const ALIASES: [(&str, &[&str]); 4] = [
        ("GOOGLE_CLOUD_PROJECT", &["dialogflow", "project_id"]),
        ("DIALOGFLOW_PROJECT_ID", &["dialogflow", "project_id"]),
        ("DIALOGFLOW_ACCESS_TOKEN", &["dialogflow", "access_token"]),
        ("GOOGLE_APPLICATION_CREDENTIALS", &["dialogflow", "credentials_file"]),
    ];

    for (env_key, path) in ALIASES {
        if let Ok(value) = std::env::var(env_key) {
            merge_values(config, nest(path, Value::String(value)));
        }
    }
}

/// `MAYA__SERVER__PORT=9000` sets `server.port`
fn apply_path_overrides(config: &mut Value) {
    const PREFIX: &str = "MAYA__";
    for (key, raw) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }
        let path: Vec<&str> = segments.iter().map(String::as_str).collect();
        merge_values(config, nest(&path, parse_env_value(&raw)));
    }
}

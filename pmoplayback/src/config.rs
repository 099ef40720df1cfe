//! Configuration for pmoplayback.
//!
//! The embedded `playback.yaml` provides every default. An external
//! `playback.yaml` is merged on top of it when found, and
//! `PMOPLAYBACK_CONFIG__SECTION__KEY=value` environment variables are
//! applied last.
//!
//! The configuration directory is searched in this order:
//! 1. the `directory` argument if not empty,
//! 2. the `PMOPLAYBACK_CONFIG` environment variable,
//! 3. `.pmoplayback` in the current directory,
//! 4. `.pmoplayback` in the user's home directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::errors::PlaybackError;
use crate::icons::DirectoryIconCatalog;

const DEFAULT_CONFIG: &str = include_str!("playback.yaml");

pub const ENV_CONFIG_DIR: &str = "PMOPLAYBACK_CONFIG";
pub const ENV_PREFIX: &str = "PMOPLAYBACK_CONFIG__";
pub const CONFIG_FILE: &str = "playback.yaml";
const CONFIG_DIR_NAME: &str = ".pmoplayback";

const DEFAULT_UPDATE_INTERVAL_MS: u64 = 500;
const DEFAULT_LOG_MIN_LEVEL: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub update_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub min_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: DEFAULT_LOG_MIN_LEVEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub progress: ProgressConfig,
    pub icons: IconsConfig,
    pub log: LogConfig,
}

impl PlaybackConfig {
    /// Loads the configuration using the process environment.
    pub fn load(directory: &str) -> Result<Self> {
        Self::load_with_env(directory, env::vars())
    }

    /// Loads the configuration with an explicit set of environment variables.
    pub fn load_with_env<I>(directory: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)
            .context("embedded playback.yaml is invalid")?;

        if let Some(dir) = Self::find_config_dir(directory, &vars) {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                info!(path = %path.display(), "Loading playback configuration");
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let external: Value = serde_yaml::from_str(&content)
                    .with_context(|| format!("parsing {}", path.display()))?;
                merge_yaml(&mut data, &lower_keys(external));
            } else {
                debug!(path = %path.display(), "No playback configuration file, using defaults");
            }
        }

        apply_env_overrides(&mut data, &vars);

        let config: PlaybackConfig = serde_yaml::from_value(data)
            .map_err(|e| PlaybackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a YAML document merged on top of the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(content)?;
        merge_yaml(&mut data, &lower_keys(external));
        let config: PlaybackConfig = serde_yaml::from_value(data)
            .map_err(|e| PlaybackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_dir(directory: &str, vars: &[(String, String)]) -> Option<PathBuf> {
        if !directory.is_empty() {
            return Some(PathBuf::from(directory));
        }

        if let Some((_, env_path)) = vars.iter().find(|(k, _)| k == ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        let local = Path::new(CONFIG_DIR_NAME);
        if local.is_dir() {
            return Some(local.to_path_buf());
        }

        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|p| p.is_dir())
    }

    pub fn validate(&self) -> Result<(), PlaybackError> {
        if self.progress.update_interval_ms == 0 {
            let name = "progress.update_interval_ms";
            return Err(PlaybackError::invalid_config_value(name, "0"));
        }
        if self.log.min_level.trim().is_empty() {
            return Err(PlaybackError::invalid_config_value("log.min_level", ""));
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress.update_interval_ms)
    }

    /// File-backed icon catalog, when `icons.directory` is set.
    pub fn icon_catalog(&self) -> Option<DirectoryIconCatalog> {
        self.icons.directory.clone().map(DirectoryIconCatalog::new)
    }
}

fn apply_env_overrides(config: &mut Value, vars: &[(String, String)]) {
    for (key, value) in vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let key_path: Vec<String> = path.split("__").map(str::to_lowercase).collect();
            let key_path: Vec<&str> = key_path.iter().map(String::as_str).collect();
            debug!(key = %key, "Applying configuration override");
            set_value(config, &key_path, convert_env_value(value));
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(value.to_string()),
    }
}

fn set_value(data: &mut Value, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return;
    };
    if !data.is_mapping() {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String((*first).to_string());
        if !map.contains_key(&key) {
            map.insert(key.clone(), Value::Null);
        }
        if let Some(entry) = map.get_mut(&key) {
            set_value(entry, rest, value);
        }
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys(v));
            }
            Value::Mapping(new_map)
        }
        other => other,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalars and sequences are replaced
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let parsed: PlaybackConfig = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, PlaybackConfig::default());
        assert_eq!(parsed.progress_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "Progress:\n  update_interval_ms: 250\n";
        let config = PlaybackConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.progress.update_interval_ms, 250);
        assert_eq!(config.log.min_level, "info");
        assert!(config.icon_catalog().is_none());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let yaml = "progress:\n  update_interval_ms: 0\n";
        assert!(PlaybackConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "progress:\n  update_interval_ms: 250\nlog:\n  min_level: warn\n",
        )
        .unwrap();

        let key = format!("{ENV_PREFIX}PROGRESS__UPDATE_INTERVAL_MS");
        let vars = vec![
            (key, "100".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        let config = PlaybackConfig::load_with_env(dir_path, vars).unwrap();
        assert_eq!(config.progress.update_interval_ms, 100);
        assert_eq!(config.log.min_level, "warn");
    }

    #[test]
    fn test_env_config_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "icons:\n  directory: /opt/icons\n";
        fs::write(dir.path().join(CONFIG_FILE), yaml).unwrap();

        let dir_path = dir.path().to_string_lossy().to_string();
        let vars = vec![(ENV_CONFIG_DIR.to_string(), dir_path)];
        let config = PlaybackConfig::load_with_env("", vars).unwrap();
        assert_eq!(config.icons.directory, Some(PathBuf::from("/opt/icons")));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();
        let config = PlaybackConfig::load_with_env(dir_path, no_env()).unwrap();
        assert_eq!(config, PlaybackConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();
        let yaml = "progress: [unclosed";
        fs::write(dir.path().join(CONFIG_FILE), yaml).unwrap();
        assert!(PlaybackConfig::load_with_env(dir_path, no_env()).is_err());
    }
}

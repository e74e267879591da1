use std::path::{Path, PathBuf};

use anyhow::Context;
use api_metrics::Period;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Message log used when a command is given no path
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub json: bool,
}

fn metrics_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".api-metrics")
}

fn config_json_path() -> PathBuf {
    metrics_dir().join("config.json")
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl CliConfig {
    /// Explicit path (TOML) first; otherwise `~/.api-metrics/config.json`,
    /// then `./config.toml`. Environment variables override file values.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::discover(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn discover() -> Self {
        let json_path = config_json_path();
        if json_path.exists() {
            match Self::from_json_file(&json_path) {
                Ok(config) => return config,
                Err(error) => log::warn!("ignoring {}: {:#}", json_path.display(), error),
            }
        }

        if Path::new(CONFIG_FILE_PATH).exists() {
            match Self::from_toml_file(Path::new(CONFIG_FILE_PATH)) {
                Ok(config) => return config,
                Err(error) => log::warn!("ignoring {}: {:#}", CONFIG_FILE_PATH, error),
            }
        }

        Self::default()
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("API_METRICS_LOG") {
            self.log_path = Some(PathBuf::from(path));
        }
        if let Some(period) = lookup("API_METRICS_PERIOD") {
            match Period::parse(&period) {
                Some(period) => self.period = Some(period),
                None => log::warn!("ignoring unknown API_METRICS_PERIOD value {:?}", period),
            }
        }
        if let Some(json) = lookup("API_METRICS_JSON") {
            self.json = parse_bool_env(&json);
        }
    }
}

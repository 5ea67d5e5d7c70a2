//! Settings loading
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a layered resolution:
//! 1. Explicit path (e.g. `--config`), when given and present
//! 2. Override in the config dir (~/.config/spendlens/config.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! `OLLAMA_HOST` and `OLLAMA_MODEL` then override the insight settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::aggregate::AggregateConfig;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendlens.toml");

/// Insight service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightSettings {
    /// Ollama server URL; insights are disabled when unset
    pub host: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            host: None,
            model: "llama3.2".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub aggregate: AggregateConfig,
    pub insights: InsightSettings,
}

impl Settings {
    /// Load settings using the layered resolution
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut settings = load_file(override_path)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Parse settings from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            if !host.trim().is_empty() {
                self.insights.host = Some(host);
            }
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            if !model.trim().is_empty() {
                self.insights.model = model;
            }
        }
    }
}

/// Default override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendlens").join("config.toml"))
}

fn load_file(override_path: Option<&Path>) -> Result<Settings> {
    let candidate = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let content = match candidate {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            fs::read_to_string(&path)
                .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    aggregate: Option<RawAggregate>,
    insights: Option<RawInsights>,
}

#[derive(Debug, Deserialize)]
struct RawAggregate {
    top_categories: Option<usize>,
    recurring_min_months: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    host: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<Settings> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(aggregate) = raw.aggregate {
        if let Some(top) = aggregate.top_categories {
            if top == 0 {
                return Err(Error::InvalidData(
                    "aggregate.top_categories must be at least 1".into(),
                ));
            }
            settings.aggregate.top_categories = top;
        }
        if let Some(months) = aggregate.recurring_min_months {
            if !(1..=12).contains(&months) {
                return Err(Error::InvalidData(
                    "aggregate.recurring_min_months must be between 1 and 12".into(),
                ));
            }
            settings.aggregate.recurring_min_months = months;
        }
    }

    if let Some(insights) = raw.insights {
        settings.insights.host = insights.host.filter(|h| !h.trim().is_empty());
        if let Some(model) = insights.model {
            settings.insights.model = model;
        }
        if let Some(timeout) = insights.timeout_secs {
            settings.insights.timeout = Duration::from_secs(timeout);
        }
    }

    Ok(settings)
}

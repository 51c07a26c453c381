//! Engine configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, a TOML file,
//! then `LORA_STACK_*` environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_MAX_TRIGGER_WORDS, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH, DEFAULT_TRIGGER_SEPARATOR,
};
use crate::properties::NodeProperties;

pub const ENV_MAX_TRIGGER_WORDS: &str = "LORA_STACK_MAX_TRIGGER_WORDS";
pub const ENV_TRIGGER_SEPARATOR: &str = "LORA_STACK_TRIGGER_SEPARATOR";
pub const ENV_MIN_WIDTH: &str = "LORA_STACK_MIN_WIDTH";
pub const ENV_ENABLE_TAGS: &str = "LORA_STACK_ENABLE_TAGS";
pub const ENV_SEPARATE_STRENGTHS: &str = "LORA_STACK_SEPARATE_STRENGTHS";
pub const ENV_AUTO_FETCH: &str = "LORA_STACK_AUTO_FETCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerWordConfig {
    pub max_words: usize,
    pub separator: String,
}

impl Default for TriggerWordConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_TRIGGER_WORDS,
            separator: DEFAULT_TRIGGER_SEPARATOR.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Toggles a freshly created node starts with.
    pub defaults: NodeProperties,
    pub trigger_words: TriggerWordConfig,
    pub layout: LayoutConfig,
}

impl StackConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validated()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, then the optional file, then overrides from `lookup`.
    pub fn from_sources(
        path: Option<&Path>,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_overrides(lookup)
    }

    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(path, &|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_MAX_TRIGGER_WORDS) {
            self.trigger_words.max_words = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(ENV_MAX_TRIGGER_WORDS, &raw))?;
        }
        if let Some(raw) = lookup(ENV_TRIGGER_SEPARATOR) {
            self.trigger_words.separator = raw;
        }
        if let Some(raw) = lookup(ENV_MIN_WIDTH) {
            self.layout.min_width = raw
                .trim()
                .parse::<f32>()
                .map_err(|_| invalid(ENV_MIN_WIDTH, &raw))?;
        }
        if let Some(raw) = lookup(ENV_ENABLE_TAGS) {
            self.defaults.enable_tags = parse_bool(ENV_ENABLE_TAGS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEPARATE_STRENGTHS) {
            self.defaults.separate_strengths = parse_bool(ENV_SEPARATE_STRENGTHS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_FETCH) {
            self.defaults.auto_fetch_trigger_words = parse_bool(ENV_AUTO_FETCH, &raw)?;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.trigger_words.max_words == 0 {
            return Err(invalid("trigger_words.max_words", "0"));
        }
        if !self.layout.min_width.is_finite() || self.layout.min_width <= 0.0 {
            return Err(invalid(
                "layout.min_width",
                &self.layout.min_width.to_string(),
            ));
        }
        if !self.layout.min_height.is_finite() || self.layout.min_height < 0.0 {
            return Err(invalid(
                "layout.min_height",
                &self.layout.min_height.to_string(),
            ));
        }
        Ok(self)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

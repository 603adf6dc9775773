use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ComposerConfig {
    #[serde(default)]
    pub transliteration: Option<SuggestionConfig>,
    #[serde(default)]
    pub language_detection: LanguageDetectionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ComposerConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&resolve_config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let raw = fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config file {}", config_path.display()))?;
            let parsed: ComposerConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse TOML from {}", config_path.display()))?;
            return Ok(parsed);
        }

        Ok(ComposerConfig::default())
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("COMPOSER_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("composer").join("config.toml");
    }

    Path::new("/tmp/composer.toml").to_path_buf()
}

/// Remote transliteration lookup. Absent from the config means the feature
/// is off.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SuggestionConfig {
    #[serde(default = "default_suggestions_enabled")]
    pub enable: bool,
    pub endpoint: String,
    pub input_language: String,
    pub output_language: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: u32,
    #[serde(default = "default_suggest_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SuggestionConfig {
    pub fn new(
        endpoint: impl Into<String>,
        input_language: impl Into<String>,
        output_language: impl Into<String>,
    ) -> Self {
        Self {
            enable: default_suggestions_enabled(),
            endpoint: endpoint.into(),
            input_language: input_language.into(),
            output_language: output_language.into(),
            provider: default_provider(),
            max_suggestions: default_max_suggestions(),
            request_timeout_ms: default_suggest_timeout_ms(),
        }
    }
}

fn default_suggestions_enabled() -> bool {
    true
}

fn default_provider() -> String {
    "bhashini".to_string()
}

fn default_max_suggestions() -> u32 {
    3
}

fn default_suggest_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDetectionConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_locale")]
    pub active_locale: String,
    #[serde(default = "default_locale")]
    pub current_language: String,
    #[serde(default)]
    pub trigger_language: String,
    #[serde(default = "default_detect_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for LanguageDetectionConfig {
    fn default() -> Self {
        Self {
            enable: false,
            endpoint: String::new(),
            active_locale: default_locale(),
            current_language: default_locale(),
            trigger_language: String::new(),
            request_timeout_ms: default_detect_timeout_ms(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_detect_timeout_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

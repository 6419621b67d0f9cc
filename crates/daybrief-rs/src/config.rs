//! Configuration loading and validation.
//!
//! The briefing is driven by one YAML file (API keys, location, email
//! addressing, RSS feed list). Loading is strict: a missing file, bad YAML,
//! or a missing required field fails the run up front with a [`ConfigError`]
//! rather than partway through a fetch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration, mirroring the config.yaml layout.
#[derive(Debug, Clone, Deserialize)]
pub struct BriefingConfig {
    pub apis: ApiKeys,
    pub location: Location,
    /// Optional — without it the calendar section of the briefing is skipped.
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    pub email: EmailConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeys {
    pub openweather_key: String,
    pub openai_key: String,
    pub sparkpost_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub city: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// OAuth bearer token for the Google Calendar API. Obtaining and
    /// refreshing it is the operator's problem, not this program's.
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub recipient: String,
    pub from_address: String,
    pub subject: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
    pub rss_feeds: HashMap<String, FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub title: String,
    pub url: String,
}

fn default_max_articles() -> usize {
    10
}

fn default_summary_sentences() -> usize {
    3
}

/// Load and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<BriefingConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: BriefingConfig = serde_yaml::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

impl BriefingConfig {
    /// Semantic checks serde can't express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.news.rss_feeds.is_empty() {
            return Err(ConfigError::Invalid(
                "news.rss_feeds must have at least one feed".to_string(),
            ));
        }
        if self.news.max_articles == 0 {
            return Err(ConfigError::Invalid(
                "news.max_articles must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

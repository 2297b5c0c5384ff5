//! Runtime configuration.
//!
//! Everything is read from environment variables by [`Config::from_env`],
//! with defaults that are good enough to run the service locally against a
//! SQLite file in the working directory.

use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::scoring::category::CYBERSECURITY_SOURCES;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_PORT: &str = "PORT";
pub const ENV_FETCH_INTERVAL_SECS: &str = "FETCH_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_FEED_SOURCES: &str = "FEED_SOURCES";
pub const ENV_ALLOWED_LANGUAGES: &str = "ALLOWED_LANGUAGES";
pub const ENV_KEYWORDS_PATH: &str = "KEYWORDS_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_RATE_LIMIT_PER_MINUTE: &str = "RATE_LIMIT_PER_MINUTE";

const DEFAULT_DATABASE_URL: &str = "sqlite://news.db?mode=rwc";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_INTERVAL_SECS: u64 = 15 * 60;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ALLOWED_LANGUAGES: &str = "en";
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 120;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    bind_addr: String,
    fetch_interval: Duration,
    fetch_timeout: Duration,
    feed_sources: Vec<String>,
    allowed_languages: Vec<String>,
    keywords_path: Option<PathBuf>,
    gemini_api_key: Option<String>,
    rate_limit_per_minute: u32,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = non_empty_var(ENV_DATABASE_URL)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        // BIND_ADDR wins; PORT alone only replaces the default port
        let bind_addr = match non_empty_var(ENV_BIND_ADDR) {
            Some(addr) => addr,
            None => {
                let port = parse_var(ENV_PORT, DEFAULT_PORT)?;
                format!("{}:{}", DEFAULT_HOST, port)
            }
        };

        let fetch_interval = Duration::from_secs(positive(
            ENV_FETCH_INTERVAL_SECS,
            parse_var(ENV_FETCH_INTERVAL_SECS, DEFAULT_FETCH_INTERVAL_SECS)?,
        )?);
        let fetch_timeout = Duration::from_secs(positive(
            ENV_FETCH_TIMEOUT_SECS,
            parse_var(ENV_FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?,
        )?);

        let feed_sources = match non_empty_var(ENV_FEED_SOURCES) {
            Some(raw) => split_list(&raw),
            None => CYBERSECURITY_SOURCES.iter().map(|s| s.to_string()).collect(),
        };
        if feed_sources.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: ENV_FEED_SOURCES,
                reason: "no feed sources listed".to_string(),
            });
        }

        let allowed_languages = split_list(
            &non_empty_var(ENV_ALLOWED_LANGUAGES)
                .unwrap_or_else(|| DEFAULT_ALLOWED_LANGUAGES.to_string()),
        );
        if allowed_languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: ENV_ALLOWED_LANGUAGES,
                reason: "at least one language code is required".to_string(),
            });
        }

        let rate_limit_per_minute = positive(
            ENV_RATE_LIMIT_PER_MINUTE,
            parse_var(ENV_RATE_LIMIT_PER_MINUTE, DEFAULT_RATE_LIMIT_PER_MINUTE)?,
        )?;

        Ok(Self {
            database_url,
            bind_addr,
            fetch_interval,
            fetch_timeout,
            feed_sources,
            allowed_languages,
            keywords_path: non_empty_var(ENV_KEYWORDS_PATH).map(PathBuf::from),
            gemini_api_key: non_empty_var(ENV_GEMINI_API_KEY),
            rate_limit_per_minute,
        })
    }

    /// SQLite connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Period between ingestion rounds.
    pub fn fetch_interval(&self) -> Duration {
        self.fetch_interval
    }
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn feed_sources(&self) -> &[String] {
        &self.feed_sources
    }
    /// ISO 639 codes of the languages admitted by ingestion.
    pub fn allowed_languages(&self) -> &[String] {
        &self.allowed_languages
    }
    pub fn keywords_path(&self) -> Option<&PathBuf> {
        self.keywords_path.as_ref()
    }
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }
    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn positive<T: PartialOrd + Default>(key: &'static str, value: T) -> Result<T, ConfigError> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            field: key,
            reason: "must be greater than zero".to_string(),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

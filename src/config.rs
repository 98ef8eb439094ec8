use crate::error::{RepositoryError, Result};
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.example.co`
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub page_size: usize,
    pub http_timeout: Duration,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read `ESTATE_*` variables
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let page_size = match get("ESTATE_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    RepositoryError::Config(format!("ESTATE_PAGE_SIZE must be a positive integer, got '{}'", raw))
                })?,
            None => defaults.page_size,
        };

        let http_timeout = match get("ESTATE_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                RepositoryError::Config(format!("ESTATE_HTTP_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))
            })?),
            None => defaults.http_timeout,
        };

        let log_json = match get("ESTATE_LOG_JSON") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                RepositoryError::Config(format!("ESTATE_LOG_JSON must be true or false, got '{}'", raw))
            })?,
            None => defaults.log_json,
        };

        Ok(Self {
            backend_url: get("ESTATE_BACKEND_URL").map(|url| url.trim_end_matches('/').to_string()),
            api_key: get("ESTATE_API_KEY"),
            page_size,
            http_timeout,
            log_level: get("ESTATE_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

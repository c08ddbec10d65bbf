//! Client configuration.
//!
//! Defaults target the public INE endpoint. `.env` and environment variables
//! override them, and CLI flags override those.
//!
//! - `INE_API_BASE_URL`
//! - `INE_LANG` (`EN` or `PT`; period parsing expects `EN` labels)
//! - `INE_TIMEOUT_SECS`

use std::time::Duration;

use crate::error::IneError;

pub const DEFAULT_BASE_URL: &str = "https://www.ine.pt/ine/json_indicador";
pub const DEFAULT_LANG: &str = "EN";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

pub const ENV_BASE_URL: &str = "INE_API_BASE_URL";
pub const ENV_LANG: &str = "INE_LANG";
pub const ENV_TIMEOUT_SECS: &str = "INE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub lang: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if any), then read overrides from the process environment.
    pub fn from_env() -> Result<Self, IneError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IneError> {
        let mut config = Self::default();
        if let Some(base) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(lang) = lookup(ENV_LANG).filter(|v| !v.trim().is_empty()) {
            config.lang = lang.trim().to_uppercase();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, IneError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(IneError::Validation(format!(
            "{ENV_TIMEOUT_SECS} must be a positive number of seconds, got '{raw}'."
        ))),
    }
}

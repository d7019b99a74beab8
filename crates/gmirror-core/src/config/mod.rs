//! Runtime configuration.
//!
//! `MirrorConfig` collects the API endpoint, credentials, transport pacing and
//! sync tuning used by the CLI. Values come from environment variables and
//! may be overridden by command-line flags afterwards.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::remote::{DEFAULT_API_URL, DEFAULT_QUIET_PERIOD, MAX_PAGE_SIZE};
use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const ENV_TOKEN: &str = "GROUPME_TOKEN";
const ENV_API_URL: &str = "GMIRROR_API_URL";
const ENV_DATA_DIR: &str = "GMIRROR_DATA_DIR";
const ENV_QUIET_MS: &str = "GMIRROR_QUIET_MS";
const ENV_RETRY_BUDGET: &str = "GMIRROR_RETRY_BUDGET";
const ENV_PAGE_SIZE: &str = "GMIRROR_PAGE_SIZE";
const ENV_FORCE_REFRESH: &str = "GMIRROR_FORCE_REFRESH";

pub const DEFAULT_RETRY_BUDGET: u32 = 3;
pub const DEFAULT_FORCE_REFRESH: usize = 200;

/// Settings shared by every command.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// API access token; only required by commands that talk to the remote
    pub token: Option<String>,
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    /// Directory holding conversation snapshots; resolved by the caller when unset
    pub data_dir: Option<PathBuf>,
    /// Minimum spacing between outbound calls
    pub quiet_period: Duration,
    /// Extra attempts for a transient failure of a single call
    pub retry_budget: u32,
    /// Messages requested per page
    pub page_size: usize,
    /// Most recent messages re-fetched on every sync to pick up likes/deletions
    pub force_refresh: usize,
}

impl std::fmt::Debug for MirrorConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MirrorConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("data_dir", &self.data_dir)
            .field("quiet_period", &self.quiet_period)
            .field("retry_budget", &self.retry_budget)
            .field("page_size", &self.page_size)
            .field("force_refresh", &self.force_refresh)
            .finish()
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: None,
            quiet_period: DEFAULT_QUIET_PERIOD,
            retry_budget: DEFAULT_RETRY_BUDGET,
            page_size: MAX_PAGE_SIZE,
            force_refresh: DEFAULT_FORCE_REFRESH,
        }
    }
}

impl MirrorConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Check cross-field constraints after overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.api_url) {
            return Err(Error::Config(format!(
                "{ENV_API_URL} must include http:// or https://"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::Config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Token, or a configuration error naming the variable to set.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{ENV_TOKEN} is not set")))
    }
}

fn parse_config(get: impl Fn(&str) -> Option<String>) -> Result<MirrorConfig> {
    let read = |key: &str| normalize_text_option(get(key));
    let defaults = MirrorConfig::default();

    let config = MirrorConfig {
        token: read(ENV_TOKEN),
        api_url: read(ENV_API_URL)
            .map_or(defaults.api_url, |url| url.trim_end_matches('/').to_string()),
        data_dir: read(ENV_DATA_DIR).map(PathBuf::from),
        quiet_period: parse_number::<u64>(ENV_QUIET_MS, read(ENV_QUIET_MS))?
            .map_or(defaults.quiet_period, Duration::from_millis),
        retry_budget: parse_number(ENV_RETRY_BUDGET, read(ENV_RETRY_BUDGET))?
            .unwrap_or(defaults.retry_budget),
        page_size: parse_number(ENV_PAGE_SIZE, read(ENV_PAGE_SIZE))?
            .unwrap_or(defaults.page_size),
        force_refresh: parse_number(ENV_FORCE_REFRESH, read(ENV_FORCE_REFRESH))?
            .unwrap_or(defaults.force_refresh),
    };
    config.validate()?;
    Ok(config)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| Error::Config(format!("{key} must be a non-negative integer")))
        })
        .transpose()
}

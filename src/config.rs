//! Environment-driven configuration
//!
//! All settings have working defaults; every one can be overridden with a
//! `FINANCEGURU_*` environment variable (a `.env` file is honored by the
//! binary).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend API URL - adjust if the backend runs on a different port.
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;
const DEFAULT_FALLBACK_DELAY_MS: u64 = 1000;
const DEFAULT_STATE_PATH: &str = "financeguru_session.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub probe_timeout: Duration,
    pub chat_timeout: Duration,
    pub probe_interval: Duration,
    pub fallback_delay: Duration,
    pub state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("FINANCEGURU_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            probe_timeout: Duration::from_secs(env_u64(
                "FINANCEGURU_PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )),
            chat_timeout: Duration::from_secs(env_u64(
                "FINANCEGURU_CHAT_TIMEOUT_SECS",
                DEFAULT_CHAT_TIMEOUT_SECS,
            )),
            probe_interval: Duration::from_secs(env_u64(
                "FINANCEGURU_PROBE_INTERVAL_SECS",
                DEFAULT_PROBE_INTERVAL_SECS,
            )),
            fallback_delay: Duration::from_millis(env_u64(
                "FINANCEGURU_FALLBACK_DELAY_MS",
                DEFAULT_FALLBACK_DELAY_MS,
            )),
            state_path: env::var("FINANCEGURU_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            chat_timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            probe_interval: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
            fallback_delay: Duration::from_millis(DEFAULT_FALLBACK_DELAY_MS),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

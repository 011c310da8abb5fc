//! Runner configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use skyhop_core::{Result, SkyhopError};
use skyhop_gateway::client::DEFAULT_BASE_URL;
use skyhop_gateway::OpenSkyConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the runner reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub state: PathBuf,
    pub trip_log: PathBuf,
    pub caption: PathBuf,
    pub latest: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            state: PathBuf::from("state.json"),
            trip_log: PathBuf::from("trip_log.ndjson"),
            caption: PathBuf::from("caption.txt"),
            latest: PathBuf::from("latest.json"),
        }
    }
}

/// Everything a run needs before touching any state.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub timeout: Duration,
    pub paths: OutputPaths,
    /// Fixed seed for the pseudorandom source; entropy when absent.
    pub seed: Option<u64>,
}

impl NodeConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key)
                .ok_or_else(|| SkyhopError::configuration(key, "required credential is not set"))
        };

        let username = required("OPENSKY_USER")?;
        let password = required("OPENSKY_PASS")?;

        let timeout_secs = match get("OPENSKY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    SkyhopError::configuration(
                        "OPENSKY_TIMEOUT_SECS",
                        format!("expected a positive number of seconds, got {raw:?}"),
                    )
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let seed = match get("SKYHOP_SEED") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                SkyhopError::configuration(
                    "SKYHOP_SEED",
                    format!("expected an unsigned integer, got {raw:?}"),
                )
            })?),
            None => None,
        };

        let defaults = OutputPaths::default();
        let path = |key: &str, default: PathBuf| get(key).map(PathBuf::from).unwrap_or(default);

        Ok(Self {
            username,
            password,
            base_url: get("OPENSKY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            paths: OutputPaths {
                state: path("SKYHOP_STATE_PATH", defaults.state),
                trip_log: path("SKYHOP_LOG_PATH", defaults.trip_log),
                caption: path("SKYHOP_CAPTION_PATH", defaults.caption),
                latest: path("SKYHOP_LATEST_PATH", defaults.latest),
            },
            seed,
        })
    }

    /// Gateway settings derived from this configuration.
    pub fn opensky(&self) -> OpenSkyConfig {
        OpenSkyConfig {
            base_url: self.base_url.clone(),
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            timeout: self.timeout,
        }
    }
}

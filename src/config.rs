//! Configuration types for steam-sweep
//!
//! The configuration is loaded once, validated, and then shared read-only (`Arc<Config>`)
//! across every worker. Nothing mutates it after load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classify::{MatchMode, RuleConfig};
use crate::error::{Error, Result};
use crate::steam_id::{AccountId, AuthServer};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "Settings.json";

/// Which accounts to scan and how hard to push
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// First sequence number to scan (inclusive)
    #[serde(default)]
    pub start_sequence: u32,

    /// Last sequence number to scan (inclusive)
    #[serde(default)]
    pub end_sequence: u32,

    /// Number of concurrent workers (default: 4)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Pause each worker takes between accounts (default: 50 ms)
    #[serde(
        default = "default_pacing_delay",
        rename = "pacing_delay_ms",
        with = "duration_millis_serde"
    )]
    pub pacing_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_sequence: 0,
            end_sequence: 0,
            worker_count: default_worker_count(),
            pacing_delay: default_pacing_delay(),
        }
    }
}

impl ScanConfig {
    /// Range of accounts this config describes
    pub fn range(&self) -> ScanRange {
        ScanRange {
            start_sequence: self.start_sequence,
            end_sequence: self.end_sequence,
        }
    }
}

/// Steam Web API access settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Web API key (empty means "not configured")
    #[serde(default)]
    pub api_key: String,

    /// Base URL all endpoint paths are joined onto
    #[serde(default = "default_api_base_url", rename = "api_base_url")]
    pub base_url: String,

    /// Per-request timeout, independent of retries (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// How long every worker holds off after a 429 (default: 60 seconds)
    #[serde(default = "default_rate_limit_cooldown", with = "duration_serde")]
    pub rate_limit_cooldown: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            rate_limit_cooldown: default_rate_limit_cooldown(),
        }
    }
}

/// Retry configuration for timeouts and transport errors
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 5 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry (default: 1.0, a fixed interval)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Where match records are written
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one file per category (default: "./out")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration for a scan
///
/// Sub-configs are flattened so the on-disk JSON stays a single flat object,
/// except `retry` which reads better nested.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Range, worker count and pacing
    #[serde(flatten)]
    pub scan: ScanConfig,

    /// Which classification rules are enabled
    #[serde(flatten)]
    pub rules: RuleConfig,

    /// Whether an account stops at its first matching rule
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Web API access
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Retry policy for remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Output location
    #[serde(flatten)]
    pub output: OutputConfig,
}

impl Config {
    /// Read and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, a serialization error if it is not
    /// valid JSON for this schema, or [`Error::Config`] if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write a pretty-printed default configuration for the user to edit
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&Config::default())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values that would make the scan misbehave
    ///
    /// A degenerate range or an empty rule set is not an error here; the scanner
    /// treats those as an empty scan.
    pub fn validate(&self) -> Result<()> {
        if self.scan.worker_count == 0 {
            return Err(Error::config("worker_count", "must be at least 1"));
        }
        if self.api.request_timeout.is_zero() {
            return Err(Error::config("request_timeout", "must be greater than zero"));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                "must be a finite number >= 1.0",
            ));
        }
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::config("api_base_url", format!("{}: {e}", self.api.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::config(
                "api_base_url",
                format!("{} cannot be used as a base URL", self.api.base_url),
            ));
        }
        Ok(())
    }

    /// Whether the API key is present
    pub fn has_api_key(&self) -> bool {
        !self.api.api_key.trim().is_empty()
    }
}

/// Inclusive range of sequence numbers, walked in `(sequence, auth_server)` order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanRange {
    /// First sequence (inclusive)
    pub start_sequence: u32,
    /// Last sequence (inclusive)
    pub end_sequence: u32,
}

impl ScanRange {
    /// A range whose start is not below its end scans nothing
    pub fn is_degenerate(&self) -> bool {
        self.start_sequence >= self.end_sequence
    }

    /// Number of account ids the range yields
    pub fn len(&self) -> u64 {
        if self.is_degenerate() {
            0
        } else {
            (u64::from(self.end_sequence) - u64::from(self.start_sequence) + 1) * 2
        }
    }

    /// Whether the range yields nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every account id in scan order
    pub fn iter(&self) -> impl Iterator<Item = AccountId> + Send + 'static {
        let range = if self.is_degenerate() {
            1..=0
        } else {
            self.start_sequence..=self.end_sequence
        };
        range.flat_map(|sequence| {
            AuthServer::ALL.into_iter().map(move |auth_server| AccountId {
                auth_server,
                sequence,
            })
        })
    }
}

fn default_worker_count() -> usize {
    4
}

fn default_pacing_delay() -> Duration {
    Duration::from_millis(50)
}

fn default_api_base_url() -> String {
    "https://api.steampowered.com/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_rate_limit_cooldown() -> Duration {
    Duration::from_secs(60)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond Duration helper (pacing is sub-second)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the collector.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. features.yaml file
//! 3. Environment variables (QUBITOS_*, IBM_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider selection and settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Extraction and aggregation settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["features.yaml", "features.yml", "/etc/qubitos/features.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_FEATURES_OUTPUT") {
            self.output.path = PathBuf::from(val);
        }
        if let Ok(val) = env::var("QUBITOS_FEATURES_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                self.collector.concurrency = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_FEATURES_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.collector.query_timeout_ms = ms;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val;
        }

        // IBM provider
        if let Ok(val) = env::var("IBM_QUANTUM_URL") {
            self.provider.ibm.api_url = val;
        }
        if let Ok(val) = env::var("IBM_QUANTUM_TOKEN") {
            self.provider.ibm.auth_token = Some(val);
        }
        if let Ok(val) = env::var("IBM_INSTANCE_CRN") {
            self.provider.ibm.service_crn = Some(val);
        }
    }

    /// Apply command-line overrides. These take priority over file and env.
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) -> Result<()> {
        if let Some(path) = overrides.output {
            self.output.path = path;
        }
        if let Some(timeout) = overrides.timeout {
            self.collector.query_timeout_ms = u64::try_from(timeout.as_millis())
                .map_err(|_| Error::Config(format!("timeout {:?} is too large", timeout)))?;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.collector.concurrency = concurrency;
        }
        if let Some(path) = overrides.fixture {
            self.provider.kind = ProviderKind::Fixture;
            self.provider.fixture.path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.collector.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.collector.query_timeout_ms == 0 {
            return Err(Error::Config("query timeout cannot be 0".into()));
        }
        let p = self.collector.downtime_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::Config(format!(
                "downtime_probability must be within [0, 1], got {}",
                p
            )));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(Error::Config("output path cannot be empty".into()));
        }
        if self.provider.kind == ProviderKind::Fixture && self.provider.fixture.path.is_none() {
            return Err(Error::Config(
                "fixture provider selected but no fixture path configured".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "unknown log format '{}', expected 'pretty' or 'json'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--output`
    pub output: Option<PathBuf>,
    /// `--timeout`
    pub timeout: Option<Duration>,
    /// `--concurrency`
    pub concurrency: Option<usize>,
    /// `--fixture`; also selects the fixture provider
    pub fixture: Option<PathBuf>,
    /// `--log-level`
    pub log_level: Option<String>,
}

/// Which provider answers registry and query calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// IBM Quantum Runtime REST API
    #[default]
    Ibm,
    /// Backends loaded from a YAML fixture file
    Fixture,
}

/// Provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Active provider
    #[serde(default)]
    pub kind: ProviderKind,

    /// IBM Quantum settings
    #[serde(default)]
    pub ibm: IbmConfig,

    /// Fixture settings
    #[serde(default)]
    pub fixture: FixtureConfig,
}

/// IBM Quantum Runtime provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct IbmConfig {
    /// Runtime API base URL
    #[serde(default = "default_ibm_url")]
    pub api_url: String,

    /// Bearer token
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Service instance CRN
    #[serde(default)]
    pub service_crn: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_ibm_timeout")]
    pub timeout_sec: u64,

    /// Maximum number of retries for transient errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl std::fmt::Debug for IbmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbmConfig")
            .field("api_url", &self.api_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("service_crn", &self.service_crn)
            .field("timeout_sec", &self.timeout_sec)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl Default for IbmConfig {
    fn default() -> Self {
        Self {
            api_url: default_ibm_url(),
            auth_token: None,
            service_crn: None,
            timeout_sec: default_ibm_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

fn default_ibm_url() -> String {
    "https://quantum.cloud.ibm.com/api/v1".into()
}

fn default_ibm_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Fixture provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Path to the YAML fixture
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Extraction and aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Maximum number of backends queried at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-query timeout in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Value of the constant downtime estimator
    #[serde(default = "default_downtime_probability")]
    pub downtime_probability: f64,
}

impl CollectorConfig {
    /// Per-query timeout.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            query_timeout_ms: default_query_timeout_ms(),
            downtime_probability: default_downtime_probability(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_query_timeout_ms() -> u64 {
    30_000
}

fn default_downtime_probability() -> f64 {
    0.1
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Snapshot file path
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Pretty-print the JSON document
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: true,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("backend_features.json")
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Parse a duration flag: `500ms`, `30s`, `2m`, or bare seconds.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", s))?;
    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        other => Err(format!(
            "unknown duration unit '{}' in '{}', expected ms, s or m",
            other, s
        )),
    }
}

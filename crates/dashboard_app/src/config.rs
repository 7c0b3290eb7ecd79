use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dashboard_core::{MonitorSettings, DEFAULT_TARGET_LANGUAGE};
use dashboard_engine::ApiSettings;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::platform::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_period_ms: u64,
    pub hide_delay_ms: u64,
    pub notification_ttl_ms: u64,
    /// Consecutive failed polls tolerated before monitoring stops.
    pub max_poll_failures: u32,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub target_language: String,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let monitor = MonitorSettings::default();
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            poll_period_ms: millis(monitor.poll_period),
            hide_delay_ms: millis(monitor.hide_delay),
            notification_ttl_ms: millis(monitor.notice_ttl),
            max_poll_failures: monitor.max_poll_failures,
            connect_timeout_ms: millis(api.connect_timeout),
            request_timeout_ms: api.request_timeout.map(millis),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Loads an explicit path, else `./dashboard.ron` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(raw: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(raw)
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(period) = args.poll_period_ms {
            self.poll_period_ms = period;
        }
        if let Some(failures) = args.max_poll_failures {
            self.max_poll_failures = failures;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        if self.poll_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_period_ms must be greater than zero".to_string(),
            ));
        }
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Invalid("target_language is empty".to_string()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            poll_period: Duration::from_millis(self.poll_period_ms),
            hide_delay: Duration::from_millis(self.hide_delay_ms),
            notice_ttl: Duration::from_millis(self.notification_ttl_ms),
            max_poll_failures: self.max_poll_failures,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

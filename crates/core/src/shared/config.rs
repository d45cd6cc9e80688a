use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_ALERT_COOLDOWN_SECS, DEFAULT_AREA, DEFAULT_GRACE_PERIOD_SECS,
    DEFAULT_MAX_ASSOCIATION_DISTANCE, DEFAULT_SNAPSHOT_DIR, DEFAULT_STALE_REMOVAL_SECS,
    TELEGRAM_API_URL,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max association distance must be a positive finite number, got {0}")]
    InvalidDistance(f64),
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
    #[error("{name} must be a non-negative finite number of seconds, got {value}")]
    InvalidSeconds { name: &'static str, value: f64 },
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Thresholds driving helmet association and the alert state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplianceConfig {
    /// Pixels; a helmet counts when strictly closer than this to the head point.
    pub max_association_distance: f64,
    /// Continuous non-compliance required before the first alert.
    pub grace_period_before_alert: Duration,
    /// Minimum spacing between alerts for one identity.
    pub alert_cooldown: Duration,
    /// How long after its last alert an absent identity is kept.
    pub stale_removal_grace: Duration,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            max_association_distance: DEFAULT_MAX_ASSOCIATION_DISTANCE,
            grace_period_before_alert: Duration::from_secs_f64(DEFAULT_GRACE_PERIOD_SECS),
            alert_cooldown: Duration::from_secs_f64(DEFAULT_ALERT_COOLDOWN_SECS),
            stale_removal_grace: Duration::from_secs_f64(DEFAULT_STALE_REMOVAL_SECS),
        }
    }
}

impl ComplianceConfig {
    /// Rejects thresholds the state machine cannot work with.
    ///
    /// A zero grace period is accepted and means "alert on the first
    /// non-compliant frame".
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.max_association_distance;
        if !d.is_finite() || d <= 0.0 {
            return Err(ConfigError::InvalidDistance(d));
        }
        if self.alert_cooldown.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: "alert_cooldown",
            });
        }
        if self.stale_removal_grace.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: "stale_removal_grace",
            });
        }
        Ok(())
    }
}

/// On-disk monitor settings (JSON). Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub max_association_distance: f64,
    pub grace_period_secs: f64,
    pub alert_cooldown_secs: f64,
    pub stale_removal_secs: f64,
    pub area: String,
    pub snapshot_dir: PathBuf,
    /// TrueType/OpenType font for snapshot labels; outlines only when unset.
    pub label_font: Option<PathBuf>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_url: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            max_association_distance: DEFAULT_MAX_ASSOCIATION_DISTANCE,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            alert_cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
            stale_removal_secs: DEFAULT_STALE_REMOVAL_SECS,
            area: DEFAULT_AREA.to_string(),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            label_font: None,
            telegram_token: None,
            telegram_chat_id: None,
            telegram_api_url: TELEGRAM_API_URL.to_string(),
        }
    }
}

impl MonitorSettings {
    /// `<config dir>/hardhat/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hardhat").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the default config file when present, otherwise defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn compliance_config(&self) -> Result<ComplianceConfig, ConfigError> {
        let config = ComplianceConfig {
            max_association_distance: self.max_association_distance,
            grace_period_before_alert: seconds("grace_period_secs", self.grace_period_secs)?,
            alert_cooldown: seconds("alert_cooldown_secs", self.alert_cooldown_secs)?,
            stale_removal_grace: seconds("stale_removal_secs", self.stale_removal_secs)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { name, value })
}

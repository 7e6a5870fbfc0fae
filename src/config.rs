//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety
//!
//! Engine functions take an [`EngineConfig`] explicitly so tests never depend
//! on process-wide state; the global accessor exists for the CLI binary.

use crate::activity::ActivityThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Engine thresholds and windows
    pub engine: EngineConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

/// The knobs the engine itself recognizes. Everything here has a venue-level
/// default; dashboards can override per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes before an unresolved session stops counting as an active alert.
    pub session_timeout_minutes: i64,
    /// Resolution-time target used for SLA compliance, in minutes.
    pub sla_target_minutes: i64,
    /// A rating at or below this is a low score. See
    /// [`crate::sessions::ALERT_THRESHOLD`] for the companion constants.
    pub alert_rating_threshold: u8,
    /// Cap for the `all` range preset, in trailing months. `None` = epoch.
    /// Kept configurable on purpose: historical call sites disagree on what
    /// "all" means and the divergence has not been ruled intentional.
    pub all_lookback_months: Option<u32>,
    /// Activity-level ladder for a single venue.
    pub single_venue_activity: ActivityThresholds,
    /// Activity-level ladder when several venues are combined; scaled up so
    /// a fleet does not read as "peak" from ordinary volume.
    pub multi_venue_activity: ActivityThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 120,
            sla_target_minutes: 120,
            alert_rating_threshold: 2,
            all_lookback_months: None,
            single_venue_activity: ActivityThresholds {
                steady: 5,
                busy: 15,
                peak: 30,
            },
            multi_venue_activity: ActivityThresholds {
                steady: 15,
                busy: 45,
                peak: 90,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "WARN".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            engine: EngineConfig::default(),
            output: OutputConfig {
                json_pretty: false,
                timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("table-pulse.toml"),
            PathBuf::from(".table-pulse.toml"),
            dirs::config_dir()
                .map(|d| d.join("table-pulse").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("TABLE_PULSE_SESSION_TIMEOUT_MINUTES") {
            self.engine.session_timeout_minutes = val
                .parse()
                .context("Invalid TABLE_PULSE_SESSION_TIMEOUT_MINUTES")?;
        }
        if let Ok(val) = env::var("TABLE_PULSE_SLA_TARGET_MINUTES") {
            self.engine.sla_target_minutes = val
                .parse()
                .context("Invalid TABLE_PULSE_SLA_TARGET_MINUTES")?;
        }
        if let Ok(val) = env::var("TABLE_PULSE_ALERT_THRESHOLD") {
            self.engine.alert_rating_threshold =
                val.parse().context("Invalid TABLE_PULSE_ALERT_THRESHOLD")?;
        }
        if let Ok(val) = env::var("TABLE_PULSE_ALL_LOOKBACK_MONTHS") {
            self.engine.all_lookback_months = Some(
                val.parse()
                    .context("Invalid TABLE_PULSE_ALL_LOOKBACK_MONTHS")?,
            );
        }

        if let Ok(val) = env::var("TABLE_PULSE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.engine.session_timeout_minutes <= 0 {
            return Err(anyhow::anyhow!(
                "Session timeout must be positive, got {} minutes",
                self.engine.session_timeout_minutes
            ));
        }

        if self.engine.sla_target_minutes <= 0 {
            return Err(anyhow::anyhow!(
                "SLA target must be positive, got {} minutes",
                self.engine.sla_target_minutes
            ));
        }

        if !(1..=5).contains(&self.engine.alert_rating_threshold) {
            return Err(anyhow::anyhow!(
                "Alert rating threshold must be within 1-5, got {}",
                self.engine.alert_rating_threshold
            ));
        }

        for ladder in [
            &self.engine.single_venue_activity,
            &self.engine.multi_venue_activity,
        ] {
            if !(ladder.steady < ladder.busy && ladder.busy < ladder.peak) {
                return Err(anyhow::anyhow!(
                    "Activity thresholds must be strictly increasing: {:?}",
                    ladder
                ));
            }
        }

        if self.engine.session_timeout_minutes < 15 {
            warn!(
                timeout_minutes = self.engine.session_timeout_minutes,
                "Session timeout is very short, most sessions will expire before triage"
            );
        }

        Ok(())
    }

    /// Save current configuration to file
    #[allow(dead_code)]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default configuration");
        Config::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.engine.session_timeout_minutes, 120);
        assert_eq!(config.engine.sla_target_minutes, 120);
        assert_eq!(config.engine.alert_rating_threshold, 2);
        assert_eq!(config.engine.all_lookback_months, None);
    }

    #[test]
    fn test_env_override() {
        env::set_var("TABLE_PULSE_SLA_TARGET_MINUTES", "90");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.engine.sla_target_minutes, 90);
        env::remove_var("TABLE_PULSE_SLA_TARGET_MINUTES");
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = Config::default();
        config.engine.session_timeout_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_band_threshold() {
        let mut config = Config::default();
        config.engine.alert_rating_threshold = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_increasing_ladder() {
        let mut config = Config::default();
        config.engine.multi_venue_activity.busy = config.engine.multi_venue_activity.peak;
        assert!(config.validate().is_err());
    }
}

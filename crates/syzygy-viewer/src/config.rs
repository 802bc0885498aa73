//! Configuration parsing and validation for the viewer.

use eyre::{Result, WrapErr, ensure};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use syzygy_core::{SyncConfig, WatchdogConfig};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Prefix under which the camera publishes its image and calibration
    /// topics.
    pub camera_prefix: String,

    /// Synchronization parameters.
    #[serde(default)]
    pub sync: SyncSettings,

    /// Health watchdog parameters.
    #[serde(default)]
    pub watchdog: WatchdogSettings,

    /// Render loop parameters.
    #[serde(default)]
    pub display: DisplaySettings,

    /// Startup readiness parameters.
    #[serde(default)]
    pub startup: StartupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// The maximum timestamp spread within one rendered tuple.
    #[serde(with = "humantime_serde")]
    pub tolerance: Duration,

    /// Messages buffered per input stream.
    pub buffer_capacity: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            tolerance: Duration::from_millis(100),
            buffer_capacity: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchdogSettings {
    /// Interval between health audits.
    #[serde(with = "humantime_serde")]
    pub period: Duration,

    /// Expected arrivals per emitted tuple within one audit period.
    pub multiplier: u64,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(30),
            multiplier: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Target render loop rate in Hz.
    pub frame_rate: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { frame_rate: 80.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    /// How long to wait for all input streams to start publishing.
    #[serde(with = "humantime_serde")]
    pub readiness_deadline: Duration,

    /// How often to re-check readiness while waiting.
    #[serde(with = "humantime_serde")]
    pub readiness_poll: Duration,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            readiness_deadline: Duration::from_secs(60),
            readiness_poll: Duration::from_secs(1),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&contents)
            .wrap_err_with(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: ViewerConfig =
            serde_yaml::from_str(contents).wrap_err("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.camera_prefix.is_empty(),
            "camera_prefix must not be empty"
        );
        ensure!(
            !self.sync.tolerance.is_zero(),
            "sync.tolerance must be greater than zero"
        );
        ensure!(
            self.sync.buffer_capacity > 0,
            "sync.buffer_capacity must be greater than zero"
        );
        ensure!(
            !self.watchdog.period.is_zero(),
            "watchdog.period must be greater than zero"
        );
        ensure!(
            self.watchdog.multiplier > 0,
            "watchdog.multiplier must be greater than zero"
        );
        ensure!(
            self.display.frame_rate.is_finite() && self.display.frame_rate > 0.0,
            "display.frame_rate must be a positive number"
        );
        ensure!(
            !self.startup.readiness_poll.is_zero(),
            "startup.readiness_poll must be greater than zero"
        );
        Ok(())
    }

    /// Synchronizer configuration derived from the settings.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            tolerance: self.sync.tolerance,
            capacity: self.sync.buffer_capacity,
        }
    }

    /// Watchdog configuration derived from the settings.
    pub fn watchdog_config(&self) -> WatchdogConfig {
        WatchdogConfig {
            period: self.watchdog.period,
            multiplier: self.watchdog.multiplier,
        }
    }

    /// The render loop period implied by the configured frame rate.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.display.frame_rate)
    }
}

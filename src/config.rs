//! Configuration system using Figment
//!
//! Strongly-typed configuration for the monitor. Values are layered:
//! 1. Built-in defaults (the values the display recorder was tuned with)
//! 2. A TOML file (`config/segtemp.toml` unless another path is given)
//! 3. Environment variables prefixed with `SEGTEMP_`, nested keys split on `__`
//!
//! # Example
//! ```no_run
//! use segtemp::config::MonitorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::load()?;
//! config.validate()?;
//! println!("gap threshold: {}", config.decoder.gap_threshold);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppResult, MonitorError};

/// Default configuration file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/segtemp.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "SEGTEMP_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// Pin sampling settings
    pub sampler: SamplerConfig,
    /// Frame decoding settings
    pub decoder: DecoderConfig,
    /// Debounce settings
    pub stability: StabilityConfig,
    /// Persistence settings
    pub storage: StorageConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    pub log_format: String,
    /// Iterations between statistics summaries (0 disables them)
    pub summary_interval: u64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            summary_interval: 100,
        }
    }
}

/// Which sampler implementation drives the capture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerBackend {
    /// Linux sysfs GPIO value files
    Sysfs,
    /// Cyclic replay of a recorded capture file
    Replay,
    /// Synthetic display showing a fixed value
    Simulated,
}

/// Pin sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sampler implementation
    pub backend: SamplerBackend,
    /// GPIO line carrying the display clock
    pub clock_pin: u32,
    /// GPIO line carrying the segment data
    pub data_pin: u32,
    /// Samples per capture window
    pub sample_count: usize,
    /// Root of the sysfs GPIO tree
    pub gpio_root: PathBuf,
    /// Capture file for the replay backend
    pub replay_path: Option<PathBuf>,
    /// Displayed value for the simulated backend
    pub simulated_value: u16,
    /// Pause after the first failed capture, doubled per consecutive failure
    pub retry_delay_ms: u64,
    /// Upper bound for the pause between failed captures
    pub max_retry_delay_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            backend: SamplerBackend::Sysfs,
            clock_pin: 2,
            data_pin: 3,
            sample_count: 100_000,
            gpio_root: PathBuf::from("/sys/class/gpio"),
            replay_path: None,
            simulated_value: 245,
            retry_delay_ms: 10,
            max_retry_delay_ms: 5_000,
        }
    }
}

/// Frame decoding configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Consecutive clock-low samples that mark the line as idle
    pub gap_threshold: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 1000,
        }
    }
}

/// Debounce configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Consecutive identical frames required before a value is committed
    pub threshold: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File overwritten with the latest committed value
    pub current_path: PathBuf,
    /// File appended with every committed change
    pub log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            current_path: PathBuf::from("/home/pi/current_temperature.txt"),
            log_path: PathBuf::from("/home/pi/temperature_log.txt"),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from `config/segtemp.toml` and environment variables
    ///
    /// Environment variables override the file with prefix `SEGTEMP_`.
    /// Example: `SEGTEMP_STABILITY__THRESHOLD=5`
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(MonitorConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = self.application.log_level.to_lowercase();
        if !valid_levels.contains(&level.as_str()) {
            return Err(MonitorError::Validation(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        let format = self.application.log_format.to_lowercase();
        if !valid_formats.contains(&format.as_str()) {
            return Err(MonitorError::Validation(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        if self.decoder.gap_threshold == 0 {
            return Err(MonitorError::Validation(
                "decoder.gap_threshold must be at least 1".to_string(),
            ));
        }

        if self.sampler.sample_count <= self.decoder.gap_threshold {
            return Err(MonitorError::Validation(format!(
                "sampler.sample_count ({}) must exceed decoder.gap_threshold ({})",
                self.sampler.sample_count, self.decoder.gap_threshold
            )));
        }

        if self.stability.threshold == 0 {
            return Err(MonitorError::Validation(
                "stability.threshold must be at least 1".to_string(),
            ));
        }

        if self.sampler.clock_pin == self.sampler.data_pin {
            return Err(MonitorError::Validation(format!(
                "sampler.clock_pin and sampler.data_pin are both {}",
                self.sampler.clock_pin
            )));
        }

        if self.sampler.simulated_value > 999 {
            return Err(MonitorError::Validation(format!(
                "sampler.simulated_value {} does not fit on three digits",
                self.sampler.simulated_value
            )));
        }

        if self.sampler.retry_delay_ms > self.sampler.max_retry_delay_ms {
            return Err(MonitorError::Validation(format!(
                "sampler.retry_delay_ms ({}) exceeds sampler.max_retry_delay_ms ({})",
                self.sampler.retry_delay_ms, self.sampler.max_retry_delay_ms
            )));
        }

        if self.sampler.backend == SamplerBackend::Replay && self.sampler.replay_path.is_none() {
            return Err(MonitorError::Validation(
                "sampler.replay_path is required for the replay backend".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| MonitorError::Validation(e.to_string()))
    }
}

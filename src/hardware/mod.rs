//! Hardware access
//!
//! Line sampling capability plus its sysfs and simulated implementations.

pub mod capabilities;
pub mod mock;
pub mod sysfs;

pub use capabilities::{LinePins, LineSampler, PinId};
pub use mock::{ReplaySampler, SimulatedDisplay};
pub use sysfs::SysfsSampler;

use crate::capture::CaptureWindow;
use crate::config::{MonitorConfig, SamplerBackend};
use crate::error::{AppResult, MonitorError};

/// Build the sampler selected by `config.sampler.backend`.
pub fn open_sampler(config: &MonitorConfig) -> AppResult<Box<dyn LineSampler>> {
    let pins = LinePins::new(config.sampler.clock_pin, config.sampler.data_pin);
    match config.sampler.backend {
        SamplerBackend::Sysfs => Ok(Box::new(SysfsSampler::open(
            &config.sampler.gpio_root,
            pins,
        )?)),
        SamplerBackend::Replay => {
            let path = config.sampler.replay_path.as_ref().ok_or_else(|| {
                MonitorError::Validation(
                    "sampler.replay_path is required for the replay backend".to_string(),
                )
            })?;
            Ok(Box::new(ReplaySampler::new(CaptureWindow::load(path)?, pins)))
        }
        SamplerBackend::Simulated => Ok(Box::new(SimulatedDisplay::new(
            config.sampler.simulated_value,
            pins,
            config.decoder.gap_threshold,
        )?)),
    }
}

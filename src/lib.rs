//! # segtemp
//!
//! Reads the temperature shown on a three-digit seven-segment display by
//! tapping the clock and data lines between the display driver and its
//! shift registers. The crate turns raw line samples into a debounced value
//! and keeps that value in a small text file for other programs to pick up.
//!
//! ## Crate Structure
//!
//! - **`capture`**: `CaptureWindow` (one burst of clock/data samples), the
//!   capture file format, and synthetic waveforms for tests and simulation.
//! - **`config`**: `MonitorConfig`, loaded from defaults, a TOML file and
//!   `SEGTEMP_*` environment variables.
//! - **`decode`**: frame synchronisation, bit extraction, digit lookup and
//!   value assembly. Produces a value or a `FrameRejection`.
//! - **`error`**: the crate-wide `MonitorError` and `AppResult`.
//! - **`hardware`**: the `LineSampler` capability with sysfs, replay and
//!   simulated implementations.
//! - **`logging`**: `tracing` subscriber setup.
//! - **`monitor`**: the acquisition loop tying everything together.
//! - **`stability`**: the run-length debouncer deciding when a value is
//!   trusted.
//! - **`storage`**: `ReadingSink` and the file sink for committed readings.

pub mod capture;
pub mod config;
pub mod decode;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod monitor;
pub mod stability;
pub mod storage;

pub use capture::{CaptureWindow, SamplePair};
pub use config::MonitorConfig;
pub use decode::{FrameDecoder, FrameRejection};
pub use error::{AppResult, MonitorError};
pub use monitor::{process_window, IterationOutcome, Monitor, MonitorStats};
pub use stability::{StabilityDecision, StabilityFilter};
pub use storage::{FileSink, ReadingSink};

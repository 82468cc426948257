//! Custom error types for the application.
//!
//! This module defines the primary error type, `MonitorError`. Using the `thiserror`
//! crate, it gives the monitor one consistent way to report the things that can go
//! wrong outside the decode path: configuration, pin sampling, capture files and the
//! persistence sink.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps errors from `figment`, typically parse or type errors in the
//!   TOML file or in `SEGTEMP_` environment overrides.
//! - **`Validation`**: Semantic errors in a configuration that parsed fine but is
//!   logically wrong (e.g. a gap threshold larger than the capture window).
//! - **`Io`**: Wraps `std::io::Error` for file I/O without a more specific context.
//! - **`Sampler`**: A pin could not be read. The monitor loop logs it and retries on
//!   the next iteration.
//! - **`CaptureFormat`**: A recorded capture file contains a malformed line.
//! - **`Storage`**: The current-value or log artifact could not be written or read.
//! - **`Logging`**: The tracing subscriber could not be installed.
//!
//! Frame-level problems (no sync, short frames, unknown digit shapes) are *not*
//! errors; they are routine outcomes described by
//! [`FrameRejection`](crate::decode::FrameRejection).

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, MonitorError>;

/// Errors raised outside the decode path.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration could not be loaded or extracted.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration loaded but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// Uncategorised I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sampled line could not be read.
    #[error("Failed to sample pin {pin}: {source}")]
    Sampler {
        /// Pin that failed.
        pin: u32,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// A capture file line could not be parsed.
    #[error("Malformed capture data at line {line}: {message}")]
    CaptureFormat {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A persistence artifact could not be written or read.
    #[error("Storage error for '{}': {source}", path.display())]
    Storage {
        /// Artifact path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// Tracing could not be initialised.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl From<figment::Error> for MonitorError {
    fn from(err: figment::Error) -> Self {
        MonitorError::Config(Box::new(err))
    }
}

impl MonitorError {
    /// Whether the monitor loop can keep running after this error.
    ///
    /// Sampling and storage failures are transient from the loop's point of view;
    /// configuration and setup failures are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MonitorError::Sampler { .. } | MonitorError::Storage { .. } | MonitorError::Io(_)
        )
    }
}

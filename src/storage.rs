//! Persistence of committed readings.
//!
//! Two artifacts are kept, both holding a decimal value followed by `\n`:
//!
//! - the *current* file, overwritten with every committed value
//! - the *log* file, appended with every committed value
//!
//! Readers (such as a controller that adjusts the set point) only ever need
//! the current file; see [`read_current`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::StorageConfig;
use crate::error::{AppResult, MonitorError};

/// Destination for committed readings.
pub trait ReadingSink {
    /// Persist a newly committed value
    fn persist(&mut self, value: u16) -> AppResult<()>;
}

impl<T: ReadingSink + ?Sized> ReadingSink for Box<T> {
    fn persist(&mut self, value: u16) -> AppResult<()> {
        (**self).persist(value)
    }
}

/// Sink writing the current-value file and the change log.
#[derive(Debug, Clone)]
pub struct FileSink {
    current_path: PathBuf,
    log_path: PathBuf,
}

impl FileSink {
    /// Sink writing to the given paths
    pub fn new(current_path: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            current_path: current_path.into(),
            log_path: log_path.into(),
        }
    }

    /// Sink for the configured paths
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.current_path, &config.log_path)
    }

    /// Current-value file
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Change log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Replace the current file through a sibling temp file so readers never
    /// see it empty or half written.
    fn write_current(&self, line: &str) -> AppResult<()> {
        let staging = staging_path(&self.current_path);
        fs::write(&staging, line)
            .and_then(|()| fs::rename(&staging, &self.current_path))
            .map_err(|source| {
                let _ = fs::remove_file(&staging);
                MonitorError::Storage {
                    path: self.current_path.clone(),
                    source,
                }
            })
    }

    fn append_log(&self, line: &str) -> AppResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|source| MonitorError::Storage {
                path: self.log_path.clone(),
                source,
            })
    }
}

impl ReadingSink for FileSink {
    fn persist(&mut self, value: u16) -> AppResult<()> {
        let line = format!("{value}\n");
        self.write_current(&line)?;
        self.append_log(&line)?;
        info!(
            value,
            current = %self.current_path.display(),
            log = %self.log_path.display(),
            "Persisted reading"
        );
        Ok(())
    }
}

/// `.<name>.tmp` next to `path`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// In-memory sink, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Every persisted value, in order
    pub values: Vec<u16>,
}

impl ReadingSink for MemorySink {
    fn persist(&mut self, value: u16) -> AppResult<()> {
        self.values.push(value);
        Ok(())
    }
}

/// Read the value held in a current-value file.
pub fn read_current(path: impl AsRef<Path>) -> AppResult<u16> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MonitorError::Storage {
        path: path.to_path_buf(),
        source,
    })?;
    text.trim().parse().map_err(|e| MonitorError::Storage {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("'{}' is not a reading: {e}", text.trim()),
        ),
    })
}

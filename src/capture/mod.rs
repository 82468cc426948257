//! Capture windows.
//!
//! A [`CaptureWindow`] is the fixed-length run of `(clock, data)` polls that one
//! monitor iteration decodes. Windows are filled fresh every iteration and never
//! carried over.
//!
//! Windows can also be saved to and loaded from a plain text capture file, one
//! sample per line:
//!
//! ```text
//! # clock data
//! 0 0
//! 1 1
//! 0 1
//! ```

pub mod synth;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{AppResult, MonitorError};
use crate::hardware::{LinePins, LineSampler};

/// One poll of both lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplePair {
    /// Clock level
    pub clock: bool,
    /// Data level
    pub data: bool,
}

impl SamplePair {
    /// Build a pair from levels
    pub const fn new(clock: bool, data: bool) -> Self {
        Self { clock, data }
    }
}

/// Ordered samples of one capture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureWindow {
    samples: Vec<SamplePair>,
}

impl CaptureWindow {
    /// Wrap already-collected samples
    pub fn new(samples: Vec<SamplePair>) -> Self {
        Self { samples }
    }

    /// Build a window from separate clock and data level slices.
    ///
    /// The window is as long as the shorter slice.
    pub fn from_levels(clock: &[bool], data: &[bool]) -> Self {
        let samples = clock
            .iter()
            .zip(data)
            .map(|(&clock, &data)| SamplePair { clock, data })
            .collect();
        Self { samples }
    }

    /// Fill a window by polling `sampler` `sample_count` times.
    ///
    /// Each poll reads the clock line first, then the data line.
    pub fn capture<S>(sampler: &mut S, pins: LinePins, sample_count: usize) -> AppResult<Self>
    where
        S: LineSampler + ?Sized,
    {
        let mut samples = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            let clock = sampler.read(pins.clock)?;
            let data = sampler.read(pins.data)?;
            samples.push(SamplePair { clock, data });
        }
        Ok(Self { samples })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in capture order
    pub fn samples(&self) -> &[SamplePair] {
        &self.samples
    }

    /// Clock level at `index`, if in range
    pub fn clock(&self, index: usize) -> Option<bool> {
        self.samples.get(index).map(|s| s.clock)
    }

    /// Data level at `index`, if in range
    pub fn data(&self, index: usize) -> Option<bool> {
        self.samples.get(index).map(|s| s.data)
    }

    /// Parse a capture file from a reader.
    pub fn read_from<R: BufRead>(reader: R) -> AppResult<Self> {
        let mut samples = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let (Some(clock), Some(data), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(MonitorError::CaptureFormat {
                    line: line_no,
                    message: format!("expected two levels, got '{trimmed}'"),
                });
            };
            samples.push(SamplePair {
                clock: parse_level(clock, line_no)?,
                data: parse_level(data, line_no)?,
            });
        }
        Ok(Self { samples })
    }

    /// Load a capture file from disk
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MonitorError::Storage {
            path: path.to_path_buf(),
            source,
        })?;
        let window = Self::read_from(BufReader::new(file))?;
        debug!(path = %path.display(), samples = window.len(), "Loaded capture file");
        Ok(window)
    }

    /// Write the window in capture file format
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "# clock data")?;
        for sample in &self.samples {
            writeln!(writer, "{} {}", u8::from(sample.clock), u8::from(sample.data))?;
        }
        writer.flush()
    }

    /// Save the window to a capture file
    pub fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let storage_err = |source| MonitorError::Storage {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(storage_err)?;
        self.write_to(BufWriter::new(file)).map_err(storage_err)
    }
}

fn parse_level(token: &str, line: usize) -> AppResult<bool> {
    match token {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(MonitorError::CaptureFormat {
            line,
            message: format!("invalid level '{other}', expected 0 or 1"),
        }),
    }
}

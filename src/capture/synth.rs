//! Synthetic waveforms.
//!
//! Builds the clock/data waveform a display controller would emit, for the
//! simulated sampler, tests and benchmarks.
//!
//! Each bit is one clock pulse: `half_period` high samples followed by
//! `half_period` low samples, with the data line holding the bit for the
//! whole pulse so it is valid on the sample right after the falling edge.

use super::{CaptureWindow, SamplePair};
use crate::decode::digit::{DigitTable, SegmentGroup, DEFAULT_TABLE};
use crate::error::{AppResult, MonitorError};

/// Incremental waveform builder.
#[derive(Debug, Clone)]
pub struct WaveformBuilder {
    half_period: usize,
    samples: Vec<SamplePair>,
}

impl WaveformBuilder {
    /// Start an empty waveform; `half_period` is clamped to at least 1.
    pub fn new(half_period: usize) -> Self {
        Self {
            half_period: half_period.max(1),
            samples: Vec::new(),
        }
    }

    /// Append `len` idle samples (clock low, data low)
    pub fn idle(mut self, len: usize) -> Self {
        self.samples.extend(std::iter::repeat(SamplePair::new(false, false)).take(len));
        self
    }

    /// Append `len` samples with the clock held high
    pub fn high(mut self, len: usize) -> Self {
        self.samples.extend(std::iter::repeat(SamplePair::new(true, false)).take(len));
        self
    }

    /// Append one clocked bit
    pub fn bit(mut self, bit: bool) -> Self {
        let high = SamplePair::new(true, bit);
        let low = SamplePair::new(false, bit);
        self.samples.extend(std::iter::repeat(high).take(self.half_period));
        self.samples.extend(std::iter::repeat(low).take(self.half_period));
        self
    }

    /// Append clocked bits in order
    pub fn bits<I: IntoIterator<Item = bool>>(self, bits: I) -> Self {
        bits.into_iter().fold(self, Self::bit)
    }

    /// Append the 7 bits of a segment group
    pub fn segments(self, group: SegmentGroup) -> Self {
        self.bits(group.bits())
    }

    /// Append the segment group showing `digit` (0-9) in the default table
    pub fn digit(self, digit: u8) -> AppResult<Self> {
        let group = DigitTable::new(DEFAULT_TABLE)
            .pattern_for(digit)
            .ok_or_else(|| MonitorError::Validation(format!("no segment pattern for {digit}")))?;
        Ok(self.segments(group))
    }

    /// Append the 21 bits showing a three-digit value, most significant first
    pub fn display(self, value: u16) -> AppResult<Self> {
        if value > 999 {
            return Err(MonitorError::Validation(format!(
                "{value} does not fit on three digits"
            )));
        }
        // value <= 999 so every digit fits in a u8
        let digits = [value / 100, (value / 10) % 10, value % 10];
        digits
            .into_iter()
            .try_fold(self, |builder, d| builder.digit(d as u8))
    }

    /// Idle gap, the 21 bits for `value`, closing idle gap
    pub fn frame(self, value: u16, gap: usize) -> AppResult<Self> {
        Ok(self.idle(gap).display(value)?.idle(gap))
    }

    /// Pad with idle samples up to `len` total (no-op if already longer)
    pub fn pad_to(self, len: usize) -> Self {
        let missing = len.saturating_sub(self.samples.len());
        self.idle(missing)
    }

    /// Current length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing has been appended yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Finish the waveform
    pub fn build(self) -> CaptureWindow {
        CaptureWindow::new(self.samples)
    }
}

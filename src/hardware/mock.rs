//! Mock Hardware Implementations
//!
//! Simulated samplers for running the monitor without a display attached.
//!
//! # Available Mocks
//!
//! - `ReplaySampler` - plays back a recorded [`CaptureWindow`] in a loop
//! - `SimulatedDisplay` - a display controller permanently showing one value

use crate::capture::synth::WaveformBuilder;
use crate::capture::{CaptureWindow, SamplePair};
use crate::error::{AppResult, MonitorError};
use crate::hardware::capabilities::{LinePins, LineSampler, PinId};

// =============================================================================
// ReplaySampler - Recorded Waveform Playback
// =============================================================================

/// Replays a recorded waveform, wrapping around at the end.
///
/// Each line keeps its own cursor, so the usual "clock then data" poll order
/// reproduces the recorded pairs exactly.
///
/// # Example
///
/// ```rust,ignore
/// let window = CaptureWindow::load("captures/boot.cap")?;
/// let mut sampler = ReplaySampler::new(window, LinePins::new(2, 3));
/// let level = sampler.read(2)?;
/// ```
pub struct ReplaySampler {
    recording: CaptureWindow,
    pins: LinePins,
    clock_cursor: usize,
    data_cursor: usize,
}

impl ReplaySampler {
    /// Replay `recording`, answering reads for `pins`
    pub fn new(recording: CaptureWindow, pins: LinePins) -> Self {
        Self {
            recording,
            pins,
            clock_cursor: 0,
            data_cursor: 0,
        }
    }

    /// Length of one playback cycle in samples
    pub fn cycle_len(&self) -> usize {
        self.recording.len()
    }

    fn next(recording: &CaptureWindow, cursor: &mut usize) -> Option<SamplePair> {
        let pair = recording.samples().get(*cursor).copied()?;
        *cursor = (*cursor + 1) % recording.len();
        Some(pair)
    }
}

impl LineSampler for ReplaySampler {
    fn read(&mut self, pin: PinId) -> AppResult<bool> {
        let empty = || MonitorError::Sampler {
            pin,
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "recording is empty"),
        };

        if pin == self.pins.clock {
            Self::next(&self.recording, &mut self.clock_cursor)
                .map(|pair| pair.clock)
                .ok_or_else(empty)
        } else if pin == self.pins.data {
            Self::next(&self.recording, &mut self.data_cursor)
                .map(|pair| pair.data)
                .ok_or_else(empty)
        } else {
            Err(MonitorError::Sampler {
                pin,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "pin is not part of the recording",
                ),
            })
        }
    }
}

// =============================================================================
// SimulatedDisplay - Synthetic Display Controller
// =============================================================================

/// Idle samples added on top of the gap threshold between simulated frames.
const IDLE_MARGIN: usize = 200;

/// Samples the clock stays high (and then low) for each simulated bit.
const HALF_PERIOD: usize = 2;

/// A display controller showing a fixed three-digit value.
///
/// One cycle is an idle gap longer than `gap_threshold` followed by the 21
/// clocked segment bits; the cycle repeats forever.
pub struct SimulatedDisplay {
    value: u16,
    inner: ReplaySampler,
}

impl SimulatedDisplay {
    /// Simulate a display showing `value` (0..=999)
    pub fn new(value: u16, pins: LinePins, gap_threshold: usize) -> AppResult<Self> {
        let cycle = WaveformBuilder::new(HALF_PERIOD)
            .idle(gap_threshold + IDLE_MARGIN)
            .display(value)?
            .build();
        Ok(Self {
            value,
            inner: ReplaySampler::new(cycle, pins),
        })
    }

    /// Value shown on the simulated display
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl LineSampler for SimulatedDisplay {
    fn read(&mut self, pin: PinId) -> AppResult<bool> {
        self.inner.read(pin)
    }
}

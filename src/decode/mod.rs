//! Waveform-to-value decoding.
//!
//! One capture window goes through four stages:
//!
//! 1. [`sync::find_sync`] - locate the end of the idle gap before a frame
//! 2. [`extract::extract_frame`] - latch 21 data bits on clock falling edges
//! 3. [`digit::DigitTable::decode`] - map each 7-bit group to a digit
//! 4. [`assemble::assemble`] - weight the three digits into one value
//!
//! Every stage either passes its result on or stops with a [`FrameRejection`];
//! a rejected window never yields a number.

pub mod assemble;
pub mod digit;
pub mod extract;
pub mod sync;

pub use assemble::assemble;
pub use digit::{DigitPattern, DigitTable, SegmentGroup, DEFAULT_TABLE};
pub use extract::{extract_frame, Frame, FRAME_BITS, FRAME_DIGITS};
pub use sync::find_sync;

use thiserror::Error;
use tracing::debug;

use crate::capture::CaptureWindow;
use crate::config::DecoderConfig;

/// Why a capture window produced no value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRejection {
    /// No clock-low run reached the gap threshold
    #[error("no idle gap found in capture window")]
    NoSync,

    /// The window ended before the closing idle gap
    #[error("window ended mid-frame after {bits} bits")]
    Truncated {
        /// Bits latched before the window ran out
        bits: usize,
    },

    /// The closing idle gap came before all bits were latched
    #[error("frame closed after only {bits} of 21 bits")]
    ShortFrame {
        /// Bits latched before the gap
        bits: usize,
    },

    /// A segment group matched no table row
    #[error("unrecognized segment pattern in digit {position}")]
    UnrecognizedDigit {
        /// Digit position, 0 = most significant
        position: usize,
    },
}

/// Runs the full decode pipeline over capture windows.
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    gap_threshold: usize,
    table: DigitTable,
}

impl FrameDecoder {
    /// Decoder with an explicit gap threshold and digit table
    pub fn new(gap_threshold: usize, table: DigitTable) -> Self {
        Self {
            gap_threshold,
            table,
        }
    }

    /// Decoder using the configured gap threshold and the default table
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.gap_threshold, DigitTable::default())
    }

    /// Consecutive low samples that mark the line as idle
    pub fn gap_threshold(&self) -> usize {
        self.gap_threshold
    }

    /// Decode the first complete frame of `window`
    ///
    /// Clock edges after the 21st bit are ignored and reported at `debug`.
    pub fn decode(&self, window: &CaptureWindow) -> Result<u16, FrameRejection> {
        let frame = self.extract(window)?;
        if frame.surplus_edges() > 0 {
            debug!(
                surplus_edges = frame.surplus_edges(),
                frame_end = frame.end(),
                "Ignored clock edges beyond a full frame"
            );
        }
        assemble(&frame, &self.table)
    }

    /// Synchronise and extract the first frame of `window` without decoding digits
    pub fn extract(&self, window: &CaptureWindow) -> Result<Frame, FrameRejection> {
        let start = find_sync(window, self.gap_threshold).ok_or(FrameRejection::NoSync)?;
        extract_frame(window, start, self.gap_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::synth::WaveformBuilder;
    use tracing_test::traced_test;

    const GAP: usize = 50;

    fn decoder() -> FrameDecoder {
        FrameDecoder::new(GAP, DigitTable::default())
    }

    #[test]
    fn test_decodes_framed_value() {
        let window = WaveformBuilder::new(3).frame(245, GAP).unwrap().build();
        assert_eq!(decoder().decode(&window), Ok(245));
    }

    #[test]
    fn test_leading_activity_is_skipped() {
        // A partial frame before the first idle gap must not be decoded
        let window = WaveformBuilder::new(2)
            .bits([true, false, true, true])
            .frame(987, GAP)
            .unwrap()
            .build();
        assert_eq!(decoder().decode(&window), Ok(987));
    }

    #[test]
    #[traced_test]
    fn test_surplus_edges_are_logged_and_frame_kept() {
        let window = WaveformBuilder::new(2)
            .idle(GAP)
            .display(245)
            .unwrap()
            .bits([true, false, true])
            .idle(GAP)
            .build();
        assert_eq!(decoder().decode(&window), Ok(245));
        assert!(logs_contain("Ignored clock edges beyond a full frame"));
        assert!(logs_contain("surplus_edges=3"));
    }

    #[test]
    #[traced_test]
    fn test_exact_frame_logs_no_surplus() {
        let window = WaveformBuilder::new(2).frame(245, GAP).unwrap().build();
        assert_eq!(decoder().decode(&window), Ok(245));
        assert!(!logs_contain("beyond a full frame"));
    }

    #[test]
    fn test_no_sync() {
        let window = WaveformBuilder::new(1)
            .idle(GAP - 1)
            .high(1)
            .idle(GAP - 1)
            .build();
        assert_eq!(decoder().decode(&window), Err(FrameRejection::NoSync));
    }

    #[test]
    fn test_unrecognized_digit() {
        let window = WaveformBuilder::new(1)
            .idle(GAP)
            .digit(1)
            .unwrap()
            .segments(SegmentGroup::from_levels([1, 0, 0, 0, 0, 0, 1]))
            .digit(3)
            .unwrap()
            .idle(GAP)
            .build();
        assert_eq!(
            decoder().decode(&window),
            Err(FrameRejection::UnrecognizedDigit { position: 1 })
        );
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            FrameRejection::ShortFrame { bits: 14 }.to_string(),
            "frame closed after only 14 of 21 bits"
        );
        assert_eq!(
            FrameRejection::NoSync.to_string(),
            "no idle gap found in capture window"
        );
    }
}

//! Segment bit extraction.
//!
//! Walks the capture window from the sync point, latching the data line on
//! every clock falling edge until the clock has been low for a full idle gap.

use super::digit::{SegmentGroup, SEGMENTS};
use super::FrameRejection;
use crate::capture::CaptureWindow;

/// Digits per frame, most significant first.
pub const FRAME_DIGITS: usize = 3;

/// Bits per frame.
pub const FRAME_BITS: usize = FRAME_DIGITS * SEGMENTS;

/// A complete frame: three segment groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    groups: [SegmentGroup; FRAME_DIGITS],
    end: usize,
    surplus_edges: usize,
}

impl Frame {
    /// Build a frame from exactly [`FRAME_BITS`] bits
    pub fn from_bits(bits: &[bool]) -> Option<Self> {
        if bits.len() != FRAME_BITS {
            return None;
        }
        let mut groups = [SegmentGroup::default(); FRAME_DIGITS];
        for (group, chunk) in groups.iter_mut().zip(bits.chunks_exact(SEGMENTS)) {
            *group = SegmentGroup::from_slice(chunk)?;
        }
        Some(Self {
            groups,
            end: 0,
            surplus_edges: 0,
        })
    }

    /// Build a frame from three segment groups
    pub fn from_groups(groups: [SegmentGroup; FRAME_DIGITS]) -> Self {
        Self {
            groups,
            end: 0,
            surplus_edges: 0,
        }
    }

    /// Segment groups, most significant digit first
    pub fn groups(&self) -> &[SegmentGroup; FRAME_DIGITS] {
        &self.groups
    }

    /// Window index where the closing idle gap was detected
    pub fn end(&self) -> usize {
        self.end
    }

    /// Falling edges seen after the frame was already full
    pub fn surplus_edges(&self) -> usize {
        self.surplus_edges
    }
}

/// Extract one frame starting at the sync point `start`.
///
/// On each falling edge (clock high at `i`, low at `i + 1`) the data level at
/// `i + 1` is appended; at most [`FRAME_BITS`] bits are kept. Extraction ends
/// when the clock has been low for `gap_threshold` consecutive samples.
pub fn extract_frame(
    window: &CaptureWindow,
    start: usize,
    gap_threshold: usize,
) -> Result<Frame, FrameRejection> {
    let samples = window.samples().get(start..).unwrap_or_default();
    let mut bits = Vec::with_capacity(FRAME_BITS);
    let mut surplus_edges = 0usize;
    let mut low_run = 0usize;

    for (offset, pair) in samples.windows(2).enumerate() {
        let (here, next) = (pair[0], pair[1]);

        if here.clock && !next.clock {
            if bits.len() < FRAME_BITS {
                bits.push(next.data);
            } else {
                surplus_edges += 1;
            }
        }

        if here.clock {
            low_run = 0;
            continue;
        }

        low_run += 1;
        if low_run >= gap_threshold {
            let mut frame =
                Frame::from_bits(&bits).ok_or(FrameRejection::ShortFrame { bits: bits.len() })?;
            frame.end = start + offset;
            frame.surplus_edges = surplus_edges;
            return Ok(frame);
        }
    }

    Err(FrameRejection::Truncated { bits: bits.len() })
}

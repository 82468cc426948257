//! Frame synchronisation.

use crate::capture::CaptureWindow;

/// Find where active-frame scanning should begin.
///
/// Counts consecutive clock-low samples; once a run reaches `gap_threshold`
/// the line is idle, and the sync point follows the run until the clock goes
/// high again. The returned index is the last idle sample before the first
/// active edge (or the last sample of the window if the clock never rises).
///
/// Returns `None` if no low run reaches `gap_threshold`.
pub fn find_sync(window: &CaptureWindow, gap_threshold: usize) -> Option<usize> {
    let mut low_run = 0usize;
    let mut sync = None;

    for (i, sample) in window.samples().iter().enumerate() {
        match sync {
            None if sample.clock => low_run = 0,
            None => {
                low_run += 1;
                if low_run >= gap_threshold {
                    sync = Some(i);
                }
            }
            Some(_) if sample.clock => break,
            Some(_) => sync = Some(i),
        }
    }

    sync
}

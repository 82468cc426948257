//! The acquisition loop.
//!
//! Each iteration captures one window, decodes it, feeds the value through
//! the [`StabilityFilter`] and persists the value when the filter commits it.
//! Everything runs on the calling thread; the next capture starts only after
//! the previous reading has been handled.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::capture::CaptureWindow;
use crate::config::{MonitorConfig, SamplerConfig};
use crate::decode::{FrameDecoder, FrameRejection};
use crate::error::AppResult;
use crate::hardware::{LinePins, LineSampler};
use crate::stability::{StabilityDecision, StabilityFilter};
use crate::storage::ReadingSink;

/// What happened to one capture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The window produced no value
    Rejected(FrameRejection),
    /// The display was dark (decoded to 0); stability state untouched
    Blank,
    /// Valid value, not yet repeated often enough
    Accumulating {
        /// Current candidate
        candidate: u16,
        /// Consecutive observations so far
        count: u32,
    },
    /// Stable value that was already persisted
    Holding(u16),
    /// New stable value, persisted
    Committed(u16),
    /// New stable value whose persistence failed
    SinkFailed(u16),
}

impl IterationOutcome {
    /// Decoded value, if the window yielded one
    pub fn value(&self) -> Option<u16> {
        match *self {
            Self::Accumulating { candidate, .. } => Some(candidate),
            Self::Holding(v) | Self::Committed(v) | Self::SinkFailed(v) => Some(v),
            Self::Rejected(_) | Self::Blank => None,
        }
    }
}

impl fmt::Display for IterationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Blank => write!(f, "blank display"),
            Self::Accumulating { candidate, count } => {
                write!(f, "{candidate} (seen {count} times)")
            }
            Self::Holding(v) => write!(f, "{v} (unchanged)"),
            Self::Committed(v) => write!(f, "{v} (committed)"),
            Self::SinkFailed(v) => write!(f, "{v} (not persisted)"),
        }
    }
}

/// Decode one window and debounce the result.
///
/// Never touches a sink: a `Committed` outcome means the filter has signalled
/// the value for persistence. Blank displays and rejected windows leave the
/// filter untouched.
pub fn process_window(
    window: &CaptureWindow,
    decoder: &FrameDecoder,
    filter: &mut StabilityFilter,
) -> IterationOutcome {
    let value = match decoder.decode(window) {
        Ok(value) => value,
        Err(reason) => return IterationOutcome::Rejected(reason),
    };
    if value < 1 {
        return IterationOutcome::Blank;
    }

    match filter.observe(value) {
        StabilityDecision::Accumulating { candidate, count } => {
            IterationOutcome::Accumulating { candidate, count }
        }
        StabilityDecision::Holding(v) => IterationOutcome::Holding(v),
        StabilityDecision::Commit(v) => IterationOutcome::Committed(v),
    }
}

/// Running counters for a monitor session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Iterations started
    pub iterations: u64,
    /// Windows that yielded a value (blank included)
    pub frames_decoded: u64,
    /// Windows without an idle gap
    pub no_sync: u64,
    /// Windows ending mid-frame
    pub truncated: u64,
    /// Frames closed before 21 bits
    pub short_frames: u64,
    /// Frames with an unrecognized digit
    pub unrecognized: u64,
    /// Frames decoding to 0
    pub blanks: u64,
    /// Values persisted
    pub commits: u64,
    /// Values whose persistence failed
    pub sink_failures: u64,
    /// Captures aborted by the sampler
    pub sampler_errors: u64,
}

impl MonitorStats {
    /// Account for one outcome
    pub fn record(&mut self, outcome: &IterationOutcome) {
        match outcome {
            IterationOutcome::Rejected(reason) => match reason {
                FrameRejection::NoSync => self.no_sync += 1,
                FrameRejection::Truncated { .. } => self.truncated += 1,
                FrameRejection::ShortFrame { .. } => self.short_frames += 1,
                FrameRejection::UnrecognizedDigit { .. } => self.unrecognized += 1,
            },
            IterationOutcome::Blank => {
                self.frames_decoded += 1;
                self.blanks += 1;
            }
            IterationOutcome::Accumulating { .. } | IterationOutcome::Holding(_) => {
                self.frames_decoded += 1;
            }
            IterationOutcome::Committed(_) => {
                self.frames_decoded += 1;
                self.commits += 1;
            }
            IterationOutcome::SinkFailed(_) => {
                self.frames_decoded += 1;
                self.sink_failures += 1;
            }
        }
    }

    /// All rejected windows
    pub fn rejections(&self) -> u64 {
        self.no_sync + self.truncated + self.short_frames + self.unrecognized
    }
}

/// Pause schedule while the sampler keeps failing.
///
/// The delay starts at `initial` and doubles with every consecutive failure up
/// to `max`. Only failures 1, 2, 4, 8, ... are worth a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBackoff {
    initial: Duration,
    max: Duration,
    failures: u64,
}

impl RetryBackoff {
    /// Backoff from `initial` up to `max`
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            failures: 0,
        }
    }

    /// Backoff from the sampler's configured delays
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.retry_delay_ms),
            Duration::from_millis(config.max_retry_delay_ms),
        )
    }

    /// Count a failure and return the pause before the next capture
    pub fn failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let doublings = u32::try_from(self.failures - 1).unwrap_or(u32::MAX).min(16);
        self.initial.saturating_mul(1 << doublings).min(self.max)
    }

    /// Whether the current failure should be logged
    pub fn should_log(&self) -> bool {
        self.failures.is_power_of_two()
    }

    /// Clear the failure streak, returning its length
    pub fn reset(&mut self) -> u64 {
        std::mem::take(&mut self.failures)
    }

    /// Consecutive failures so far
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

/// Owns the sampler, sink and debounce state of one acquisition session.
pub struct Monitor<S, K> {
    sampler: S,
    sink: K,
    pins: LinePins,
    sample_count: usize,
    decoder: FrameDecoder,
    filter: StabilityFilter,
    stats: MonitorStats,
    summary_interval: u64,
    backoff: RetryBackoff,
}

impl<S: LineSampler, K: ReadingSink> Monitor<S, K> {
    /// Monitor configured from `config`, reading through `sampler` and
    /// persisting to `sink`
    pub fn new(config: &MonitorConfig, sampler: S, sink: K) -> Self {
        Self {
            sampler,
            sink,
            pins: LinePins::new(config.sampler.clock_pin, config.sampler.data_pin),
            sample_count: config.sampler.sample_count,
            decoder: FrameDecoder::from_config(&config.decoder),
            filter: StabilityFilter::new(config.stability.threshold),
            stats: MonitorStats::default(),
            summary_interval: config.application.summary_interval,
            backoff: RetryBackoff::from_config(&config.sampler),
        }
    }

    /// Replace the retry schedule used after sampler failures
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Capture, decode, debounce and (on commit) persist one window.
    ///
    /// Only sampler failures are returned as errors. A failed write is logged,
    /// counted and reported as [`IterationOutcome::SinkFailed`]; the commit is
    /// rolled back so the next stable observation retries it.
    pub fn run_iteration(&mut self) -> AppResult<IterationOutcome> {
        self.stats.iterations += 1;

        let window = match CaptureWindow::capture(&mut self.sampler, self.pins, self.sample_count)
        {
            Ok(window) => window,
            Err(e) => {
                self.stats.sampler_errors += 1;
                return Err(e);
            }
        };

        let previous = self.filter.last_committed();
        let mut outcome = process_window(&window, &self.decoder, &mut self.filter);

        match outcome {
            IterationOutcome::Rejected(FrameRejection::NoSync) => {
                trace!(samples = window.len(), "No sync in capture window");
            }
            IterationOutcome::Rejected(reason) => {
                debug!(%reason, "Frame rejected");
            }
            IterationOutcome::Blank => debug!("Blank display, reading discarded"),
            IterationOutcome::Accumulating { candidate, count } => {
                debug!(candidate, count, "Accumulating");
            }
            IterationOutcome::Holding(_) | IterationOutcome::SinkFailed(_) => {}
            IterationOutcome::Committed(value) => {
                if let Err(e) = self.sink.persist(value) {
                    error!(value, error = %e, "Failed to persist reading");
                    self.filter.revert_commit(previous);
                    outcome = IterationOutcome::SinkFailed(value);
                } else {
                    info!(value, "Committed new reading");
                }
            }
        }

        self.stats.record(&outcome);
        Ok(outcome)
    }

    /// Run `iterations` iterations, or forever when `None`.
    ///
    /// Recoverable errors (see [`MonitorError::is_recoverable`]) pause the
    /// loop according to the [`RetryBackoff`] and the next capture is tried;
    /// any other error stops the loop and is returned.
    ///
    /// [`MonitorError::is_recoverable`]: crate::error::MonitorError::is_recoverable
    pub fn run(&mut self, iterations: Option<u64>) -> AppResult<&MonitorStats> {
        info!(
            clock_pin = self.pins.clock,
            data_pin = self.pins.data,
            sample_count = self.sample_count,
            gap_threshold = self.decoder.gap_threshold(),
            stability_threshold = self.filter.threshold(),
            "Monitor started"
        );

        let mut done = 0u64;
        while iterations.map_or(true, |n| done < n) {
            match self.run_iteration() {
                Ok(_) => {
                    let streak = self.backoff.reset();
                    if streak > 0 {
                        info!(failures = streak, "Sampler recovered");
                    }
                }
                Err(e) if e.is_recoverable() => {
                    let delay = self.backoff.failure();
                    if self.backoff.should_log() {
                        warn!(
                            error = %e,
                            failures = self.backoff.failures(),
                            retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "Capture failed, backing off"
                        );
                    }
                    thread::sleep(delay);
                }
                Err(e) => {
                    error!(error = %e, "Capture failed, stopping monitor");
                    return Err(e);
                }
            }
            done += 1;

            if self.summary_interval > 0 && self.stats.iterations % self.summary_interval == 0 {
                self.log_summary();
            }
        }

        info!(iterations = done, "Monitor stopped");
        Ok(&self.stats)
    }

    fn log_summary(&self) {
        let s = &self.stats;
        info!(
            iterations = s.iterations,
            decoded = s.frames_decoded,
            rejected = s.rejections(),
            no_sync = s.no_sync,
            blanks = s.blanks,
            commits = s.commits,
            sink_failures = s.sink_failures,
            sampler_errors = s.sampler_errors,
            last_committed = ?self.filter.last_committed(),
            "Monitor summary"
        );
    }

    /// Counters so far
    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Debounce state
    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }

    /// The sink readings are persisted to
    pub fn sink(&self) -> &K {
        &self.sink
    }
}

//! Sampling Capabilities
//!
//! The decoder only needs one thing from hardware: the current logic level of a
//! line. [`LineSampler`] is that capability. Implementations:
//!
//! - [`SysfsSampler`](super::sysfs::SysfsSampler) - Linux GPIO value files
//! - [`ReplaySampler`](super::mock::ReplaySampler) - replays a recorded capture
//! - [`SimulatedDisplay`](super::mock::SimulatedDisplay) - synthesises a display
//!
//! # Contract
//! - `read` is a synchronous poll with no timeout; a source that blocks stalls
//!   the whole iteration
//! - There is no timestamp and no framing; the caller defines the cadence
//! - Calls are strictly sequential (`&mut self`), there is one thread of control

use crate::error::AppResult;

/// Identifier of a sampled line (GPIO number in BCM numbering on sysfs).
pub type PinId = u32;

/// The two lines driven by the display controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePins {
    /// Clock line
    pub clock: PinId,
    /// Segment data line
    pub data: PinId,
}

impl LinePins {
    /// Pair a clock and a data pin.
    pub fn new(clock: PinId, data: PinId) -> Self {
        Self { clock, data }
    }
}

/// Capability: Logic Level Sampling
///
/// Devices that report the instantaneous level of a digital line.
pub trait LineSampler {
    /// Read the current level of `pin` (`true` = high)
    fn read(&mut self, pin: PinId) -> AppResult<bool>;
}

impl<T: LineSampler + ?Sized> LineSampler for Box<T> {
    fn read(&mut self, pin: PinId) -> AppResult<bool> {
        (**self).read(pin)
    }
}

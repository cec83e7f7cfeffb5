#![forbid(unsafe_code)]

//! Timer multiplexing.
//!
//! The native timer facility hands back a single `u32` on expiry. We pack
//! the owning window and the slot into it:
//!
//! ```text
//! param = window_id * SLOTS_PER_WINDOW + slot
//! ```
//!
//! Slots `1..=MAX_TIMERS` belong to the caller; [`FRAME_TIMER_SLOT`] drives
//! the frame tick.

use std::time::Duration;

use fwin_core::error::{Error, Result};
use fwin_core::handle::{NativeTimer, WindowId};

/// Caller-addressable timers per window.
pub const MAX_TIMERS: u8 = 10;

/// Reserved slot for the frame tick.
pub const FRAME_TIMER_SLOT: u8 = MAX_TIMERS + 1;

/// Encoding stride; one more than the highest slot.
pub const SLOTS_PER_WINDOW: u32 = FRAME_TIMER_SLOT as u32 + 1;

/// Finest resolution the native timers accept.
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

/// Which timer of a window fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Caller(u8),
    Frame,
}

/// Pack `(window, slot)` into a native timer parameter.
pub fn encode(window: WindowId, slot: u8) -> Result<u32> {
    if !window.is_valid() {
        return Err(Error::InvalidWindowId(window));
    }
    if slot == 0 || slot > FRAME_TIMER_SLOT {
        return Err(Error::invalid(format!("timer slot {slot}")));
    }
    Ok(window.0 * SLOTS_PER_WINDOW + u32::from(slot))
}

/// Unpack a native timer parameter. Never panics; garbage yields `None`.
#[must_use]
pub fn decode(param: u32) -> Option<(WindowId, TimerKind)> {
    let window = WindowId(param / SLOTS_PER_WINDOW);
    let slot = (param % SLOTS_PER_WINDOW) as u8;
    if !window.is_valid() {
        return None;
    }
    match slot {
        0 => None,
        FRAME_TIMER_SLOT => Some((window, TimerKind::Frame)),
        s => Some((window, TimerKind::Caller(s))),
    }
}

/// Round a requested period to native resolution.
#[must_use]
pub fn clamp_period(period: Duration) -> Duration {
    let millis = period.as_millis().max(1);
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

/// A running caller timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSlot {
    pub native: NativeTimer,
    pub repeat: bool,
}

/// Timer slots of one window.
#[derive(Debug, Clone, Default)]
pub struct TimerTable {
    slots: [Option<TimerSlot>; MAX_TIMERS as usize],
    frame: Option<NativeTimer>,
}

impl TimerTable {
    fn index(slot: u8) -> Result<usize> {
        if (1..=MAX_TIMERS).contains(&slot) {
            Ok(usize::from(slot - 1))
        } else {
            Err(Error::invalid(format!("timer slot {slot}")))
        }
    }

    /// Validate a caller slot number.
    pub fn check_slot(slot: u8) -> Result<()> {
        Self::index(slot).map(|_| ())
    }

    pub fn get(&self, slot: u8) -> Option<TimerSlot> {
        Self::index(slot).ok().and_then(|i| self.slots[i])
    }

    /// Install a timer, returning the one it displaces.
    pub fn install(&mut self, slot: u8, timer: TimerSlot) -> Result<Option<TimerSlot>> {
        let i = Self::index(slot)?;
        Ok(self.slots[i].replace(timer))
    }

    /// Remove and return a slot's timer.
    pub fn take(&mut self, slot: u8) -> Option<TimerSlot> {
        Self::index(slot).ok().and_then(|i| self.slots[i].take())
    }

    pub fn frame(&self) -> Option<NativeTimer> {
        self.frame
    }

    pub fn set_frame(&mut self, timer: Option<NativeTimer>) -> Option<NativeTimer> {
        std::mem::replace(&mut self.frame, timer)
    }

    /// Every running native timer, for teardown.
    pub fn drain(&mut self) -> Vec<NativeTimer> {
        let mut all: Vec<NativeTimer> = self
            .slots
            .iter_mut()
            .filter_map(|s| s.take().map(|t| t.native))
            .collect();
        all.extend(self.frame.take());
        all
    }
}

#![forbid(unsafe_code)]

//! Joystick sample diffing and rescaling.
//!
//! Native joysticks report each axis as an unsigned sample over
//! `0..=NATIVE_AXIS_MAX`. A change smaller than 1/255 of that range is
//! treated as jitter and suppressed. Axes that do move are rescaled to the
//! symmetric range `[-i32::MAX, i32::MAX]` before emission.

use crate::event::EventKind;

/// Upper bound of a native axis sample.
pub const NATIVE_AXIS_MAX: u16 = u16::MAX;

/// Smallest axis change that is reported.
pub const AXIS_THRESHOLD: u16 = NATIVE_AXIS_MAX / 255;

/// Number of axes per joystick (x, y, z).
pub const JOY_AXES: usize = 3;

/// Number of tracked buttons per joystick.
pub const JOY_BUTTONS: u8 = 32;

/// One raw joystick sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoySample {
    pub axes: [u16; JOY_AXES],
    /// Bit `n` set when button `n + 1` is held.
    pub buttons: u32,
}

impl JoySample {
    /// A centered stick with nothing pressed.
    pub const CENTERED: Self = Self {
        axes: [NATIVE_AXIS_MAX / 2 + 1; JOY_AXES],
        buttons: 0,
    };
}

impl Default for JoySample {
    fn default() -> Self {
        Self::CENTERED
    }
}

/// Rescale a native axis sample to `[-i32::MAX, i32::MAX]`.
#[must_use]
pub fn rescale_axis(raw: u16) -> i32 {
    let span = i64::from(NATIVE_AXIS_MAX);
    let centered = i64::from(raw) * 2 - span;
    let scaled = centered * i64::from(i32::MAX) / span;
    scaled.clamp(-i64::from(i32::MAX), i64::from(i32::MAX)) as i32
}

/// Tracks one joystick.
#[derive(Debug, Clone)]
pub struct JoystickTracker {
    joy: u8,
    /// Last reported axis samples.
    last: [u16; JOY_AXES],
    /// Latest axis samples not yet compared.
    pending_axes: [u16; JOY_AXES],
    buttons: u32,
    pending_buttons: u32,
}

impl JoystickTracker {
    #[must_use]
    pub fn new(joy: u8) -> Self {
        let centered = JoySample::CENTERED;
        Self {
            joy,
            last: centered.axes,
            pending_axes: centered.axes,
            buttons: 0,
            pending_buttons: 0,
        }
    }

    /// Joystick number reported in events.
    #[must_use]
    pub const fn joy(&self) -> u8 {
        self.joy
    }

    /// Record a raw sample.
    pub fn sample(&mut self, sample: JoySample) {
        self.pending_axes = sample.axes;
        self.pending_buttons = sample.buttons;
    }

    /// True when a poll would produce an event.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.axes_moved() || self.buttons != self.pending_buttons
    }

    fn axes_moved(&self) -> bool {
        self.last
            .iter()
            .zip(self.pending_axes.iter())
            .any(|(&old, &new)| old.abs_diff(new) >= AXIS_THRESHOLD)
    }

    /// Emit at most one event: movement first, then button asserts, then
    /// deasserts, lowest button first.
    pub fn poll(&mut self) -> Option<EventKind> {
        if self.axes_moved() {
            for (old, &new) in self.last.iter_mut().zip(self.pending_axes.iter()) {
                if old.abs_diff(new) >= AXIS_THRESHOLD {
                    *old = new;
                }
            }
            return Some(EventKind::JoyMove {
                joy: self.joy,
                x: rescale_axis(self.last[0]),
                y: rescale_axis(self.last[1]),
                z: rescale_axis(self.last[2]),
            });
        }
        let pressed = self.pending_buttons & !self.buttons;
        if pressed != 0 {
            let bit = pressed.trailing_zeros();
            self.buttons |= 1 << bit;
            return Some(EventKind::JoyAssert {
                joy: self.joy,
                button: bit as u8 + 1,
            });
        }
        let released = self.buttons & !self.pending_buttons;
        if released != 0 {
            let bit = released.trailing_zeros();
            self.buttons &= !(1 << bit);
            return Some(EventKind::JoyDeassert {
                joy: self.joy,
                button: bit as u8 + 1,
            });
        }
        None
    }
}

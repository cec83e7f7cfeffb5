#![forbid(unsafe_code)]

//! Mouse state tracking with one-event-per-poll emission.
//!
//! Native notifications update a *pending* snapshot; [`MouseTracker::poll`]
//! compares it with the *current* snapshot and reports the first difference
//! in a fixed priority order:
//!
//! 1. character-cell movement
//! 2. pixel movement
//! 3. button assert edges, button 1 first
//! 4. button deassert edges, button 1 first
//!
//! Only the field that produced the event is promoted from pending to
//! current, so the remaining differences surface on later polls.

use crate::event::EventKind;
use crate::geometry::Point;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTONS: usize = 3;

/// Position and button snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MouseSnapshot {
    /// 1-indexed character cell.
    cell: Point,
    /// 1-indexed pixel.
    pixel: Point,
    buttons: [bool; MOUSE_BUTTONS],
}

impl Default for MouseSnapshot {
    fn default() -> Self {
        Self {
            cell: Point::new(1, 1),
            pixel: Point::new(1, 1),
            buttons: [false; MOUSE_BUTTONS],
        }
    }
}

/// Tracks one mouse for one window.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    mouse: u8,
    current: MouseSnapshot,
    pending: MouseSnapshot,
}

impl MouseTracker {
    /// Create a tracker reporting as mouse number `mouse`.
    #[must_use]
    pub fn new(mouse: u8) -> Self {
        Self {
            mouse,
            ..Self::default()
        }
    }

    /// Record a pointer position in 0-indexed pixels.
    ///
    /// `cell_width`/`cell_height` convert to character cells; values below
    /// one are treated as one.
    pub fn moved(&mut self, x: i32, y: i32, cell_width: i32, cell_height: i32) {
        let cw = cell_width.max(1);
        let ch = cell_height.max(1);
        self.pending.pixel = Point::new(x.saturating_add(1), y.saturating_add(1));
        self.pending.cell = Point::new(x.div_euclid(cw) + 1, y.div_euclid(ch) + 1);
    }

    /// Record a button transition. Buttons are numbered from 1; others are ignored.
    pub fn button(&mut self, button: u8, down: bool) {
        match button_index(button) {
            Some(slot) => self.pending.buttons[slot] = down,
            None => {
                crate::debug!(button, "untracked mouse button ignored");
            }
        }
    }

    /// Release every button (used when the window loses capture).
    pub fn release_all(&mut self) {
        if self.pending.buttons.iter().any(|&b| b) {
            crate::trace!(mouse = self.mouse, "held buttons released");
        }
        self.pending.buttons = [false; MOUSE_BUTTONS];
    }

    /// True when a poll would produce an event.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.current != self.pending
    }

    /// Last reported character position.
    #[must_use]
    pub fn cell(&self) -> Point {
        self.current.cell
    }

    /// Last reported pixel position.
    #[must_use]
    pub fn pixel(&self) -> Point {
        self.current.pixel
    }

    /// Last reported state of `button` (1-based).
    #[must_use]
    pub fn is_pressed(&self, button: u8) -> bool {
        button_index(button).is_some_and(|i| self.current.buttons[i])
    }

    /// Emit at most one event for the highest-priority pending change.
    pub fn poll(&mut self) -> Option<EventKind> {
        let mouse = self.mouse;
        if self.pending.cell != self.current.cell {
            self.current.cell = self.pending.cell;
            return Some(EventKind::MouseMove {
                mouse,
                x: self.current.cell.x,
                y: self.current.cell.y,
            });
        }
        if self.pending.pixel != self.current.pixel {
            self.current.pixel = self.pending.pixel;
            return Some(EventKind::MouseMoveGraphic {
                mouse,
                x: self.current.pixel.x,
                y: self.current.pixel.y,
            });
        }
        for i in 0..MOUSE_BUTTONS {
            if self.pending.buttons[i] && !self.current.buttons[i] {
                self.current.buttons[i] = true;
                return Some(EventKind::MouseAssert {
                    mouse,
                    button: i as u8 + 1,
                });
            }
        }
        for i in 0..MOUSE_BUTTONS {
            if !self.pending.buttons[i] && self.current.buttons[i] {
                self.current.buttons[i] = false;
                return Some(EventKind::MouseDeassert {
                    mouse,
                    button: i as u8 + 1,
                });
            }
        }
        None
    }
}

fn button_index(button: u8) -> Option<usize> {
    let i = usize::from(button).checked_sub(1)?;
    (i < MOUSE_BUTTONS).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(t: &mut MouseTracker) -> Vec<EventKind> {
        std::iter::from_fn(|| t.poll()).collect()
    }

    #[test]
    fn clean_tracker_emits_nothing() {
        let mut t = MouseTracker::new(1);
        assert!(!t.is_dirty());
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn movement_precedes_buttons() {
        let mut t = MouseTracker::new(1);
        t.button(1, true);
        t.moved(25, 35, 8, 16);
        assert_eq!(
            t.poll(),
            Some(EventKind::MouseMove { mouse: 1, x: 4, y: 3 })
        );
        assert_eq!(
            t.poll(),
            Some(EventKind::MouseMoveGraphic { mouse: 1, x: 26, y: 36 })
        );
        assert_eq!(
            t.poll(),
            Some(EventKind::MouseAssert { mouse: 1, button: 1 })
        );
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn pixel_move_inside_cell_skips_char_move() {
        let mut t = MouseTracker::new(1);
        t.moved(3, 0, 8, 16);
        assert_eq!(
            drain(&mut t),
            vec![EventKind::MouseMoveGraphic { mouse: 1, x: 4, y: 1 }]
        );
    }

    #[test]
    fn asserts_before_deasserts_in_button_order() {
        let mut t = MouseTracker::new(2);
        t.button(3, true);
        t.poll();
        t.button(3, false);
        t.button(2, true);
        t.button(1, true);
        assert_eq!(
            drain(&mut t),
            vec![
                EventKind::MouseAssert { mouse: 2, button: 1 },
                EventKind::MouseAssert { mouse: 2, button: 2 },
                EventKind::MouseDeassert { mouse: 2, button: 3 },
            ]
        );
    }

    #[test]
    fn press_and_release_between_polls_is_invisible() {
        let mut t = MouseTracker::new(1);
        t.button(1, true);
        t.button(1, false);
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn out_of_range_buttons_ignored() {
        let mut t = MouseTracker::new(1);
        t.button(0, true);
        t.button(4, true);
        assert!(!t.is_dirty());
        assert!(!t.is_pressed(4));
    }

    #[test]
    fn release_all_produces_deasserts() {
        let mut t = MouseTracker::new(1);
        t.button(1, true);
        t.button(2, true);
        drain(&mut t);
        t.release_all();
        assert_eq!(
            drain(&mut t),
            vec![
                EventKind::MouseDeassert { mouse: 1, button: 1 },
                EventKind::MouseDeassert { mouse: 1, button: 2 },
            ]
        );
    }
}

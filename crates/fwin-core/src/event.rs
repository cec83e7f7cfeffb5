#![forbid(unsafe_code)]

//! Canonical semantic event types.
//!
//! An [`Event`] is what the caller's blocking `next_event` returns. It is
//! backend independent: the runtime builds it from native notifications via
//! the input decoder, the timer multiplexer, and the widget bridge.
//!
//! # Design Notes
//!
//! - Character coordinates are 1-indexed; pixel coordinates reported in
//!   `MouseMoveGraphic` are 1-indexed too.
//! - Joystick axes are rescaled to `[-i32::MAX, i32::MAX]`.
//! - Events are plain values; once queued they belong to the queue.

use crate::geometry::Rect;
use crate::handle::WindowId;

/// A semantic event addressed to a logical window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Window the event originated from.
    pub window: WindowId,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub const fn new(window: WindowId, kind: EventKind) -> Self {
        Self { window, kind }
    }
}

/// The kind-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A printable character.
    Char(char),

    // Line-editing and navigation controls.
    Up,
    Down,
    Left,
    Right,
    LeftWord,
    RightWord,
    /// Home of document.
    Home,
    /// Home of screen.
    HomeScreen,
    /// Home of line.
    HomeLine,
    /// End of document.
    End,
    /// End of screen.
    EndScreen,
    /// End of line.
    EndLine,
    ScrollLeft,
    ScrollRight,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Tab,
    Enter,
    /// Insert block.
    Insert,
    InsertLine,
    InsertToggle,
    /// Delete block.
    Delete,
    DeleteLine,
    DeleteCharForward,
    DeleteCharBackward,
    Cancel,
    Stop,
    Continue,
    /// Function key `n`.
    Function(u8),

    /// Repaint the given pixel region (0-indexed).
    Redraw(Rect),
    /// Client area changed size.
    Resize {
        /// Width in characters.
        cols: i32,
        /// Height in characters.
        rows: i32,
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
    },
    /// Mouse moved to a new character cell.
    MouseMove { mouse: u8, x: i32, y: i32 },
    /// Mouse moved to a new pixel.
    MouseMoveGraphic { mouse: u8, x: i32, y: i32 },
    /// Mouse button pressed.
    MouseAssert { mouse: u8, button: u8 },
    /// Mouse button released.
    MouseDeassert { mouse: u8, button: u8 },
    /// Joystick moved.
    JoyMove { joy: u8, x: i32, y: i32, z: i32 },
    /// Joystick button pressed.
    JoyAssert { joy: u8, button: u8 },
    /// Joystick button released.
    JoyDeassert { joy: u8, button: u8 },
    /// Caller timer `slot` fired.
    Timer(u8),
    /// Frame tick.
    Frame,
    /// Menu item selected.
    Menu(i32),
    Focus,
    NoFocus,
    Hover,
    NoHover,
    Minimize,
    Maximize,
    Normalize,
    /// Termination requested (window close, end-of-text, or native quit).
    Terminate,

    // Widget notifications, keyed by the application-chosen id.
    Button(i32),
    Checkbox(i32),
    RadioButton(i32),
    ScrollUpLine(i32),
    ScrollDownLine(i32),
    ScrollUpPage(i32),
    ScrollDownPage(i32),
    ScrollPosition { id: i32, position: i32 },
    EditBox(i32),
    NumSelect { id: i32, value: i32 },
    ListSelect { id: i32, index: i32 },
    DropSelect { id: i32, index: i32 },
    DropEditBox(i32),
    SliderPosition { id: i32, position: i32 },
    TabSelect { id: i32, index: i32 },
}

impl EventKind {
    /// True for events generated by a widget.
    #[must_use]
    pub const fn is_widget(&self) -> bool {
        matches!(
            self,
            EventKind::Button(_)
                | EventKind::Checkbox(_)
                | EventKind::RadioButton(_)
                | EventKind::ScrollUpLine(_)
                | EventKind::ScrollDownLine(_)
                | EventKind::ScrollUpPage(_)
                | EventKind::ScrollDownPage(_)
                | EventKind::ScrollPosition { .. }
                | EventKind::EditBox(_)
                | EventKind::NumSelect { .. }
                | EventKind::ListSelect { .. }
                | EventKind::DropSelect { .. }
                | EventKind::DropEditBox(_)
                | EventKind::SliderPosition { .. }
                | EventKind::TabSelect { .. }
        )
    }

    /// True for the mouse kinds.
    #[must_use]
    pub const fn is_mouse(&self) -> bool {
        matches!(
            self,
            EventKind::MouseMove { .. }
                | EventKind::MouseMoveGraphic { .. }
                | EventKind::MouseAssert { .. }
                | EventKind::MouseDeassert { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_classification() {
        assert!(EventKind::Button(3).is_widget());
        assert!(EventKind::TabSelect { id: 1, index: 2 }.is_widget());
        assert!(!EventKind::Char('a').is_widget());
        assert!(!EventKind::Menu(4).is_widget());
    }

    #[test]
    fn mouse_classification() {
        assert!(EventKind::MouseAssert { mouse: 1, button: 2 }.is_mouse());
        assert!(!EventKind::JoyAssert { joy: 1, button: 2 }.is_mouse());
    }
}

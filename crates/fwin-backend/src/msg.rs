#![forbid(unsafe_code)]

//! Native notifications, as delivered by [`NativeEventLoop::wait_message`].
//!
//! Pixel coordinates are 0-based and relative to the client area of the
//! addressed window.
//!
//! [`NativeEventLoop::wait_message`]: crate::NativeEventLoop::wait_message

use fwin_core::geometry::Rect;
use fwin_core::handle::NativeHandle;
use fwin_core::joystick::JoySample;
use fwin_core::key::Key;

/// Show state reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowState {
    Minimized,
    Maximized,
    Normal,
}

/// Scroll bar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollAction {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    /// Thumb dragged to an absolute position.
    Position(i32),
}

/// What a native control reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlNotify {
    /// Button, checkbox, or radio button clicked.
    Clicked,
    Scroll(ScrollAction),
    /// Edit text committed (enter pressed).
    TextCommitted,
    /// List, drop box, or tab selection changed; 0-based item index.
    Selected(i32),
    /// Spin, slider, or progress value changed.
    Value(i32),
}

/// One native notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMsg {
    KeyDown { window: NativeHandle, key: Key },
    KeyUp { window: NativeHandle, key: Key },
    /// Translated character input.
    Char { window: NativeHandle, ch: char },
    /// Pointer moved to a client pixel.
    MouseMove { window: NativeHandle, x: i32, y: i32 },
    /// Button `button` (1-based) changed state.
    MouseButton {
        window: NativeHandle,
        button: u8,
        down: bool,
    },
    /// Pointer left the client area.
    MouseLeave { window: NativeHandle },
    Joystick {
        window: NativeHandle,
        joy: u8,
        sample: JoySample,
    },
    /// Part of the client area needs repainting.
    Paint { window: NativeHandle, rect: Rect },
    /// Client area changed to `width` x `height` pixels.
    Resized {
        window: NativeHandle,
        width: i32,
        height: i32,
    },
    Focus { window: NativeHandle, focused: bool },
    Show { window: NativeHandle, state: ShowState },
    /// The user asked to close the window.
    Close { window: NativeHandle },
    /// A timer expired; `param` is the value given at creation.
    TimerExpired { param: u32 },
    /// Menu item chosen.
    Command { window: NativeHandle, id: i32 },
    Control {
        window: NativeHandle,
        control: NativeHandle,
        notify: ControlNotify,
    },
    /// The native system is shutting the application down.
    Quit,
}

impl NativeMsg {
    /// Native window this message is addressed to, if any.
    #[must_use]
    pub const fn window(&self) -> Option<NativeHandle> {
        match self {
            NativeMsg::KeyDown { window, .. }
            | NativeMsg::KeyUp { window, .. }
            | NativeMsg::Char { window, .. }
            | NativeMsg::MouseMove { window, .. }
            | NativeMsg::MouseButton { window, .. }
            | NativeMsg::MouseLeave { window }
            | NativeMsg::Joystick { window, .. }
            | NativeMsg::Paint { window, .. }
            | NativeMsg::Resized { window, .. }
            | NativeMsg::Focus { window, .. }
            | NativeMsg::Show { window, .. }
            | NativeMsg::Close { window }
            | NativeMsg::Command { window, .. }
            | NativeMsg::Control { window, .. } => Some(*window),
            NativeMsg::TimerExpired { .. } | NativeMsg::Quit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_addressing() {
        let w = NativeHandle(7);
        assert_eq!(NativeMsg::Close { window: w }.window(), Some(w));
        assert_eq!(NativeMsg::TimerExpired { param: 13 }.window(), None);
        assert_eq!(NativeMsg::Quit.window(), None);
    }
}

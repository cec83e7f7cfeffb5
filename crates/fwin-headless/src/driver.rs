#![forbid(unsafe_code)]

//! Host-side control of the headless system: inject user input, script
//! dialog answers, and inspect windows and controls.

use std::sync::mpsc::Sender;

use fwin_backend::{ControlNotify, NativeMsg, ShowState};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Rect, Size};
use fwin_core::handle::NativeHandle;
use fwin_core::joystick::JoySample;
use fwin_core::key::Key;
use fwin_render::canvas::Canvas;
use fwin_render::color::PackedRgba;

use crate::world::{self, DialogReply, NativeControl, NativeWindow, SharedWorld};

/// Cloneable handle for driving a headless backend from a test.
#[derive(Debug, Clone)]
pub struct HeadlessDriver {
    world: SharedWorld,
    events: Sender<NativeMsg>,
}

impl HeadlessDriver {
    pub(crate) fn new(world: SharedWorld, events: Sender<NativeMsg>) -> Self {
        Self { world, events }
    }

    // ── Input ──────────────────────────────────────────────────────────

    /// Deliver a raw native message.
    pub fn send(&self, msg: NativeMsg) -> Result<()> {
        self.events
            .send(msg)
            .map_err(|_| Error::Disconnected("headless event loop"))
    }

    /// Press and release `key`.
    pub fn key(&self, window: NativeHandle, key: Key) -> Result<()> {
        self.send(NativeMsg::KeyDown { window, key })?;
        self.send(NativeMsg::KeyUp { window, key })
    }

    /// Type `text` one character at a time.
    pub fn type_str(&self, window: NativeHandle, text: &str) -> Result<()> {
        text.chars()
            .try_for_each(|ch| self.send(NativeMsg::Char { window, ch }))
    }

    pub fn mouse_move(&self, window: NativeHandle, x: i32, y: i32) -> Result<()> {
        self.send(NativeMsg::MouseMove { window, x, y })
    }

    pub fn mouse_button(&self, window: NativeHandle, button: u8, down: bool) -> Result<()> {
        self.send(NativeMsg::MouseButton {
            window,
            button,
            down,
        })
    }

    pub fn joystick(&self, window: NativeHandle, joy: u8, sample: JoySample) -> Result<()> {
        self.send(NativeMsg::Joystick {
            window,
            joy,
            sample,
        })
    }

    pub fn focus(&self, window: NativeHandle, focused: bool) -> Result<()> {
        self.send(NativeMsg::Focus { window, focused })
    }

    pub fn show(&self, window: NativeHandle, state: ShowState) -> Result<()> {
        self.send(NativeMsg::Show { window, state })
    }

    /// Ask for part of a window to be repainted.
    pub fn paint(&self, window: NativeHandle, rect: Rect) -> Result<()> {
        self.send(NativeMsg::Paint { window, rect })
    }

    /// Resize a window's client area as the user would.
    pub fn resize(&self, window: NativeHandle, width: i32, height: i32) -> Result<()> {
        {
            let mut w = world::lock(&self.world);
            let surface = &mut w.window_mut(window)?.surface;
            let mut resized = Canvas::new(Size::new(width, height), PackedRgba::WHITE);
            resized.copy_from(surface, surface.bounds(), Point::new(0, 0));
            *surface = resized;
        }
        self.send(NativeMsg::Resized {
            window,
            width,
            height,
        })
    }

    pub fn close(&self, window: NativeHandle) -> Result<()> {
        self.send(NativeMsg::Close { window })
    }

    pub fn menu_command(&self, window: NativeHandle, id: i32) -> Result<()> {
        self.send(NativeMsg::Command { window, id })
    }

    /// A notification from `control`, addressed to its parent window.
    pub fn notify(&self, control: NativeHandle, notify: ControlNotify) -> Result<()> {
        let window = world::lock(&self.world).control(control)?.parent;
        self.send(NativeMsg::Control {
            window,
            control,
            notify,
        })
    }

    pub fn click(&self, control: NativeHandle) -> Result<()> {
        self.notify(control, ControlNotify::Clicked)
    }

    /// Replace a control's text as if typed, then commit it.
    pub fn enter_text(&self, control: NativeHandle, text: &str) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.text = text.to_owned();
        self.notify(control, ControlNotify::TextCommitted)
    }

    pub fn quit(&self) -> Result<()> {
        self.send(NativeMsg::Quit)
    }

    // ── Dialogs ────────────────────────────────────────────────────────

    /// Queue the answer for the next dialog.
    pub fn reply(&self, reply: DialogReply) {
        world::lock(&self.world).replies.push_back(reply);
    }

    /// `(title, message)` of every alert shown so far.
    pub fn alerts(&self) -> Vec<(String, String)> {
        world::lock(&self.world).alerts.clone()
    }

    // ── Inspection ─────────────────────────────────────────────────────

    /// Open native windows, oldest first.
    pub fn windows(&self) -> Vec<NativeHandle> {
        world::lock(&self.world).windows.keys().copied().collect()
    }

    pub fn window_titled(&self, title: &str) -> Option<NativeHandle> {
        world::lock(&self.world)
            .windows
            .iter()
            .find(|(_, w)| w.title == title)
            .map(|(h, _)| *h)
    }

    /// Snapshot of a native window.
    pub fn window(&self, window: NativeHandle) -> Option<NativeWindow> {
        world::lock(&self.world).windows.get(&window).cloned()
    }

    pub fn control(&self, control: NativeHandle) -> Option<NativeControl> {
        world::lock(&self.world).controls.get(&control).cloned()
    }

    /// Controls whose parent is `window`, in creation order.
    pub fn controls_of(&self, window: NativeHandle) -> Vec<NativeHandle> {
        world::lock(&self.world)
            .controls
            .iter()
            .filter(|(_, c)| c.parent == window)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Read `count` character cells of a window surface at 1-based
    /// `(col, row)`, using the default cell size.
    pub fn text_at(&self, window: NativeHandle, col: i32, row: i32, count: usize) -> String {
        let w = world::lock(&self.world);
        let m = w.metrics;
        w.windows.get(&window).map_or_else(String::new, |win| {
            win.surface.text_at(
                (col - 1) * m.cell_width,
                (row - 1) * m.cell_height,
                count,
                m.cell_width,
            )
        })
    }

    /// Timers still running.
    pub fn live_timers(&self) -> usize {
        world::lock(&self.world).timers.len()
    }
}

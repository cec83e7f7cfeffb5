#![forbid(unsafe_code)]

//! Backend traits for fwin.
//!
//! A backend is split into three parts that live on three threads:
//!
//! | Part | Thread | Role |
//! |------|--------|------|
//! | [`NativeDisplay`] | application (under the runtime lock) | drawing, window and control state, timers, menus |
//! | [`NativeEventLoop`] | display pump | native message wait, control creation and destruction |
//! | [`NativeDialogs`] | dialog pump | modal dialogs |
//!
//! Only the display pump creates or destroys native controls. Everything else
//! on a control (text, enable, check, geometry) goes through the display.

use std::time::Duration;

use fwin_core::error::Result;
use fwin_core::geometry::{Rect, Size};
use fwin_core::handle::{NativeHandle, NativeTimer};
use fwin_render::surface::DrawingSurface;

pub mod dialog;
pub mod msg;
pub mod spec;

pub use dialog::{FindOptions, FindQuery, FontChoice, NativeDialogs};
pub use msg::{ControlNotify, NativeMsg, ScrollAction, ShowState};
pub use spec::{ControlClass, ControlHandles, ControlSpec, ControlStyle, MenuItem, WindowSpec};

/// Window, control, timer, and menu operations plus drawing.
pub trait NativeDisplay: DrawingSurface {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<NativeHandle>;

    fn destroy_window(&mut self, window: NativeHandle) -> Result<()>;

    fn set_title(&mut self, window: NativeHandle, title: &str) -> Result<()>;

    fn set_visible(&mut self, window: NativeHandle, visible: bool) -> Result<()>;

    /// Resize the window so its client area is `size` pixels.
    fn set_client_size(&mut self, window: NativeHandle, size: Size) -> Result<()>;

    /// Move the window to the front (`true`) or back of the z-order.
    fn raise(&mut self, window: NativeHandle, front: bool) -> Result<()>;

    /// Show the text caret over `cell`, or hide it.
    fn set_caret(&mut self, window: NativeHandle, cell: Option<Rect>) -> Result<()>;

    /// Start a timer that reports `NativeMsg::TimerExpired { param }`.
    fn set_timer(
        &mut self,
        window: NativeHandle,
        param: u32,
        period: Duration,
        repeat: bool,
    ) -> Result<NativeTimer>;

    fn kill_timer(&mut self, timer: NativeTimer) -> Result<()>;

    /// Install a menu bar, or remove it with `None`.
    fn set_menu(&mut self, window: NativeHandle, menu: Option<&[MenuItem]>) -> Result<()>;

    fn set_menu_state(
        &mut self,
        window: NativeHandle,
        id: i32,
        enabled: bool,
        checked: bool,
    ) -> Result<()>;

    fn control_set_enabled(&mut self, control: NativeHandle, enabled: bool) -> Result<()>;

    fn control_set_checked(&mut self, control: NativeHandle, checked: bool) -> Result<()>;

    fn control_text(&self, control: NativeHandle) -> Result<String>;

    fn control_set_text(&mut self, control: NativeHandle, text: &str) -> Result<()>;

    fn control_set_rect(&mut self, control: NativeHandle, rect: Rect) -> Result<()>;

    /// Position of a scroll bar, spin, trackbar, or progress bar; selected
    /// index of a tab strip.
    fn control_set_value(&mut self, control: NativeHandle, value: i32) -> Result<()>;

    fn control_raise(&mut self, control: NativeHandle, front: bool) -> Result<()>;

    /// Push pending output to the device.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The native message loop, owned by the display pump.
pub trait NativeEventLoop {
    /// Wait up to `timeout` for one notification; `Ok(None)` on timeout.
    fn wait_message(&mut self, timeout: Duration) -> Result<Option<NativeMsg>>;

    fn create_control(&mut self, spec: &ControlSpec) -> Result<ControlHandles>;

    fn destroy_control(&mut self, handles: ControlHandles) -> Result<()>;
}

/// A complete backend, split into its thread-owned parts at start-up.
pub trait Backend {
    type Display: NativeDisplay + Send + 'static;
    type EventLoop: NativeEventLoop + Send + 'static;
    type Dialogs: NativeDialogs + Send + 'static;

    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &'static str;

    fn split(self) -> Result<(Self::Display, Self::EventLoop, Self::Dialogs)>;
}

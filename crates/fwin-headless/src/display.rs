#![forbid(unsafe_code)]

//! Drawing and window state for the headless backend.
//!
//! Every native window is a [`Canvas`]. Setting a client size resizes the
//! canvas without reporting a `Resized`; a user resize is simulated through
//! [`HeadlessDriver::resize`](crate::HeadlessDriver::resize).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use fwin_backend::{MenuItem, NativeDisplay, NativeMsg, WindowSpec};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Rect, Size};
use fwin_core::handle::{NativeHandle, NativeTimer};
use fwin_render::canvas::Canvas;
use fwin_render::color::PackedRgba;
use fwin_render::style::{FontId, FontMetrics, TextStyle};
use fwin_render::surface::DrawingSurface;

use crate::world::{self, SharedWorld};

/// Fonts installed in the headless system.
pub const HEADLESS_FONTS: u32 = 4;

/// The drawing half of the headless backend.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    world: SharedWorld,
    events: Sender<NativeMsg>,
}

impl HeadlessDisplay {
    pub(crate) fn new(world: SharedWorld, events: Sender<NativeMsg>) -> Self {
        Self { world, events }
    }

    fn with_surface<T>(&mut self, window: NativeHandle, f: impl FnOnce(&mut Canvas) -> T) -> Result<T> {
        let mut w = world::lock(&self.world);
        Ok(f(&mut w.window_mut(window)?.surface))
    }

    /// Copy of a window's surface.
    pub fn surface(&self, window: NativeHandle) -> Option<Canvas> {
        world::lock(&self.world)
            .windows
            .get(&window)
            .map(|w| w.surface.clone())
    }

    /// Paint a whole surface one color.
    pub fn fill(&mut self, window: NativeHandle, color: PackedRgba) {
        if let Some(w) = world::lock(&self.world).windows.get_mut(&window) {
            w.surface.clear(color);
        }
    }

    /// Where the caret is shown, if anywhere.
    pub fn caret(&self, window: NativeHandle) -> Option<Rect> {
        world::lock(&self.world)
            .windows
            .get(&window)
            .and_then(|w| w.caret)
    }
}

impl DrawingSurface for HeadlessDisplay {
    fn surface_size(&self, window: NativeHandle) -> Result<Size> {
        Ok(world::lock(&self.world).window(window)?.surface.size())
    }

    fn fill_rect(&mut self, window: NativeHandle, rect: Rect, color: PackedRgba) -> Result<()> {
        self.with_surface(window, |s| s.fill_rect(rect, color))
    }

    fn set_pixel(&mut self, window: NativeHandle, at: Point, color: PackedRgba) -> Result<()> {
        self.with_surface(window, |s| s.set_pixel(at, color))
    }

    fn draw_line(
        &mut self,
        window: NativeHandle,
        from: Point,
        to: Point,
        color: PackedRgba,
        width: i32,
    ) -> Result<()> {
        self.with_surface(window, |s| s.draw_line(from, to, color, width))
    }

    fn draw_ellipse(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        color: PackedRgba,
        filled: bool,
    ) -> Result<()> {
        self.with_surface(window, |s| s.draw_ellipse(rect, color, filled))
    }

    fn draw_text(
        &mut self,
        window: NativeHandle,
        origin: Point,
        text: &str,
        style: &TextStyle,
    ) -> Result<()> {
        self.with_surface(window, |s| s.draw_text(origin, text, style))
    }

    fn blit(&mut self, window: NativeHandle, src: &Canvas, src_rect: Rect, dst: Point) -> Result<()> {
        self.with_surface(window, |s| s.copy_from(src, src_rect, dst))
    }

    fn stretch_blit(
        &mut self,
        window: NativeHandle,
        src: &Canvas,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<()> {
        self.with_surface(window, |s| s.stretch_from(src, src_rect, dst_rect))
    }

    fn scroll(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        dx: i32,
        dy: i32,
        fill: PackedRgba,
    ) -> Result<()> {
        self.with_surface(window, |s| s.scroll(rect, dx, dy, fill))
    }

    /// Every font is fixed pitch, half as wide as it is tall. A height of
    /// zero or less asks for the default size.
    fn font_metrics(&self, font: FontId, height: i32) -> Result<FontMetrics> {
        if font.0 == 0 || font.0 > HEADLESS_FONTS {
            return Err(Error::invalid(format!("font {}", font.0)));
        }
        let base = world::lock(&self.world).metrics;
        if height <= 0 || height == base.cell_height {
            return Ok(base);
        }
        Ok(FontMetrics::new((height / 2).max(1), height))
    }

    fn font_count(&self) -> u32 {
        HEADLESS_FONTS
    }
}

impl NativeDisplay for HeadlessDisplay {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<NativeHandle> {
        let handle = world::lock(&self.world).add_window(spec)?;
        tracing::trace!(?handle, title = %spec.title, "headless window created");
        Ok(handle)
    }

    fn destroy_window(&mut self, window: NativeHandle) -> Result<()> {
        world::lock(&self.world).remove_window(window)
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) -> Result<()> {
        world::lock(&self.world).window_mut(window)?.title = title.to_owned();
        Ok(())
    }

    fn set_visible(&mut self, window: NativeHandle, visible: bool) -> Result<()> {
        world::lock(&self.world).window_mut(window)?.visible = visible;
        Ok(())
    }

    fn set_client_size(&mut self, window: NativeHandle, size: Size) -> Result<()> {
        self.with_surface(window, |s| {
            let mut resized = Canvas::new(size, PackedRgba::WHITE);
            resized.copy_from(s, s.bounds(), Point::new(0, 0));
            *s = resized;
        })
    }

    fn raise(&mut self, window: NativeHandle, front: bool) -> Result<()> {
        world::lock(&self.world).window_mut(window)?.raised = Some(front);
        Ok(())
    }

    fn set_caret(&mut self, window: NativeHandle, cell: Option<Rect>) -> Result<()> {
        world::lock(&self.world).window_mut(window)?.caret = cell;
        Ok(())
    }

    fn set_timer(
        &mut self,
        window: NativeHandle,
        param: u32,
        period: Duration,
        repeat: bool,
    ) -> Result<NativeTimer> {
        let cancel = Arc::new(AtomicBool::new(false));
        let timer = {
            let mut w = world::lock(&self.world);
            w.window(window)?;
            let timer = NativeTimer(w.mint());
            w.timers.insert(timer, Arc::clone(&cancel));
            timer
        };
        let events = self.events.clone();
        let world = Arc::clone(&self.world);
        thread::Builder::new()
            .name("fwin-headless-timer".into())
            .spawn(move || {
                loop {
                    thread::sleep(period);
                    if cancel.load(Ordering::Acquire) {
                        break;
                    }
                    if events.send(NativeMsg::TimerExpired { param }).is_err() {
                        break;
                    }
                    if !repeat {
                        world::lock(&world).timers.remove(&timer);
                        break;
                    }
                }
            })?;
        Ok(timer)
    }

    /// Killing a timer that already expired is not an error.
    fn kill_timer(&mut self, timer: NativeTimer) -> Result<()> {
        match world::lock(&self.world).timers.remove(&timer) {
            Some(cancel) => cancel.store(true, Ordering::Release),
            None => tracing::trace!(?timer, "kill of an expired timer"),
        }
        Ok(())
    }

    fn set_menu(&mut self, window: NativeHandle, menu: Option<&[MenuItem]>) -> Result<()> {
        let mut w = world::lock(&self.world);
        let win = w.window_mut(window)?;
        win.menu = menu.map(<[MenuItem]>::to_vec);
        win.menu_state.clear();
        Ok(())
    }

    fn set_menu_state(
        &mut self,
        window: NativeHandle,
        id: i32,
        enabled: bool,
        checked: bool,
    ) -> Result<()> {
        world::lock(&self.world)
            .window_mut(window)?
            .menu_state
            .insert(id, (enabled, checked));
        Ok(())
    }

    fn control_set_enabled(&mut self, control: NativeHandle, enabled: bool) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.enabled = enabled;
        Ok(())
    }

    fn control_set_checked(&mut self, control: NativeHandle, checked: bool) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.checked = checked;
        Ok(())
    }

    fn control_text(&self, control: NativeHandle) -> Result<String> {
        Ok(world::lock(&self.world).control(control)?.text.clone())
    }

    fn control_set_text(&mut self, control: NativeHandle, text: &str) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.text = text.to_owned();
        Ok(())
    }

    fn control_set_rect(&mut self, control: NativeHandle, rect: Rect) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.rect = rect;
        Ok(())
    }

    fn control_set_value(&mut self, control: NativeHandle, value: i32) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.value = value;
        Ok(())
    }

    fn control_raise(&mut self, control: NativeHandle, front: bool) -> Result<()> {
        world::lock(&self.world).control_mut(control)?.raised = Some(front);
        Ok(())
    }
}

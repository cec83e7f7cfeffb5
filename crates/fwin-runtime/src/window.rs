#![forbid(unsafe_code)]

//! Windows and their screen buffers.
//!
//! A window owns up to [`MAX_SCREENS`] screen slots. One is the *update*
//! slot (drawing goes there) and one the *display* slot (shown). Slots are
//! created and cleared on first selection.
//!
//! # Buffered mode
//!
//! Each live slot keeps a private [`Canvas`] the size of the buffer. Drawing
//! always lands on the update slot's canvas and reaches the visible surface
//! only when `indisp()` holds. Native repaint requests are answered
//! internally by [`Window::restore`]; the application never sees them.
//!
//! # Unbuffered mode
//!
//! A single slot, no private canvas, buffer size equal to the client area.
//! Drawing goes straight to the surface and repaint requests are passed on
//! to the application as `Redraw` events.

use fwin_backend::NativeDisplay;
use fwin_core::error::{Error, Result};
use fwin_core::event::EventKind;
use fwin_core::geometry::{Point, Rect, Size};
use fwin_core::handle::{FileHandle, NativeHandle, NativeTimer, WindowId};
use fwin_core::input_decoder::KeyDecoder;
use fwin_core::joystick::{JoySample, JoystickTracker};
use fwin_core::key::Key;
use fwin_core::mouse::MouseTracker;
use fwin_render::canvas::Canvas;
use fwin_render::color::PackedRgba;
use fwin_render::screen::{ScreenContext, Viewport};
use fwin_render::style::{FontId, FontMetrics, MixMode, TextAttrs};

use crate::menu::MenuTracker;
use crate::picture::PictureCache;
use crate::timer::TimerTable;
use crate::widget::{WidgetEntry, WidgetList};

/// Screen slots per window, numbered from 1.
pub const MAX_SCREENS: usize = 10;

const NO_CANVAS: Size = Size::new(0, 0);

#[derive(Debug, Clone)]
struct Screen {
    ctx: ScreenContext,
    canvas: Canvas,
    live: bool,
}

impl Screen {
    fn dormant(metrics: FontMetrics) -> Self {
        Self {
            ctx: ScreenContext::new(metrics),
            canvas: Canvas::new(NO_CANVAS, PackedRgba::WHITE),
            live: false,
        }
    }
}

/// Streams and parent a window was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub id: WindowId,
    pub input: FileHandle,
    pub output: FileHandle,
    pub parent: Option<WindowId>,
}

/// One application window.
#[derive(Debug)]
pub struct Window {
    pub binding: Binding,
    pub native: NativeHandle,
    screens: Vec<Screen>,
    update: usize,
    display: usize,
    buffered: bool,
    /// Buffer size in pixels.
    buffer: Size,
    /// Buffer size to come back to when buffering is switched back on.
    saved_buffer: Size,
    /// Client area in pixels.
    client: Size,
    metrics: FontMetrics,
    caret: Option<Rect>,
    pub visible: bool,
    pub focused: bool,
    pub hover: bool,
    pub title: String,
    pub decoder: KeyDecoder,
    pub mouse: MouseTracker,
    pub joysticks: Vec<JoystickTracker>,
    pub timers: TimerTable,
    pub widgets: WidgetList,
    pub menu: MenuTracker,
    pub pictures: PictureCache,
}

fn slot_index(slot: usize) -> Result<usize> {
    if (1..=MAX_SCREENS).contains(&slot) {
        Ok(slot - 1)
    } else {
        Err(Error::invalid(format!("screen {slot}")))
    }
}

impl Window {
    /// A buffered window with screen 1 live and cleared.
    pub fn new(binding: Binding, native: NativeHandle, buffer: Size, metrics: FontMetrics) -> Self {
        let mut screens = vec![Screen::dormant(metrics); MAX_SCREENS];
        screens[0].canvas = Canvas::new(buffer, screens[0].ctx.background);
        screens[0].live = true;
        Self {
            binding,
            native,
            screens,
            update: 0,
            display: 0,
            buffered: true,
            buffer,
            saved_buffer: buffer,
            client: buffer,
            metrics,
            caret: None,
            visible: true,
            focused: false,
            hover: false,
            title: String::new(),
            decoder: KeyDecoder::new(),
            mouse: MouseTracker::new(1),
            joysticks: Vec::new(),
            timers: TimerTable::default(),
            widgets: WidgetList::default(),
            menu: MenuTracker::default(),
            pictures: PictureCache::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> WindowId {
        self.binding.id
    }

    // ── Screen slots ───────────────────────────────────────────────────

    /// True when the update slot is the one being shown.
    #[inline]
    pub fn indisp(&self) -> bool {
        self.update == self.display
    }

    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// 1-based update slot.
    pub fn update_slot(&self) -> usize {
        self.update + 1
    }

    /// 1-based display slot.
    pub fn display_slot(&self) -> usize {
        self.display + 1
    }

    /// True when `slot` has been created.
    pub fn is_live(&self, slot: usize) -> bool {
        slot_index(slot).is_ok_and(|i| self.screens[i].live)
    }

    /// State of the update slot.
    pub fn ctx(&self) -> &ScreenContext {
        &self.screens[self.update].ctx
    }

    pub fn ctx_mut(&mut self) -> &mut ScreenContext {
        &mut self.screens[self.update].ctx
    }

    /// Private canvas of a live slot; `None` when unbuffered or dormant.
    pub fn canvas(&self, slot: usize) -> Option<&Canvas> {
        let i = slot_index(slot).ok()?;
        let s = &self.screens[i];
        (self.buffered && s.live).then_some(&s.canvas)
    }

    fn ensure_live(&mut self, i: usize) {
        let buffer = self.buffer;
        let s = &mut self.screens[i];
        if !s.live {
            s.ctx = ScreenContext::new(self.metrics);
            s.canvas = Canvas::new(buffer, s.ctx.background);
            s.live = true;
            tracing::trace!(window = %self.binding.id, slot = i + 1, "screen created");
        }
    }

    /// Choose the update and display slots.
    pub fn select(
        &mut self,
        display: &mut dyn NativeDisplay,
        update: usize,
        shown: usize,
    ) -> Result<()> {
        if !self.buffered {
            return Err(Error::Unsupported("screen select on an unbuffered window"));
        }
        let (u, d) = (slot_index(update)?, slot_index(shown)?);
        self.ensure_live(u);
        self.ensure_live(d);
        self.update = u;
        if self.display != d {
            self.display = d;
            self.restore(display, None)?;
        }
        self.update_caret(display)
    }

    /// Copy the display slot to the visible surface.
    ///
    /// `region` limits the copy (0-based client pixels). Parts of the region
    /// outside the buffer are padded with the display slot's background.
    pub fn restore(&mut self, display: &mut dyn NativeDisplay, region: Option<Rect>) -> Result<()> {
        if !self.buffered || !self.visible {
            return Ok(());
        }
        let client = Rect::from_size(self.client);
        let area = region.map_or(client, |r| r.intersection(&client));
        if area.is_empty() {
            return Ok(());
        }
        let screen = &self.screens[self.display];
        let bounds = screen.canvas.bounds();
        if let Some(inside) = area.intersection_opt(&bounds) {
            display.blit(self.native, &screen.canvas, inside, inside.origin())?;
        }
        for band in area.subtract(&bounds) {
            display.fill_rect(self.native, band, screen.ctx.background)?;
        }
        Ok(())
    }

    // ── Sizes ──────────────────────────────────────────────────────────

    fn cell(&self) -> (i32, i32) {
        let m = self.ctx().metrics();
        (m.cell_width.max(1), m.cell_height.max(1))
    }

    /// Buffer width in characters.
    pub fn maxx(&self) -> i32 {
        self.buffer.width / self.cell().0
    }

    /// Buffer height in characters.
    pub fn maxy(&self) -> i32 {
        self.buffer.height / self.cell().1
    }

    /// Buffer size in pixels.
    pub fn buffer_size(&self) -> Size {
        self.buffer
    }

    /// Client area in pixels.
    pub fn client_size(&self) -> Size {
        self.client
    }

    /// Resize every live buffer, keeping the top-left content.
    pub fn size_buffer(&mut self, display: &mut dyn NativeDisplay, size: Size) -> Result<()> {
        if !self.buffered {
            return Err(Error::Unsupported("buffer sizing on an unbuffered window"));
        }
        if size.is_empty() {
            return Err(Error::invalid(format!(
                "buffer size {}x{}",
                size.width, size.height
            )));
        }
        self.buffer = size;
        self.saved_buffer = size;
        for s in self.screens.iter_mut().filter(|s| s.live) {
            let mut canvas = Canvas::new(size, s.ctx.background);
            canvas.copy_from(&s.canvas, s.canvas.bounds(), Point::new(0, 0));
            s.canvas = canvas;
        }
        self.restore(display, None)
    }

    /// Switch buffering. Returns the events the application must see.
    ///
    /// Turning buffering off keeps only the displayed slot, sizes it to the
    /// client area, and asks the application to resize and redraw. Turning
    /// it back on recreates the buffer at its previous size and copies it
    /// to the surface.
    pub fn set_buffered(
        &mut self,
        display: &mut dyn NativeDisplay,
        on: bool,
    ) -> Result<Vec<EventKind>> {
        if on == self.buffered {
            return Ok(Vec::new());
        }
        if on {
            self.buffered = true;
            self.buffer = self.saved_buffer;
            let screen = &mut self.screens[0];
            screen.canvas = Canvas::new(self.buffer, screen.ctx.background);
            self.restore(display, None)?;
            self.update_caret(display)?;
            return Ok(Vec::new());
        }
        self.saved_buffer = self.buffer;
        self.screens.swap(0, self.display);
        for s in &mut self.screens[1..] {
            *s = Screen::dormant(self.metrics);
        }
        self.screens[0].canvas = Canvas::new(NO_CANVAS, self.screens[0].ctx.background);
        self.update = 0;
        self.display = 0;
        self.buffered = false;
        self.buffer = self.client;
        tracing::debug!(window = %self.binding.id, "buffering off");
        Ok(vec![
            self.resize_event(),
            EventKind::Redraw(Rect::from_size(self.client)),
        ])
    }

    fn resize_event(&self) -> EventKind {
        let (cw, ch) = self.cell();
        EventKind::Resize {
            cols: self.client.width / cw,
            rows: self.client.height / ch,
            width: self.client.width,
            height: self.client.height,
        }
    }

    /// Native client area changed.
    pub fn on_resize(&mut self, width: i32, height: i32) -> EventKind {
        self.client = Size::new(width, height);
        if !self.buffered {
            self.buffer = self.client;
        }
        self.resize_event()
    }

    /// Native repaint request; `Some` when the application must redraw.
    pub fn on_paint(
        &mut self,
        display: &mut dyn NativeDisplay,
        rect: Rect,
    ) -> Result<Option<EventKind>> {
        if self.buffered {
            self.restore(display, Some(rect))?;
            Ok(None)
        } else {
            Ok(Some(EventKind::Redraw(rect)))
        }
    }

    /// Ask the native window for a new client size.
    pub fn set_client_size(&mut self, display: &mut dyn NativeDisplay, size: Size) -> Result<()> {
        if size.is_empty() {
            return Err(Error::invalid(format!(
                "client size {}x{}",
                size.width, size.height
            )));
        }
        display.set_client_size(self.native, size)?;
        self.client = size;
        if !self.buffered {
            self.buffer = size;
        }
        Ok(())
    }

    // ── Rendering ──────────────────────────────────────────────────────

    fn shows_updates(&self) -> bool {
        self.visible && (!self.buffered || self.indisp())
    }

    fn render(
        &mut self,
        display: &mut dyn NativeDisplay,
        canvas_op: impl FnOnce(&mut Canvas),
        surface_op: impl FnOnce(&mut dyn NativeDisplay, NativeHandle) -> Result<()>,
    ) -> Result<()> {
        if self.buffered {
            canvas_op(&mut self.screens[self.update].canvas);
        }
        if self.shows_updates() {
            surface_op(display, self.native)?;
        }
        Ok(())
    }

    /// Write text at the cursor, interpreting control characters.
    pub fn write_str(&mut self, display: &mut dyn NativeDisplay, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.put_char(display, ch)?;
        }
        self.update_caret(display)
    }

    fn put_char(&mut self, display: &mut dyn NativeDisplay, ch: char) -> Result<()> {
        match ch {
            '\r' => {
                self.carriage_return();
                Ok(())
            }
            '\n' => {
                self.carriage_return();
                self.down(display)
            }
            '\x08' => self.left(display),
            '\x0c' => self.clear(display),
            '\t' => self.tab(display),
            c if c.is_control() => Ok(()),
            c => self.glyph(display, c),
        }
    }

    fn glyph(&mut self, display: &mut dyn NativeDisplay, c: char) -> Result<()> {
        let ctx = self.ctx();
        let style = ctx.text_style();
        let origin = ctx.pixel_cursor().offset(-1, -1);
        let text = c.to_string();
        self.render(
            display,
            |canvas| canvas.draw_text(origin, &text, &style),
            |d, w| d.draw_text(w, origin, &text, &style),
        )?;
        self.advance(display)
    }

    fn advance(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let cols = self.maxx();
        let (cw, _) = self.cell();
        let ctx = self.ctx();
        let (c, p) = (ctx.char_cursor(), ctx.pixel_cursor());
        if ctx.auto && c.x >= cols {
            self.carriage_return();
            self.down(display)
        } else {
            self.ctx_mut().set_pixel_cursor(p.x.saturating_add(cw), p.y);
            Ok(())
        }
    }

    fn carriage_return(&mut self) {
        let y = self.ctx().pixel_cursor().y;
        self.ctx_mut().set_pixel_cursor(1, y);
    }

    fn tab(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let cols = self.maxx();
        let (cw, _) = self.cell();
        let ctx = self.ctx();
        let (c, y, auto) = (ctx.char_cursor(), ctx.pixel_cursor().y, ctx.auto);
        match ctx.next_tab(c.x) {
            Some(t) if t <= cols || !auto => {
                self.ctx_mut().set_pixel_cursor((t - 1).saturating_mul(cw).saturating_add(1), y);
                Ok(())
            }
            _ if auto => {
                self.carriage_return();
                self.down(display)
            }
            _ => Ok(()),
        }
    }

    /// Cursor up one line; scrolls down at the top edge in auto mode.
    pub fn up(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let (_, ch) = self.cell();
        let ctx = self.ctx();
        let (c, p) = (ctx.char_cursor(), ctx.pixel_cursor());
        if ctx.auto && c.y <= 1 {
            self.scroll(display, 0, -ch)
        } else {
            self.ctx_mut().set_pixel_cursor(p.x, p.y.saturating_sub(ch));
            Ok(())
        }
    }

    /// Cursor down one line; scrolls up at the bottom edge in auto mode.
    pub fn down(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let rows = self.maxy();
        let (_, ch) = self.cell();
        let ctx = self.ctx();
        let (c, p) = (ctx.char_cursor(), ctx.pixel_cursor());
        if ctx.auto && c.y >= rows {
            self.scroll(display, 0, ch)
        } else {
            self.ctx_mut().set_pixel_cursor(p.x, p.y.saturating_add(ch));
            Ok(())
        }
    }

    /// Cursor left one cell; wraps to the end of the previous line in
    /// auto mode.
    pub fn left(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let cols = self.maxx();
        let (cw, _) = self.cell();
        let ctx = self.ctx();
        let (c, p) = (ctx.char_cursor(), ctx.pixel_cursor());
        if ctx.auto && c.x <= 1 {
            self.ctx_mut().set_pixel_cursor((cols - 1).saturating_mul(cw).saturating_add(1), p.y);
            self.up(display)
        } else {
            self.ctx_mut().set_pixel_cursor(p.x.saturating_sub(cw), p.y);
            Ok(())
        }
    }

    /// Cursor right one cell; wraps to the start of the next line in auto
    /// mode.
    pub fn right(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let cols = self.maxx();
        let (cw, _) = self.cell();
        let ctx = self.ctx();
        let (c, p) = (ctx.char_cursor(), ctx.pixel_cursor());
        if ctx.auto && c.x >= cols {
            self.carriage_return();
            self.down(display)
        } else {
            self.ctx_mut().set_pixel_cursor(p.x.saturating_add(cw), p.y);
            Ok(())
        }
    }

    pub fn home(&mut self) {
        self.ctx_mut().set_char_cursor(1, 1);
    }

    /// Clear the update slot to the background and home the cursor.
    pub fn clear(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let color = self.ctx().fill_color();
        let client = Rect::from_size(self.client);
        self.render(
            display,
            |c| c.clear(color),
            |d, w| d.fill_rect(w, client, color),
        )?;
        self.home();
        Ok(())
    }

    /// Scroll the buffer by `(dx, dy)` pixels; positive values move the
    /// content up and left. The vacated band takes the background.
    pub fn scroll(&mut self, display: &mut dyn NativeDisplay, dx: i32, dy: i32) -> Result<()> {
        let fill = self.ctx().fill_color();
        let area = Rect::from_size(self.buffer);
        self.render(
            display,
            |c| {
                let bounds = c.bounds();
                c.scroll(bounds, dx, dy, fill);
            },
            |d, w| d.scroll(w, area, dx, dy, fill),
        )
    }

    // ── Cursor and attributes ─────────────────────────────────────────

    /// Enable or disable auto scroll/wrap. Enabling requires the cursor to
    /// sit on the character grid inside the buffer.
    pub fn set_auto(&mut self, on: bool) -> Result<()> {
        if on {
            let (cols, rows) = (self.maxx(), self.maxy());
            let ctx = self.ctx();
            if !ctx.is_on_grid() || !ctx.in_bounds(cols, rows) {
                return Err(Error::InvalidPosition);
            }
        }
        self.ctx_mut().auto = on;
        Ok(())
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.ctx_mut().set_char_cursor(x, y);
    }

    pub fn set_cursor_px(&mut self, x: i32, y: i32) {
        self.ctx_mut().set_pixel_cursor(x, y);
    }

    /// True when the cursor is inside the buffer.
    pub fn cursor_in_bounds(&self) -> bool {
        self.ctx().in_bounds(self.maxx(), self.maxy())
    }

    pub fn set_attr(&mut self, attr: TextAttrs, on: bool) {
        self.ctx_mut().attrs.set(attr, on);
    }

    pub fn set_foreground(&mut self, color: PackedRgba) {
        self.ctx_mut().foreground = color;
    }

    pub fn set_background(&mut self, color: PackedRgba) {
        self.ctx_mut().background = color;
    }

    pub fn set_foreground_mode(&mut self, mode: MixMode) {
        self.ctx_mut().foreground_mode = mode;
    }

    pub fn set_background_mode(&mut self, mode: MixMode) {
        self.ctx_mut().background_mode = mode;
    }

    /// Switch font at the current cell height.
    pub fn set_font(&mut self, display: &mut dyn NativeDisplay, font: FontId) -> Result<()> {
        let height = self.ctx().metrics().cell_height;
        let metrics = display.font_metrics(font, height)?;
        self.ctx_mut().set_font(font, metrics);
        Ok(())
    }

    /// Change the cell height of the current font.
    pub fn set_font_size(&mut self, display: &mut dyn NativeDisplay, height: i32) -> Result<()> {
        if height <= 0 {
            return Err(Error::invalid(format!("font height {height}")));
        }
        let font = self.ctx().font();
        let metrics = display.font_metrics(font, height)?;
        self.ctx_mut().set_font(font, metrics);
        Ok(())
    }

    pub fn set_viewport_offset(&mut self, offset: Point) {
        self.ctx_mut().viewport.offset = offset;
    }

    pub fn set_viewport_scale(&mut self, logical: Size, physical: Size) -> Result<()> {
        if logical.is_empty() || physical.is_empty() {
            return Err(Error::invalid("empty viewport extent"));
        }
        let vp = &mut self.ctx_mut().viewport;
        vp.logical = logical;
        vp.physical = physical;
        Ok(())
    }

    pub fn set_line_width(&mut self, width: i32) -> Result<()> {
        if width < 1 {
            return Err(Error::invalid(format!("line width {width}")));
        }
        self.ctx_mut().line_width = width;
        Ok(())
    }

    // ── Graphics ───────────────────────────────────────────────────────
    //
    // Coordinates are 1-based logical pixels, mapped through the viewport.

    fn viewport(&self) -> Viewport {
        self.ctx().viewport
    }

    fn map(&self, x: i32, y: i32) -> Point {
        self.viewport().map_point(Point::new(x, y).offset(-1, -1))
    }

    fn map_corners(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Rect {
        self.viewport()
            .map_rect(Rect::from_corners(
                x1.saturating_sub(1),
                y1.saturating_sub(1),
                x2.saturating_sub(1),
                y2.saturating_sub(1),
            ))
    }

    pub fn line(
        &mut self,
        display: &mut dyn NativeDisplay,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        let (a, b) = (self.map(x1, y1), self.map(x2, y2));
        let (color, width) = (self.ctx().foreground, self.ctx().line_width);
        self.render(
            display,
            |c| c.draw_line(a, b, color, width),
            |d, w| d.draw_line(w, a, b, color, width),
        )
    }

    pub fn rect(
        &mut self,
        display: &mut dyn NativeDisplay,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        let r = self.map_corners(x1, y1, x2, y2);
        let (color, width) = (self.ctx().foreground, self.ctx().line_width);
        self.render(
            display,
            |c| c.draw_rect(r, color, width),
            |d, w| {
                if r.is_empty() {
                    return Ok(());
                }
                let (l, t, rt, b) = (r.left(), r.top(), r.right() - 1, r.bottom() - 1);
                d.draw_line(w, Point::new(l, t), Point::new(rt, t), color, width)?;
                d.draw_line(w, Point::new(rt, t), Point::new(rt, b), color, width)?;
                d.draw_line(w, Point::new(rt, b), Point::new(l, b), color, width)?;
                d.draw_line(w, Point::new(l, b), Point::new(l, t), color, width)
            },
        )
    }

    pub fn frect(
        &mut self,
        display: &mut dyn NativeDisplay,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        let r = self.map_corners(x1, y1, x2, y2);
        let color = self.ctx().foreground;
        self.render(
            display,
            |c| c.fill_rect(r, color),
            |d, w| d.fill_rect(w, r, color),
        )
    }

    pub fn ellipse(
        &mut self,
        display: &mut dyn NativeDisplay,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        filled: bool,
    ) -> Result<()> {
        let r = self.map_corners(x1, y1, x2, y2);
        let color = self.ctx().foreground;
        self.render(
            display,
            |c| c.draw_ellipse(r, color, filled),
            |d, w| d.draw_ellipse(w, r, color, filled),
        )
    }

    pub fn set_pixel(&mut self, display: &mut dyn NativeDisplay, x: i32, y: i32) -> Result<()> {
        let at = self.map(x, y);
        let color = self.ctx().foreground;
        self.render(
            display,
            |c| c.set_pixel(at, color),
            |d, w| d.set_pixel(w, at, color),
        )
    }

    /// Stretch picture `slot` into the given corners.
    pub fn draw_picture(
        &mut self,
        display: &mut dyn NativeDisplay,
        slot: usize,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        let picture = self.pictures.get(slot)?.clone();
        let dst = self.map_corners(x1, y1, x2, y2);
        let src = picture.bounds();
        self.render(
            display,
            |c| c.stretch_from(&picture, src, dst),
            |d, w| d.stretch_blit(w, &picture, src, dst),
        )
    }

    // ── Caret ──────────────────────────────────────────────────────────

    /// Show the caret when focused, visible, and in bounds; hide otherwise.
    pub fn update_caret(&mut self, display: &mut dyn NativeDisplay) -> Result<()> {
        let ctx = self.ctx();
        let want = (self.focused
            && self.visible
            && self.indisp()
            && ctx.cursor_visible
            && self.cursor_in_bounds())
        .then(|| ctx.cursor_cell());
        if want != self.caret {
            display.set_caret(self.native, want)?;
            self.caret = want;
        }
        Ok(())
    }

    // ── Input ──────────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: Key) -> Option<EventKind> {
        self.decoder.key_down(key)
    }

    pub fn key_up(&mut self, key: Key) {
        self.decoder.key_up(key);
    }

    /// Record a pointer position in 0-based client pixels.
    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        let m = self.screens[self.display].ctx.metrics();
        self.mouse.moved(x, y, m.cell_width.max(1), m.cell_height.max(1));
    }

    pub fn joystick(&mut self, joy: u8, sample: JoySample) {
        match self.joysticks.iter_mut().find(|t| t.joy() == joy) {
            Some(t) => t.sample(sample),
            None => {
                let mut t = JoystickTracker::new(joy);
                t.sample(sample);
                self.joysticks.push(t);
            }
        }
    }

    /// One pending mouse or joystick event, mouse first.
    pub fn poll_input(&mut self) -> Option<EventKind> {
        self.mouse
            .poll()
            .or_else(|| self.joysticks.iter_mut().find_map(JoystickTracker::poll))
    }

    /// Release per-window resources, returning what needs native cleanup.
    pub fn teardown(&mut self) -> (Vec<NativeTimer>, Vec<WidgetEntry>) {
        self.menu.clear();
        self.pictures.clear();
        (self.timers.drain(), self.widgets.drain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_backend::{Backend, WindowSpec};
    use fwin_core::error::ErrorKind;
    use fwin_headless::{HeadlessBackend, HeadlessDisplay};

    const CELL: FontMetrics = FontMetrics::new(8, 16);

    fn setup(cols: i32, rows: i32) -> (HeadlessDisplay, Window) {
        let (mut display, _events, _dialogs) = HeadlessBackend::new().split().unwrap();
        let size = Size::new(cols * 8, rows * 16);
        let native = display.create_window(&WindowSpec::new("t", size)).unwrap();
        let binding = Binding {
            id: WindowId(1),
            input: FileHandle::STDIN,
            output: FileHandle::STDOUT,
            parent: None,
        };
        (display, Window::new(binding, native, size, CELL))
    }

    fn surface_text(display: &HeadlessDisplay, w: &Window, col: i32, row: i32, n: usize) -> String {
        display
            .surface(w.native)
            .unwrap()
            .text_at((col - 1) * 8, (row - 1) * 16, n, 8)
    }

    #[test]
    fn text_reaches_buffer_and_surface() {
        let (mut d, mut w) = setup(10, 4);
        w.write_str(&mut d, "hi").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(3, 1));
        assert_eq!(w.canvas(1).unwrap().text_at(0, 0, 2, 8), "hi");
        assert_eq!(surface_text(&d, &w, 1, 1, 2), "hi");
    }

    #[test]
    fn one_column_auto_wrap() {
        let (mut d, mut w) = setup(1, 2);
        w.write_str(&mut d, "AB").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(1, 2));
        assert_eq!(w.canvas(1).unwrap().text_at(0, 0, 1, 8), "B");
    }

    #[test]
    fn newline_scrolls_at_bottom() {
        let (mut d, mut w) = setup(5, 2);
        w.write_str(&mut d, "a\nb\nc").unwrap();
        let c = w.canvas(1).unwrap();
        assert_eq!(c.text_at(0, 0, 1, 8), "b");
        assert_eq!(c.text_at(0, 16, 1, 8), "c");
        assert_eq!(w.ctx().char_cursor(), Point::new(2, 2));
    }

    #[test]
    fn no_auto_runs_off_the_edge() {
        let (mut d, mut w) = setup(2, 1);
        w.set_auto(false).unwrap();
        w.write_str(&mut d, "abc").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(4, 1));
        assert!(!w.cursor_in_bounds());
        assert_eq!(w.set_auto(true).unwrap_err().kind(), ErrorKind::InvalidPosition);
    }

    #[test]
    fn auto_rejected_off_grid() {
        let (_d, mut w) = setup(4, 4);
        w.set_cursor_px(3, 1);
        assert_eq!(w.set_auto(true).unwrap_err().kind(), ErrorKind::InvalidPosition);
        w.set_cursor(2, 2);
        assert!(w.set_auto(true).is_ok());
    }

    #[test]
    fn backspace_wraps_to_previous_line() {
        let (mut d, mut w) = setup(3, 3);
        w.set_cursor(1, 2);
        w.write_str(&mut d, "\x08").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(3, 1));
    }

    #[test]
    fn tab_and_control_chars() {
        let (mut d, mut w) = setup(20, 2);
        w.write_str(&mut d, "a\tb\x07").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(10, 1));
        w.write_str(&mut d, "\r").unwrap();
        assert_eq!(w.ctx().char_cursor(), Point::new(1, 1));
        w.write_str(&mut d, "\x0c").unwrap();
        assert_eq!(w.canvas(1).unwrap().text_at(0, 0, 1, 8), " ");
    }

    #[test]
    fn hidden_update_slot_stays_off_surface() {
        let (mut d, mut w) = setup(10, 2);
        w.select(&mut d, 2, 1).unwrap();
        assert!(w.is_live(2));
        assert!(!w.indisp());
        w.write_str(&mut d, "X").unwrap();
        assert_eq!(surface_text(&d, &w, 1, 1, 1), " ");
        w.select(&mut d, 2, 2).unwrap();
        assert_eq!(surface_text(&d, &w, 1, 1, 1), "X");
    }

    #[test]
    fn swap_creates_and_clears_new_slot() {
        let (mut d, mut w) = setup(10, 2);
        w.write_str(&mut d, "old").unwrap();
        w.select(&mut d, 1, 3).unwrap();
        assert!(w.is_live(3));
        assert_eq!(w.canvas(3).unwrap().text_at(0, 0, 3, 8), "   ");
        assert_eq!(surface_text(&d, &w, 1, 1, 3), "   ");
        w.select(&mut d, 3, 1).unwrap();
        assert_eq!(surface_text(&d, &w, 1, 1, 3), "old");
    }

    #[test]
    fn select_rejects_bad_slots() {
        let (mut d, mut w) = setup(4, 4);
        assert!(w.select(&mut d, 0, 1).is_err());
        assert!(w.select(&mut d, 1, MAX_SCREENS + 1).is_err());
    }

    #[test]
    fn restore_pads_outside_buffer() {
        let (mut d, mut w) = setup(2, 1);
        w.frect(&mut d, 1, 1, 16, 16).unwrap();
        w.set_client_size(&mut d, Size::new(32, 32)).unwrap();
        d.fill(w.native, PackedRgba::rgb(1, 2, 3));
        w.restore(&mut d, None).unwrap();
        let s = d.surface(w.native).unwrap();
        assert_eq!(s.color_at(0, 0), Some(PackedRgba::BLACK));
        assert_eq!(s.color_at(31, 31), Some(PackedRgba::WHITE));
    }

    #[test]
    fn restore_region_is_clipped() {
        let (mut d, mut w) = setup(4, 1);
        w.frect(&mut d, 1, 1, 32, 16).unwrap();
        d.fill(w.native, PackedRgba::WHITE);
        w.restore(&mut d, Some(Rect::new(0, 0, 8, 8))).unwrap();
        let s = d.surface(w.native).unwrap();
        assert_eq!(s.color_at(7, 7), Some(PackedRgba::BLACK));
        assert_eq!(s.color_at(9, 9), Some(PackedRgba::WHITE));
    }

    #[test]
    fn paint_is_internal_when_buffered() {
        let (mut d, mut w) = setup(4, 4);
        assert_eq!(w.on_paint(&mut d, Rect::new(0, 0, 4, 4)).unwrap(), None);
        w.set_buffered(&mut d, false).unwrap();
        assert_eq!(
            w.on_paint(&mut d, Rect::new(0, 0, 4, 4)).unwrap(),
            Some(EventKind::Redraw(Rect::new(0, 0, 4, 4)))
        );
    }

    #[test]
    fn unbuffering_collapses_and_notifies() {
        let (mut d, mut w) = setup(4, 2);
        w.select(&mut d, 2, 3).unwrap();
        w.on_resize(80, 64);
        let events = w.set_buffered(&mut d, false).unwrap();
        assert_eq!(
            events,
            vec![
                EventKind::Resize {
                    cols: 10,
                    rows: 4,
                    width: 80,
                    height: 64
                },
                EventKind::Redraw(Rect::new(0, 0, 80, 64)),
            ]
        );
        assert_eq!((w.update_slot(), w.display_slot()), (1, 1));
        assert!(!w.is_live(2));
        assert_eq!(w.buffer_size(), Size::new(80, 64));
        assert_eq!(w.maxx(), 10);
        assert!(w.canvas(1).is_none());
        assert_eq!(w.select(&mut d, 1, 1).unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn rebuffering_restores_size() {
        let (mut d, mut w) = setup(4, 2);
        w.set_buffered(&mut d, false).unwrap();
        w.on_resize(100, 100);
        assert!(w.set_buffered(&mut d, true).unwrap().is_empty());
        assert_eq!(w.buffer_size(), Size::new(32, 32));
        assert!(w.canvas(1).is_some());
    }

    #[test]
    fn unbuffered_draws_direct() {
        let (mut d, mut w) = setup(4, 2);
        w.set_buffered(&mut d, false).unwrap();
        w.write_str(&mut d, "z").unwrap();
        assert_eq!(surface_text(&d, &w, 1, 1, 1), "z");
    }

    #[test]
    fn size_buffer_keeps_content() {
        let (mut d, mut w) = setup(4, 2);
        w.write_str(&mut d, "ok").unwrap();
        w.size_buffer(&mut d, Size::new(80, 16)).unwrap();
        assert_eq!(w.maxx(), 10);
        assert_eq!(w.maxy(), 1);
        assert_eq!(w.canvas(1).unwrap().text_at(0, 0, 2, 8), "ok");
        assert!(w.size_buffer(&mut d, Size::new(0, 5)).is_err());
    }

    #[test]
    fn viewport_scales_graphics() {
        let (mut d, mut w) = setup(4, 2);
        w.set_viewport_scale(Size::new(1, 1), Size::new(2, 2)).unwrap();
        w.set_pixel(&mut d, 3, 3).unwrap();
        assert_eq!(w.canvas(1).unwrap().color_at(4, 4), Some(PackedRgba::BLACK));
        assert!(w.set_viewport_scale(Size::new(0, 1), Size::new(1, 1)).is_err());
    }

    #[test]
    fn pictures_stretch_onto_buffer() {
        let (mut d, mut w) = setup(4, 2);
        w.pictures.load(1, 1, 1, &[PackedRgba::rgb(9, 9, 9)]).unwrap();
        w.draw_picture(&mut d, 1, 1, 1, 4, 4).unwrap();
        assert_eq!(w.canvas(1).unwrap().color_at(3, 3), Some(PackedRgba::rgb(9, 9, 9)));
        assert!(w.draw_picture(&mut d, 2, 1, 1, 4, 4).is_err());
    }

    #[test]
    fn caret_follows_focus() {
        let (mut d, mut w) = setup(4, 2);
        w.focused = true;
        w.update_caret(&mut d).unwrap();
        assert_eq!(d.caret(w.native), Some(Rect::new(0, 0, 8, 16)));
        w.ctx_mut().cursor_visible = false;
        w.update_caret(&mut d).unwrap();
        assert_eq!(d.caret(w.native), None);
    }

    #[test]
    fn mouse_uses_display_metrics() {
        let (_d, mut w) = setup(4, 2);
        w.mouse_moved(17, 20);
        assert_eq!(
            w.poll_input(),
            Some(EventKind::MouseMove { mouse: 1, x: 3, y: 2 })
        );
    }

    #[test]
    fn joystick_trackers_are_created_on_demand() {
        let (_d, mut w) = setup(4, 2);
        let mut sample = JoySample::CENTERED;
        sample.buttons = 0b10;
        w.joystick(2, sample);
        assert_eq!(w.poll_input(), Some(EventKind::JoyAssert { joy: 2, button: 2 }));
        assert_eq!(w.poll_input(), None);
    }
}

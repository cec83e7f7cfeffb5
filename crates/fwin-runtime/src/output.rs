#![forbid(unsafe_code)]

//! Output-stream operations: text, cursor, screens, attributes, graphics,
//! and window management.
//!
//! Every call names the output stream whose window it acts on. Text and
//! cursor coordinates are 1-based characters; graphics coordinates are
//! 1-based pixels passed through the screen's viewport.

use fwin_backend::NativeDisplay;
use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Size};
use fwin_core::handle::FileHandle;
use fwin_render::color::PackedRgba;
use fwin_render::style::{FontId, FontMetrics, MixMode, TextAttrs};

use crate::context::Context;
use crate::window::Window;

impl Context {
    /// Run a cursor-affecting operation, then refresh the caret.
    fn with_cursor(
        &self,
        output: FileHandle,
        f: impl FnOnce(&mut Window, &mut dyn NativeDisplay) -> Result<()>,
    ) -> Result<()> {
        self.with_window(output, |w, d| {
            f(w, d)?;
            w.update_caret(d)
        })
    }

    // ── Text ───────────────────────────────────────────────────────────

    /// Write text at the cursor.
    ///
    /// `\r` returns, `\n` returns and moves down, `\x08` backs up, `\t`
    /// advances to the next tab stop, `\x0c` clears the screen. Other control
    /// characters are ignored.
    pub fn write_str(&self, output: FileHandle, text: &str) -> Result<()> {
        self.with_window(output, |w, d| w.write_str(d, text))
    }

    pub fn clear(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, d| w.clear(d))
    }

    /// Scroll the update screen by `(dx, dy)` pixels; positive values move
    /// the content up and left.
    pub fn scroll(&self, output: FileHandle, dx: i32, dy: i32) -> Result<()> {
        self.with_window(output, |w, d| w.scroll(d, dx, dy))
    }

    // ── Cursor ─────────────────────────────────────────────────────────

    pub fn set_cursor(&self, output: FileHandle, x: i32, y: i32) -> Result<()> {
        self.with_cursor(output, |w, _| {
            w.set_cursor(x, y);
            Ok(())
        })
    }

    pub fn set_cursor_px(&self, output: FileHandle, x: i32, y: i32) -> Result<()> {
        self.with_cursor(output, |w, _| {
            w.set_cursor_px(x, y);
            Ok(())
        })
    }

    /// Character cursor, 1-based.
    pub fn cursor(&self, output: FileHandle) -> Result<Point> {
        self.read_window(output, |w| w.ctx().char_cursor())
    }

    /// Pixel cursor, 1-based.
    pub fn cursor_px(&self, output: FileHandle) -> Result<Point> {
        self.read_window(output, |w| w.ctx().pixel_cursor())
    }

    /// True when the cursor lies inside the buffer.
    pub fn cursor_in_bounds(&self, output: FileHandle) -> Result<bool> {
        self.read_window(output, Window::cursor_in_bounds)
    }

    pub fn home(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, _| {
            w.home();
            Ok(())
        })
    }

    pub fn up(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, d| w.up(d))
    }

    pub fn down(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, d| w.down(d))
    }

    pub fn left(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, d| w.left(d))
    }

    pub fn right(&self, output: FileHandle) -> Result<()> {
        self.with_cursor(output, |w, d| w.right(d))
    }

    /// Enable or disable auto scroll and wrap. Enabling fails with
    /// `InvalidPosition` unless the cursor is on the grid and in bounds.
    pub fn set_auto(&self, output: FileHandle, on: bool) -> Result<()> {
        self.with_window(output, |w, _| w.set_auto(on))
    }

    pub fn auto(&self, output: FileHandle) -> Result<bool> {
        self.read_window(output, |w| w.ctx().auto)
    }

    pub fn set_cursor_visible(&self, output: FileHandle, visible: bool) -> Result<()> {
        self.with_cursor(output, |w, _| {
            w.ctx_mut().cursor_visible = visible;
            Ok(())
        })
    }

    // ── Screens ────────────────────────────────────────────────────────

    /// Select the update and display screens (1-based).
    pub fn select(&self, output: FileHandle, update: usize, display: usize) -> Result<()> {
        self.with_window(output, |w, d| w.select(d, update, display))
    }

    /// True when drawing on `output` goes straight to the visible screen.
    pub fn indisp(&self, output: FileHandle) -> Result<bool> {
        self.read_window(output, Window::indisp)
    }

    /// Switch buffered mode. Turning it off queues `Resize` and `Redraw`.
    pub fn set_buffered(&self, output: FileHandle, on: bool) -> Result<()> {
        {
            let mut guard = self.lock();
            let st = &mut *guard;
            let window = st.registry.by_output_mut(output)?;
            let id = window.id();
            let events = window.set_buffered(st.display.as_mut(), on)?;
            st.display.flush()?;
            for kind in events {
                st.registry.post(id, kind)?;
            }
        }
        self.wake();
        Ok(())
    }

    pub fn is_buffered(&self, output: FileHandle) -> Result<bool> {
        self.read_window(output, Window::is_buffered)
    }

    // ── Colors and attributes ─────────────────────────────────────────

    pub fn set_foreground(&self, output: FileHandle, color: PackedRgba) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_foreground(color);
            Ok(())
        })
    }

    pub fn set_background(&self, output: FileHandle, color: PackedRgba) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_background(color);
            Ok(())
        })
    }

    pub fn set_foreground_mode(&self, output: FileHandle, mode: MixMode) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_foreground_mode(mode);
            Ok(())
        })
    }

    pub fn set_background_mode(&self, output: FileHandle, mode: MixMode) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_background_mode(mode);
            Ok(())
        })
    }

    /// Turn one or more text attributes on or off.
    pub fn set_attr(&self, output: FileHandle, attr: TextAttrs, on: bool) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_attr(attr, on);
            Ok(())
        })
    }

    // ── Tabs ───────────────────────────────────────────────────────────

    pub fn set_tab(&self, output: FileHandle, column: i32) -> Result<()> {
        self.with_window(output, |w, _| w.ctx_mut().set_tab(column))
    }

    pub fn reset_tab(&self, output: FileHandle, column: i32) -> Result<()> {
        self.with_window(output, |w, _| {
            w.ctx_mut().reset_tab(column);
            Ok(())
        })
    }

    pub fn clear_tabs(&self, output: FileHandle) -> Result<()> {
        self.with_window(output, |w, _| {
            w.ctx_mut().clear_tabs();
            Ok(())
        })
    }

    // ── Fonts and sizes ────────────────────────────────────────────────

    pub fn set_font(&self, output: FileHandle, font: FontId) -> Result<()> {
        self.with_cursor(output, |w, d| w.set_font(d, font))
    }

    /// Set the cell height of the current font, in pixels.
    pub fn set_font_size(&self, output: FileHandle, height: i32) -> Result<()> {
        self.with_cursor(output, |w, d| w.set_font_size(d, height))
    }

    /// Fonts the backend offers.
    pub fn font_count(&self) -> u32 {
        self.lock().display.font_count()
    }

    /// Character cell size in pixels.
    pub fn cell_size(&self, output: FileHandle) -> Result<Size> {
        self.read_window(output, |w| {
            let m = w.ctx().metrics();
            Size::new(m.cell_width, m.cell_height)
        })
    }

    /// Buffer width in characters.
    pub fn maxx(&self, output: FileHandle) -> Result<i32> {
        self.read_window(output, Window::maxx)
    }

    /// Buffer height in characters.
    pub fn maxy(&self, output: FileHandle) -> Result<i32> {
        self.read_window(output, Window::maxy)
    }

    /// Buffer width in pixels.
    pub fn maxxg(&self, output: FileHandle) -> Result<i32> {
        self.read_window(output, |w| w.buffer_size().width)
    }

    /// Buffer height in pixels.
    pub fn maxyg(&self, output: FileHandle) -> Result<i32> {
        self.read_window(output, |w| w.buffer_size().height)
    }

    /// Resize the buffer to `cols` x `rows` characters.
    pub fn size_buffer(&self, output: FileHandle, cols: i32, rows: i32) -> Result<()> {
        self.with_cursor(output, |w, d| {
            let size = cells_to_pixels(w.ctx().metrics(), cols, rows)?;
            w.size_buffer(d, size)
        })
    }

    /// Resize the buffer to `width` x `height` pixels.
    pub fn size_buffer_px(&self, output: FileHandle, width: i32, height: i32) -> Result<()> {
        self.with_cursor(output, |w, d| w.size_buffer(d, Size::new(width, height)))
    }

    /// Ask for a client area of `cols` x `rows` characters.
    pub fn set_client_size(&self, output: FileHandle, cols: i32, rows: i32) -> Result<()> {
        self.with_window(output, |w, d| {
            let size = cells_to_pixels(w.ctx().metrics(), cols, rows)?;
            w.set_client_size(d, size)
        })
    }

    pub fn set_client_size_px(&self, output: FileHandle, width: i32, height: i32) -> Result<()> {
        self.with_window(output, |w, d| w.set_client_size(d, Size::new(width, height)))
    }

    // ── Viewport ───────────────────────────────────────────────────────

    pub fn set_viewport_offset(&self, output: FileHandle, x: i32, y: i32) -> Result<()> {
        self.with_window(output, |w, _| {
            w.set_viewport_offset(Point::new(x, y));
            Ok(())
        })
    }

    /// Map `logical` units onto `physical` pixels for graphics calls.
    pub fn set_viewport_scale(
        &self,
        output: FileHandle,
        logical: Size,
        physical: Size,
    ) -> Result<()> {
        self.with_window(output, |w, _| w.set_viewport_scale(logical, physical))
    }

    // ── Graphics ───────────────────────────────────────────────────────

    pub fn line(&self, output: FileHandle, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.with_window(output, |w, d| w.line(d, x1, y1, x2, y2))
    }

    pub fn rect(&self, output: FileHandle, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.with_window(output, |w, d| w.rect(d, x1, y1, x2, y2))
    }

    pub fn frect(&self, output: FileHandle, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.with_window(output, |w, d| w.frect(d, x1, y1, x2, y2))
    }

    pub fn ellipse(&self, output: FileHandle, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.with_window(output, |w, d| w.ellipse(d, x1, y1, x2, y2, false))
    }

    pub fn fellipse(
        &self,
        output: FileHandle,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        self.with_window(output, |w, d| w.ellipse(d, x1, y1, x2, y2, true))
    }

    pub fn set_pixel(&self, output: FileHandle, x: i32, y: i32) -> Result<()> {
        self.with_window(output, |w, d| w.set_pixel(d, x, y))
    }

    pub fn set_line_width(&self, output: FileHandle, width: i32) -> Result<()> {
        self.with_window(output, |w, _| w.set_line_width(width))
    }

    // ── Window management ──────────────────────────────────────────────

    pub fn set_title(&self, output: FileHandle, title: &str) -> Result<()> {
        self.with_window(output, |w, d| {
            d.set_title(w.native, title)?;
            w.title = title.to_owned();
            Ok(())
        })
    }

    /// Show or hide the window. Showing a buffered window repaints it.
    pub fn set_visible(&self, output: FileHandle, visible: bool) -> Result<()> {
        self.with_cursor(output, |w, d| {
            d.set_visible(w.native, visible)?;
            w.visible = visible;
            if visible {
                w.restore(d, None)?;
            }
            Ok(())
        })
    }

    /// Raise the window above its siblings.
    pub fn front(&self, output: FileHandle) -> Result<()> {
        self.with_window(output, |w, d| d.raise(w.native, true))
    }

    /// Lower the window below its siblings.
    pub fn back(&self, output: FileHandle) -> Result<()> {
        self.with_window(output, |w, d| d.raise(w.native, false))
    }

    /// Repaint the whole window from its display screen.
    pub fn restore(&self, output: FileHandle) -> Result<()> {
        self.with_window(output, |w, d| {
            if w.is_buffered() {
                w.restore(d, None)
            } else {
                Err(Error::Unsupported("restore on an unbuffered window"))
            }
        })
    }
}

/// Pixel size of `cols` x `rows` cells.
fn cells_to_pixels(metrics: FontMetrics, cols: i32, rows: i32) -> Result<Size> {
    match (
        cols.checked_mul(metrics.cell_width),
        rows.checked_mul(metrics.cell_height),
    ) {
        (Some(width), Some(height)) => Ok(Size::new(width, height)),
        _ => Err(Error::invalid(format!("{cols}x{rows} characters"))),
    }
}

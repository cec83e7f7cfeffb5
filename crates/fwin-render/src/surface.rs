#![forbid(unsafe_code)]

//! The 2-D drawing capability a backend provides for its native windows.
//!
//! Everything here is in physical pixels, 0-based, relative to the client
//! area of the addressed window. Backends clip; callers do not need to.

use fwin_core::error::Result;
use fwin_core::geometry::{Point, Rect, Size};
use fwin_core::handle::NativeHandle;

use crate::canvas::Canvas;
use crate::color::PackedRgba;
use crate::style::{FontId, FontMetrics, TextStyle};

/// Drawing primitives on a native window.
pub trait DrawingSurface {
    /// Client area size in pixels.
    fn surface_size(&self, window: NativeHandle) -> Result<Size>;

    fn fill_rect(&mut self, window: NativeHandle, rect: Rect, color: PackedRgba) -> Result<()>;

    fn set_pixel(&mut self, window: NativeHandle, at: Point, color: PackedRgba) -> Result<()>;

    fn draw_line(
        &mut self,
        window: NativeHandle,
        from: Point,
        to: Point,
        color: PackedRgba,
        width: i32,
    ) -> Result<()>;

    fn draw_ellipse(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        color: PackedRgba,
        filled: bool,
    ) -> Result<()>;

    /// Draw a run of text with its first cell's top-left at `origin`.
    fn draw_text(
        &mut self,
        window: NativeHandle,
        origin: Point,
        text: &str,
        style: &TextStyle,
    ) -> Result<()>;

    /// Copy `src_rect` of an off-screen canvas to `dst`.
    fn blit(
        &mut self,
        window: NativeHandle,
        src: &Canvas,
        src_rect: Rect,
        dst: Point,
    ) -> Result<()>;

    /// Copy `src_rect` of a canvas scaled into `dst_rect`.
    fn stretch_blit(
        &mut self,
        window: NativeHandle,
        src: &Canvas,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<()>;

    /// Scroll the contents of `rect` by `(-dx, -dy)`, filling the vacated band.
    fn scroll(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        dx: i32,
        dy: i32,
        fill: PackedRgba,
    ) -> Result<()>;

    /// Metrics of `font` at the requested cell height.
    fn font_metrics(&self, font: FontId, height: i32) -> Result<FontMetrics>;

    /// Number of installed fonts. Font 1 always exists.
    fn font_count(&self) -> u32 {
        1
    }
}

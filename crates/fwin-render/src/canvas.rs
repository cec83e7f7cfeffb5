#![forbid(unsafe_code)]

//! In-memory drawing surface.
//!
//! A `Canvas` is a 2D grid of [`Pixel`]s. Text is kept as glyph anchors: a
//! glyph drawn at a pixel position is recorded on that pixel and the cell it
//! covers is painted with the background. This is enough for backends that
//! have no real rasterizer (the headless backend, the character terminal)
//! and for tests that need to read text back.
//!
//! # Layout
//!
//! Pixels are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `pixels.len() == width * height`
//! 2. Every mutating operation clips to the canvas bounds
//! 3. Filling a region removes the glyph anchors inside it

use fwin_core::geometry::{Point, Rect, Size};

use crate::color::PackedRgba;
use crate::style::{MixMode, TextAttrs, TextStyle};

/// A glyph anchored at a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub foreground: PackedRgba,
    pub attrs: TextAttrs,
}

/// One pixel and the glyph anchored on it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub color: PackedRgba,
    pub glyph: Option<Glyph>,
}

/// A 2D grid of pixels with glyph anchors.
///
/// # Example
///
/// ```
/// use fwin_core::geometry::{Point, Size};
/// use fwin_render::canvas::Canvas;
/// use fwin_render::color::PackedRgba;
///
/// let mut canvas = Canvas::new(Size::new(16, 8), PackedRgba::WHITE);
/// canvas.set_pixel(Point::new(3, 2), PackedRgba::BLACK);
/// assert_eq!(canvas.color_at(3, 2), Some(PackedRgba::BLACK));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<Pixel>,
}

impl Canvas {
    /// Create a canvas filled with `fill`. Negative sizes become empty.
    pub fn new(size: Size, fill: PackedRgba) -> Self {
        let width = size.width.max(0);
        let height = size.height.max(0);
        let pixel = Pixel {
            color: fill,
            glyph: None,
        };
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding rect of the entire canvas.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Pixel at `(x, y)`, `None` out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Pixel> {
        self.index(x, y).map(|i| &self.pixels[i])
    }

    /// Color at `(x, y)`.
    pub fn color_at(&self, x: i32, y: i32) -> Option<PackedRgba> {
        self.get(x, y).map(|p| p.color)
    }

    /// Glyph anchored at `(x, y)`.
    pub fn glyph_at(&self, x: i32, y: i32) -> Option<Glyph> {
        self.get(x, y).and_then(|p| p.glyph)
    }

    fn mix(dst: PackedRgba, src: PackedRgba, mode: MixMode) -> PackedRgba {
        match mode {
            MixMode::Overwrite => src,
            MixMode::Invisible => dst,
            MixMode::Xor => dst.inverted(),
        }
    }

    /// Set one pixel, ignoring out-of-bounds coordinates.
    pub fn set_pixel(&mut self, at: Point, color: PackedRgba) {
        self.set_pixel_mixed(at, color, MixMode::Overwrite);
    }

    fn set_pixel_mixed(&mut self, at: Point, color: PackedRgba, mode: MixMode) {
        if let Some(i) = self.index(at.x, at.y) {
            let px = &mut self.pixels[i];
            px.color = Self::mix(px.color, color, mode);
        }
    }

    /// Fill `rect` (clipped) with `color`, removing glyph anchors in it.
    pub fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        self.fill_rect_mixed(rect, color, MixMode::Overwrite);
    }

    fn fill_rect_mixed(&mut self, rect: Rect, color: PackedRgba, mode: MixMode) {
        let Some(clip) = rect.intersection_opt(&self.bounds()) else {
            return;
        };
        for y in clip.top()..clip.bottom() {
            for x in clip.left()..clip.right() {
                if let Some(i) = self.index(x, y) {
                    let px = &mut self.pixels[i];
                    px.color = Self::mix(px.color, color, mode);
                    if mode != MixMode::Invisible {
                        px.glyph = None;
                    }
                }
            }
        }
    }

    /// Fill the whole canvas.
    pub fn clear(&mut self, color: PackedRgba) {
        for px in &mut self.pixels {
            *px = Pixel {
                color,
                glyph: None,
            };
        }
    }

    /// Draw `text` with its first cell's top-left at `origin`.
    ///
    /// Each character occupies one cell of `style.metrics`; the cell is
    /// painted with the background (unless the background mode is
    /// invisible) and the glyph is anchored at the cell's top-left pixel.
    pub fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        let (fg, bg) = style.effective_colors();
        let cw = style.metrics.cell_width.max(1);
        let ch = style.metrics.cell_height.max(1);
        let mut x = origin.x;
        for c in text.chars() {
            let cell = Rect::new(x, origin.y, cw, ch);
            if style.background_mode != MixMode::Invisible {
                self.fill_rect_mixed(cell, bg, style.background_mode);
            }
            if style.foreground_mode != MixMode::Invisible {
                if let Some(i) = self.index(x, origin.y) {
                    self.pixels[i].glyph = Some(Glyph {
                        ch: c,
                        foreground: fg,
                        attrs: style.attrs,
                    });
                }
            }
            x = x.saturating_add(cw);
        }
    }

    /// Read `count` cells of text starting at pixel `(x, y)`, stepping by
    /// `cell_width`. Cells without a glyph read as spaces.
    pub fn text_at(&self, x: i32, y: i32, count: usize, cell_width: i32) -> String {
        let step = cell_width.max(1);
        (0..count)
            .map(|i| {
                self.glyph_at(x + step * i as i32, y)
                    .map_or(' ', |g| g.ch)
            })
            .collect()
    }

    /// Copy a region of `src` to `dst` in this canvas, clipped on both sides.
    pub fn copy_from(&mut self, src: &Canvas, src_rect: Rect, dst: Point) {
        let Some(from) = src_rect.intersection_opt(&src.bounds()) else {
            return;
        };
        let shift_x = dst.x - src_rect.x;
        let shift_y = dst.y - src_rect.y;
        for sy in from.top()..from.bottom() {
            for sx in from.left()..from.right() {
                if let (Some(si), Some(di)) =
                    (src.index(sx, sy), self.index(sx + shift_x, sy + shift_y))
                {
                    self.pixels[di] = src.pixels[si];
                }
            }
        }
    }

    /// Copy `src_rect` of `src` scaled into `dst_rect` (nearest neighbour).
    pub fn stretch_from(&mut self, src: &Canvas, src_rect: Rect, dst_rect: Rect) {
        if src_rect.is_empty() || dst_rect.is_empty() {
            return;
        }
        for dy in 0..dst_rect.height {
            for dx in 0..dst_rect.width {
                let sx = src_rect.x + (i64::from(dx) * i64::from(src_rect.width)
                    / i64::from(dst_rect.width)) as i32;
                let sy = src_rect.y + (i64::from(dy) * i64::from(src_rect.height)
                    / i64::from(dst_rect.height)) as i32;
                if let Some(px) = src.get(sx, sy).copied() {
                    self.set_pixel(Point::new(dst_rect.x + dx, dst_rect.y + dy), px.color);
                }
            }
        }
    }

    /// Shift the contents of `rect` by `(-dx, -dy)` and fill the vacated band.
    ///
    /// Positive `dy` moves content up (text scrolls up); positive `dx` moves
    /// content left.
    pub fn scroll(&mut self, rect: Rect, dx: i32, dy: i32, fill: PackedRgba) {
        let Some(area) = rect.intersection_opt(&self.bounds()) else {
            return;
        };
        let snapshot = self.clone();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let (sx, sy) = (x.saturating_add(dx), y.saturating_add(dy));
                let replacement = if area.contains(sx, sy) {
                    snapshot.get(sx, sy).copied().unwrap_or_default()
                } else {
                    Pixel {
                        color: fill,
                        glyph: None,
                    }
                };
                if let Some(i) = self.index(x, y) {
                    self.pixels[i] = replacement;
                }
            }
        }
    }

    /// Draw a line of `width` pixels between two points (inclusive).
    pub fn draw_line(&mut self, from: Point, to: Point, color: PackedRgba, width: i32) {
        let half = (width.max(1) - 1) / 2;
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if half == 0 {
                self.set_pixel(Point::new(x, y), color);
            } else {
                self.fill_rect(
                    Rect::new(x - half, y - half, half * 2 + 1, half * 2 + 1),
                    color,
                );
            }
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a rectangle outline.
    pub fn draw_rect(&mut self, rect: Rect, color: PackedRgba, width: i32) {
        if rect.is_empty() {
            return;
        }
        let (l, t) = (rect.left(), rect.top());
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        self.draw_line(Point::new(l, t), Point::new(r, t), color, width);
        self.draw_line(Point::new(r, t), Point::new(r, b), color, width);
        self.draw_line(Point::new(r, b), Point::new(l, b), color, width);
        self.draw_line(Point::new(l, b), Point::new(l, t), color, width);
    }

    /// Draw an ellipse inscribed in `rect`, outlined or filled.
    pub fn draw_ellipse(&mut self, rect: Rect, color: PackedRgba, filled: bool) {
        if rect.is_empty() {
            return;
        }
        let rx = f64::from(rect.width) / 2.0;
        let ry = f64::from(rect.height) / 2.0;
        let cx = f64::from(rect.x) + rx;
        let cy = f64::from(rect.y) + ry;
        for y in rect.top()..rect.bottom() {
            let ny = (f64::from(y) + 0.5 - cy) / ry;
            let span = (1.0 - ny * ny).max(0.0).sqrt() * rx;
            let left = (cx - span).round() as i32;
            let right = (cx + span).round() as i32 - 1;
            if right < left {
                continue;
            }
            if filled {
                self.fill_rect(Rect::new(left, y, right - left + 1, 1), color);
            } else {
                self.set_pixel(Point::new(left, y), color);
                self.set_pixel(Point::new(right, y), color);
            }
        }
    }

    /// Check if two canvases have identical content.
    pub fn content_eq(&self, other: &Canvas) -> bool {
        self == other
    }
}

impl Default for Canvas {
    /// Create a 1x1 white canvas.
    fn default() -> Self {
        Self::new(Size::new(1, 1), PackedRgba::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontId, FontMetrics};

    fn style() -> TextStyle {
        TextStyle {
            foreground: PackedRgba::BLACK,
            background: PackedRgba::WHITE,
            attrs: TextAttrs::empty(),
            font: FontId::TERMINAL,
            metrics: FontMetrics::new(2, 3),
            foreground_mode: MixMode::Overwrite,
            background_mode: MixMode::Overwrite,
        }
    }

    #[test]
    fn canvas_creation() {
        let c = Canvas::new(Size::new(4, 3), PackedRgba::WHITE);
        assert_eq!(c.size(), Size::new(4, 3));
        assert_eq!(c.color_at(3, 2), Some(PackedRgba::WHITE));
        assert_eq!(c.color_at(4, 0), None);
    }

    #[test]
    fn negative_size_is_empty() {
        let c = Canvas::new(Size::new(-1, 5), PackedRgba::WHITE);
        assert_eq!(c.size(), Size::new(0, 5));
        assert!(c.get(0, 0).is_none());
    }

    #[test]
    fn fill_clips_and_clears_glyphs() {
        let mut c = Canvas::new(Size::new(10, 6), PackedRgba::WHITE);
        c.draw_text(Point::new(0, 0), "ab", &style());
        c.fill_rect(Rect::new(-5, -5, 7, 7), PackedRgba::BLACK);
        assert_eq!(c.color_at(0, 0), Some(PackedRgba::BLACK));
        assert_eq!(c.glyph_at(0, 0), None);
        assert_eq!(c.glyph_at(2, 0).map(|g| g.ch), Some('b'));
    }

    #[test]
    fn text_round_trips_through_text_at() {
        let mut c = Canvas::new(Size::new(20, 6), PackedRgba::WHITE);
        c.draw_text(Point::new(2, 3), "hey", &style());
        assert_eq!(c.text_at(2, 3, 4, 2), "hey ");
    }

    #[test]
    fn invisible_background_keeps_pixels() {
        let mut c = Canvas::new(Size::new(4, 4), PackedRgba::BLACK);
        let mut s = style();
        s.background_mode = MixMode::Invisible;
        c.draw_text(Point::new(0, 0), "x", &s);
        assert_eq!(c.color_at(1, 1), Some(PackedRgba::BLACK));
        assert_eq!(c.glyph_at(0, 0).map(|g| g.ch), Some('x'));
    }

    #[test]
    fn copy_from_clips() {
        let mut src = Canvas::new(Size::new(4, 4), PackedRgba::BLACK);
        src.draw_text(Point::new(0, 0), "q", &style());
        let mut dst = Canvas::new(Size::new(3, 3), PackedRgba::WHITE);
        dst.copy_from(&src, Rect::new(0, 0, 10, 10), Point::new(1, 1));
        assert_eq!(dst.color_at(0, 0), Some(PackedRgba::WHITE));
        assert_eq!(dst.color_at(2, 2), Some(PackedRgba::BLACK));
        assert_eq!(dst.glyph_at(1, 1).map(|g| g.ch), Some('q'));
    }

    #[test]
    fn scroll_up_fills_bottom_band() {
        let mut c = Canvas::new(Size::new(2, 3), PackedRgba::WHITE);
        c.set_pixel(Point::new(0, 2), PackedRgba::BLACK);
        c.scroll(c.bounds(), 0, 1, PackedRgba::rgb(9, 9, 9));
        assert_eq!(c.color_at(0, 1), Some(PackedRgba::BLACK));
        assert_eq!(c.color_at(0, 2), Some(PackedRgba::rgb(9, 9, 9)));
        assert_eq!(c.color_at(1, 2), Some(PackedRgba::rgb(9, 9, 9)));
    }

    #[test]
    fn scroll_left_fills_right_band() {
        let mut c = Canvas::new(Size::new(3, 1), PackedRgba::WHITE);
        c.set_pixel(Point::new(2, 0), PackedRgba::BLACK);
        c.scroll(c.bounds(), 2, 0, PackedRgba::WHITE);
        assert_eq!(c.color_at(0, 0), Some(PackedRgba::BLACK));
        assert_eq!(c.color_at(2, 0), Some(PackedRgba::WHITE));
    }

    #[test]
    fn line_endpoints_are_drawn() {
        let mut c = Canvas::new(Size::new(10, 10), PackedRgba::WHITE);
        c.draw_line(Point::new(1, 1), Point::new(8, 5), PackedRgba::BLACK, 1);
        assert_eq!(c.color_at(1, 1), Some(PackedRgba::BLACK));
        assert_eq!(c.color_at(8, 5), Some(PackedRgba::BLACK));
    }

    #[test]
    fn filled_ellipse_covers_center_not_corners() {
        let mut c = Canvas::new(Size::new(10, 10), PackedRgba::WHITE);
        c.draw_ellipse(Rect::new(0, 0, 10, 10), PackedRgba::BLACK, true);
        assert_eq!(c.color_at(5, 5), Some(PackedRgba::BLACK));
        assert_eq!(c.color_at(0, 0), Some(PackedRgba::WHITE));
    }

    #[test]
    fn stretch_doubles() {
        let mut src = Canvas::new(Size::new(1, 1), PackedRgba::BLACK);
        src.set_pixel(Point::new(0, 0), PackedRgba::rgb(1, 2, 3));
        let mut dst = Canvas::new(Size::new(4, 4), PackedRgba::WHITE);
        dst.stretch_from(&src, src.bounds(), Rect::new(1, 1, 2, 2));
        assert_eq!(dst.color_at(2, 2), Some(PackedRgba::rgb(1, 2, 3)));
        assert_eq!(dst.color_at(3, 3), Some(PackedRgba::WHITE));
    }
}

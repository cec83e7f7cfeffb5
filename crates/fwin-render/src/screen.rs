#![forbid(unsafe_code)]

//! Per-buffer cursor and attribute state.
//!
//! A [`ScreenContext`] holds everything that is independent per screen slot
//! of a window: the cursor in both character and pixel units, colors, text
//! attributes, the active font and its metrics, auto scroll/wrap, cursor
//! visibility, the graphics viewport, and the tab table.
//!
//! Coordinates are 1-based in both units. The character cursor is always
//! derived from the pixel cursor:
//!
//! ```text
//! char = (pixel - 1) / cell + 1      (per axis, floor division)
//! ```

use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Rect, Size};

use crate::color::PackedRgba;
use crate::style::{FontId, FontMetrics, MixMode, TextAttrs, TextStyle};

/// Maximum number of tab stops per screen.
pub const MAX_TABS: usize = 50;

/// Spacing of the default tab stops, in columns.
pub const DEFAULT_TAB_SPACING: i32 = 8;

/// Logical to physical mapping for graphics coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Added after scaling.
    pub offset: Point,
    /// Logical extent.
    pub logical: Size,
    /// Physical extent the logical extent maps onto.
    pub physical: Size,
}

impl Viewport {
    /// Identity mapping.
    pub const IDENTITY: Self = Self {
        offset: Point::new(0, 0),
        logical: Size::new(1, 1),
        physical: Size::new(1, 1),
    };

    fn scale(v: i32, logical: i32, physical: i32) -> i32 {
        if logical == physical || logical == 0 {
            return v;
        }
        (i64::from(v) * i64::from(physical) / i64::from(logical)) as i32
    }

    /// Map a logical point to physical pixels.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            Self::scale(p.x, self.logical.width, self.physical.width) + self.offset.x,
            Self::scale(p.y, self.logical.height, self.physical.height) + self.offset.y,
        )
    }

    /// Map a logical rect to physical pixels.
    #[must_use]
    pub fn map_rect(&self, r: Rect) -> Rect {
        let a = self.map_point(Point::new(r.left(), r.top()));
        let b = self.map_point(Point::new(r.right(), r.bottom()));
        Rect::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Cursor, attribute, and font state for one screen slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenContext {
    pixel_cursor: Point,
    char_cursor: Point,
    pub foreground: PackedRgba,
    pub background: PackedRgba,
    pub attrs: TextAttrs,
    pub foreground_mode: MixMode,
    pub background_mode: MixMode,
    font: FontId,
    metrics: FontMetrics,
    /// Scroll and wrap at the buffer edges.
    pub auto: bool,
    pub cursor_visible: bool,
    pub line_width: i32,
    pub viewport: Viewport,
    tabs: Vec<i32>,
}

impl ScreenContext {
    /// Fresh context: cursor home, black on white, auto on, default tabs.
    pub fn new(metrics: FontMetrics) -> Self {
        let mut ctx = Self {
            pixel_cursor: Point::new(1, 1),
            char_cursor: Point::new(1, 1),
            foreground: PackedRgba::BLACK,
            background: PackedRgba::WHITE,
            attrs: TextAttrs::empty(),
            foreground_mode: MixMode::Overwrite,
            background_mode: MixMode::Overwrite,
            font: FontId::TERMINAL,
            metrics,
            auto: true,
            cursor_visible: true,
            line_width: 1,
            viewport: Viewport::IDENTITY,
            tabs: Vec::new(),
        };
        ctx.reset_tabs();
        ctx
    }

    #[inline]
    pub const fn char_cursor(&self) -> Point {
        self.char_cursor
    }

    #[inline]
    pub const fn pixel_cursor(&self) -> Point {
        self.pixel_cursor
    }

    #[inline]
    pub const fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[inline]
    pub const fn font(&self) -> FontId {
        self.font
    }

    fn cell(&self) -> (i32, i32) {
        (
            self.metrics.cell_width.max(1),
            self.metrics.cell_height.max(1),
        )
    }

    fn sync_char(&mut self) {
        let (cw, ch) = self.cell();
        self.char_cursor = Point::new(
            cell_of(self.pixel_cursor.x, cw),
            cell_of(self.pixel_cursor.y, ch),
        );
    }

    /// Move the cursor in character units. Positions beyond the pixel range
    /// saturate, and the character cursor follows the saturated pixel.
    pub fn set_char_cursor(&mut self, x: i32, y: i32) {
        let (cw, ch) = self.cell();
        self.pixel_cursor = Point::new(pixel_of(x, cw), pixel_of(y, ch));
        self.sync_char();
    }

    /// Move the cursor in pixel units.
    pub fn set_pixel_cursor(&mut self, x: i32, y: i32) {
        self.pixel_cursor = Point::new(x, y);
        self.sync_char();
    }

    /// Switch font. The pixel cursor stays put; the character cursor follows.
    pub fn set_font(&mut self, font: FontId, metrics: FontMetrics) {
        self.font = font;
        self.metrics = metrics;
        self.sync_char();
    }

    /// True when the pixel cursor sits on a character cell boundary.
    pub fn is_on_grid(&self) -> bool {
        let (cw, ch) = self.cell();
        self.pixel_cursor.x.saturating_sub(1).rem_euclid(cw) == 0
            && self.pixel_cursor.y.saturating_sub(1).rem_euclid(ch) == 0
    }

    /// True when the character cursor lies inside a `cols` x `rows` grid.
    pub fn in_bounds(&self, cols: i32, rows: i32) -> bool {
        let c = self.char_cursor;
        c.x >= 1 && c.y >= 1 && c.x <= cols && c.y <= rows
    }

    /// Pixel rect of the character cell under the cursor (0-based).
    pub fn cursor_cell(&self) -> Rect {
        let (cw, ch) = self.cell();
        let origin = self.pixel_cursor.offset(-1, -1);
        Rect::new(origin.x, origin.y, cw, ch)
    }

    /// Style for drawing text at the cursor.
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            foreground: self.foreground,
            background: self.background,
            attrs: self.attrs,
            font: self.font,
            metrics: self.metrics,
            foreground_mode: self.foreground_mode,
            background_mode: self.background_mode,
        }
    }

    /// Background after reverse video, used for clears and scroll fill.
    pub fn fill_color(&self) -> PackedRgba {
        self.text_style().effective_colors().1
    }

    // ── Tabs ────────────────────────────────────────────────────────────

    /// Tab stops, ascending, in columns.
    pub fn tabs(&self) -> &[i32] {
        &self.tabs
    }

    /// Restore the default stops (every [`DEFAULT_TAB_SPACING`] columns).
    pub fn reset_tabs(&mut self) {
        self.tabs = (1..=MAX_TABS as i32)
            .map(|n| n * DEFAULT_TAB_SPACING + 1)
            .collect();
    }

    /// Remove every stop.
    pub fn clear_tabs(&mut self) {
        self.tabs.clear();
    }

    /// Add a stop at `column`.
    pub fn set_tab(&mut self, column: i32) -> Result<()> {
        if column < 1 {
            return Err(Error::invalid(format!("tab column {column}")));
        }
        match self.tabs.binary_search(&column) {
            Ok(_) => Ok(()),
            Err(_) if self.tabs.len() >= MAX_TABS => Err(Error::TableExhausted("tab stops")),
            Err(pos) => {
                self.tabs.insert(pos, column);
                Ok(())
            }
        }
    }

    /// Remove the stop at `column`, if any.
    pub fn reset_tab(&mut self, column: i32) {
        self.tabs.retain(|&t| t != column);
    }

    /// First stop strictly right of `column`.
    pub fn next_tab(&self, column: i32) -> Option<i32> {
        self.tabs.iter().copied().find(|&t| t > column)
    }
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self::new(FontMetrics::default())
    }
}

/// 1-based cell holding 1-based pixel `p`.
fn cell_of(p: i32, size: i32) -> i32 {
    p.saturating_sub(1).div_euclid(size) + 1
}

/// First 1-based pixel of 1-based cell `c`, saturating.
fn pixel_of(c: i32, size: i32) -> i32 {
    c.saturating_sub(1).saturating_mul(size).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_home_and_on_grid() {
        let ctx = ScreenContext::new(FontMetrics::new(8, 16));
        assert_eq!(ctx.char_cursor(), Point::new(1, 1));
        assert_eq!(ctx.pixel_cursor(), Point::new(1, 1));
        assert!(ctx.is_on_grid());
        assert!(ctx.auto);
    }

    #[test]
    fn char_move_updates_pixels() {
        let mut ctx = ScreenContext::new(FontMetrics::new(8, 16));
        ctx.set_char_cursor(3, 2);
        assert_eq!(ctx.pixel_cursor(), Point::new(17, 17));
    }

    #[test]
    fn pixel_move_off_grid() {
        let mut ctx = ScreenContext::new(FontMetrics::new(8, 16));
        ctx.set_pixel_cursor(20, 17);
        assert_eq!(ctx.char_cursor(), Point::new(3, 2));
        assert!(!ctx.is_on_grid());
    }

    #[test]
    fn negative_pixels_floor() {
        let mut ctx = ScreenContext::new(FontMetrics::new(8, 16));
        ctx.set_pixel_cursor(-7, 1);
        assert_eq!(ctx.char_cursor(), Point::new(0, 1));
        ctx.set_pixel_cursor(-8, 1);
        assert_eq!(ctx.char_cursor(), Point::new(-1, 1));
    }

    #[test]
    fn bounds_check() {
        let mut ctx = ScreenContext::new(FontMetrics::UNIT);
        assert!(ctx.in_bounds(1, 1));
        ctx.set_char_cursor(2, 1);
        assert!(!ctx.in_bounds(1, 1));
        ctx.set_char_cursor(0, 1);
        assert!(!ctx.in_bounds(5, 5));
    }

    #[test]
    fn font_switch_keeps_pixel_position() {
        let mut ctx = ScreenContext::new(FontMetrics::new(8, 16));
        ctx.set_char_cursor(3, 3);
        ctx.set_font(FontId(2), FontMetrics::new(16, 16));
        assert_eq!(ctx.pixel_cursor(), Point::new(17, 33));
        assert_eq!(ctx.char_cursor(), Point::new(2, 3));
    }

    #[test]
    fn default_tabs_every_eight() {
        let ctx = ScreenContext::default();
        assert_eq!(ctx.next_tab(1), Some(9));
        assert_eq!(ctx.next_tab(9), Some(17));
        assert_eq!(ctx.tabs().len(), MAX_TABS);
    }

    #[test]
    fn tab_table_edits() {
        let mut ctx = ScreenContext::default();
        ctx.clear_tabs();
        assert_eq!(ctx.next_tab(1), None);
        ctx.set_tab(5).unwrap();
        ctx.set_tab(3).unwrap();
        ctx.set_tab(5).unwrap();
        assert_eq!(ctx.tabs(), &[3, 5]);
        ctx.reset_tab(3);
        assert_eq!(ctx.next_tab(1), Some(5));
        assert!(ctx.set_tab(0).is_err());
    }

    #[test]
    fn tab_table_full() {
        let mut ctx = ScreenContext::default();
        let err = ctx.set_tab(4).unwrap_err();
        assert_eq!(err.kind(), fwin_core::error::ErrorKind::TableExhausted);
    }

    #[test]
    fn reverse_fill_uses_foreground() {
        let mut ctx = ScreenContext::default();
        ctx.attrs |= TextAttrs::REVERSE;
        assert_eq!(ctx.fill_color(), PackedRgba::BLACK);
    }

    #[test]
    fn viewport_scales_then_offsets() {
        let vp = Viewport {
            offset: Point::new(10, 0),
            logical: Size::new(100, 100),
            physical: Size::new(50, 200),
        };
        assert_eq!(vp.map_point(Point::new(20, 20)), Point::new(20, 40));
        assert_eq!(
            vp.map_rect(Rect::new(0, 0, 10, 10)),
            Rect::new(10, 0, 5, 20)
        );
    }

    #[test]
    fn extreme_positions_saturate() {
        let mut ctx = ScreenContext::new(FontMetrics::new(8, 16));
        ctx.set_char_cursor(i32::MIN, 1);
        assert_eq!(ctx.pixel_cursor().x, i32::MIN + 1);
        assert_eq!(ctx.char_cursor().x, (i32::MIN).div_euclid(8) + 1);
        ctx.set_char_cursor(i32::MAX, i32::MAX);
        assert_eq!(ctx.pixel_cursor(), Point::new(i32::MAX, i32::MAX));
        assert_eq!(
            ctx.char_cursor(),
            Point::new((i32::MAX - 1) / 8 + 1, (i32::MAX - 1) / 16 + 1)
        );
        assert!(!ctx.in_bounds(80, 25));
        assert_eq!(ctx.cursor_cell().x, i32::MAX - 1);
    }

    proptest! {
        #[test]
        fn char_follows_pixel_over_full_range(
            x in any::<i32>(),
            y in any::<i32>(),
            cw in 1i32..20,
            ch in 1i32..40,
        ) {
            let mut ctx = ScreenContext::new(FontMetrics::new(cw, ch));
            ctx.set_char_cursor(x, y);
            let p = ctx.pixel_cursor();
            prop_assert_eq!(ctx.char_cursor().x, p.x.saturating_sub(1).div_euclid(cw) + 1);
            prop_assert_eq!(ctx.char_cursor().y, p.y.saturating_sub(1).div_euclid(ch) + 1);
            ctx.set_pixel_cursor(x, y);
            prop_assert_eq!(ctx.char_cursor().x, x.saturating_sub(1).div_euclid(cw) + 1);
            prop_assert_eq!(ctx.char_cursor().y, y.saturating_sub(1).div_euclid(ch) + 1);
        }

        #[test]
        fn char_and_pixel_agree(
            px in -500i32..500,
            py in -500i32..500,
            cw in 1i32..20,
            ch in 1i32..40,
        ) {
            let mut ctx = ScreenContext::new(FontMetrics::new(cw, ch));
            ctx.set_pixel_cursor(px, py);
            let c = ctx.char_cursor();
            prop_assert_eq!(c.x, (px - 1).div_euclid(cw) + 1);
            prop_assert_eq!(c.y, (py - 1).div_euclid(ch) + 1);
            ctx.set_char_cursor(c.x, c.y);
            prop_assert!(ctx.is_on_grid());
            prop_assert_eq!(ctx.char_cursor(), c);
        }
    }
}

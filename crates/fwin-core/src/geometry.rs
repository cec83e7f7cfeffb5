#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Surfaces use 0-indexed pixel coordinates with the origin at the top-left.
//! Cursor positions exposed to callers are 1-indexed and may legally sit
//! outside a surface, so every coordinate here is signed.

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Area, treating negative dimensions as zero.
    #[inline]
    pub const fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }
}

/// A rectangle used for repaint regions, clipping, and control geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels (or cells, depending on the caller).
    pub width: i32,
    /// Height in pixels (or cells, depending on the caller).
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Create a rectangle from two inclusive corners, in any order.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self::new(
            left,
            top,
            right.saturating_sub(left).saturating_add(1),
            bottom.saturating_sub(top).saturating_add(1),
        )
    }

    /// Left edge (inclusive). Alias for `self.x`.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive). Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Area, zero for empty rectangles.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.size().area()
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both: min of the origins, max of the corners.
    ///
    /// An empty operand contributes nothing.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    /// Move the rectangle by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Parts of `self` not covered by `clip`, as at most four bands.
    ///
    /// Bands are returned top, bottom, left, right; none overlap.
    pub fn subtract(&self, clip: &Rect) -> Vec<Rect> {
        let Some(inner) = self.intersection_opt(clip) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };
        let mut bands = Vec::with_capacity(4);
        if inner.y > self.y {
            bands.push(Rect::new(self.x, self.y, self.width, inner.y - self.y));
        }
        if inner.bottom() < self.bottom() {
            bands.push(Rect::new(
                self.x,
                inner.bottom(),
                self.width,
                self.bottom() - inner.bottom(),
            ));
        }
        if inner.x > self.x {
            bands.push(Rect::new(self.x, inner.y, inner.x - self.x, inner.height));
        }
        if inner.right() < self.right() {
            bands.push(Rect::new(
                inner.right(),
                inner.y,
                self.right() - inner.right(),
                inner.height,
            ));
        }
        bands
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Size};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn rect_intersection_no_overlap_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(3, 3, 2, 2);
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn rect_union_takes_min_origin_max_corner() {
        let a = Rect::new(10, 5, 4, 4);
        let b = Rect::new(2, 8, 3, 6);
        assert_eq!(a.union(&b), Rect::new(2, 5, 12, 9));
    }

    #[test]
    fn rect_union_ignores_empty() {
        let a = Rect::new(3, 3, 2, 2);
        assert_eq!(a.union(&Rect::default()), a);
        assert_eq!(Rect::default().union(&a), a);
    }

    #[test]
    fn rect_from_corners_any_order() {
        assert_eq!(Rect::from_corners(5, 6, 1, 2), Rect::new(1, 2, 5, 5));
        assert_eq!(Rect::from_corners(1, 1, 1, 1), Rect::new(1, 1, 1, 1));
    }

    #[test]
    fn rect_negative_origin_is_allowed() {
        let r = Rect::new(-4, -4, 8, 8);
        assert!(r.contains(-1, -1));
        assert_eq!(r.intersection(&Rect::new(0, 0, 10, 10)), Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn rect_subtract_inside_gives_four_bands() {
        let outer = Rect::new(0, 0, 10, 10);
        let bands = outer.subtract(&Rect::new(2, 2, 4, 4));
        assert_eq!(bands.len(), 4);
        let covered: u64 = bands.iter().map(Rect::area).sum();
        assert_eq!(covered, 100 - 16);
    }

    #[test]
    fn rect_subtract_disjoint_returns_self() {
        let outer = Rect::new(0, 0, 3, 3);
        assert_eq!(outer.subtract(&Rect::new(10, 10, 1, 1)), vec![outer]);
    }

    #[test]
    fn rect_subtract_covering_is_empty() {
        let outer = Rect::new(1, 1, 3, 3);
        assert!(outer.subtract(&Rect::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn size_empty_and_area() {
        assert!(Size::new(0, 5).is_empty());
        assert!(Size::new(4, -1).is_empty());
        assert_eq!(Size::new(-3, 4).area(), 0);
        assert_eq!(Size::new(3, 4).area(), 12);
    }

    #[test]
    fn point_offset_saturates() {
        assert_eq!(Point::new(i32::MAX, 0).offset(1, 1), Point::new(i32::MAX, 1));
    }
}

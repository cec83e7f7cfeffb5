#![forbid(unsafe_code)]

//! Colors.
//!
//! [`PackedRgba`] is the storage format used by surfaces. [`Color`] is the
//! small named palette callers pick from; arbitrary colors come in as ratios
//! over `0..=i32::MAX` per channel, the portable convention for callers that
//! do not know the native channel depth.

/// A packed RGBA color: `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Build a color from channel ratios over `0..=i32::MAX`.
    ///
    /// Negative ratios clamp to zero.
    pub fn from_ratios(r: i32, g: i32, b: i32) -> Self {
        Self::rgb(ratio_to_u8(r), ratio_to_u8(g), ratio_to_u8(b))
    }

    /// Channel ratios over `0..=i32::MAX`.
    pub fn to_ratios(self) -> (i32, i32, i32) {
        (
            u8_to_ratio(self.r()),
            u8_to_ratio(self.g()),
            u8_to_ratio(self.b()),
        )
    }

    /// Bitwise inverse of the color channels, alpha untouched.
    #[inline]
    pub const fn inverted(self) -> Self {
        Self::rgba(!self.r(), !self.g(), !self.b(), self.a())
    }
}

fn ratio_to_u8(ratio: i32) -> u8 {
    let ratio = i64::from(ratio.max(0));
    ((ratio * 255 + i64::from(i32::MAX) / 2) / i64::from(i32::MAX)) as u8
}

fn u8_to_ratio(channel: u8) -> i32 {
    (i64::from(channel) * i64::from(i32::MAX) / 255) as i32
}

/// The named palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Magenta,
}

impl Color {
    /// Packed form of the named color.
    #[must_use]
    pub const fn to_rgba(self) -> PackedRgba {
        match self {
            Color::Black => PackedRgba::BLACK,
            Color::White => PackedRgba::WHITE,
            Color::Red => PackedRgba::rgb(255, 0, 0),
            Color::Green => PackedRgba::rgb(0, 255, 0),
            Color::Blue => PackedRgba::rgb(0, 0, 255),
            Color::Cyan => PackedRgba::rgb(0, 255, 255),
            Color::Yellow => PackedRgba::rgb(255, 255, 0),
            Color::Magenta => PackedRgba::rgb(255, 0, 255),
        }
    }
}

impl From<Color> for PackedRgba {
    fn from(color: Color) -> Self {
        color.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip() {
        let c = PackedRgba::rgba(1, 2, 3, 4);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
    }

    #[test]
    fn ratio_endpoints() {
        assert_eq!(PackedRgba::from_ratios(i32::MAX, 0, 0), PackedRgba::rgb(255, 0, 0));
        assert_eq!(PackedRgba::from_ratios(-5, 0, 0), PackedRgba::BLACK);
        assert_eq!(
            PackedRgba::from_ratios(i32::MAX / 2, i32::MAX / 2, i32::MAX / 2),
            PackedRgba::rgb(127, 127, 127)
        );
        assert_eq!(PackedRgba::WHITE.to_ratios(), (i32::MAX, i32::MAX, i32::MAX));
    }

    #[test]
    fn named_colors() {
        assert_eq!(PackedRgba::from(Color::Cyan), PackedRgba::rgb(0, 255, 255));
        assert_eq!(Color::White.to_rgba().inverted(), PackedRgba::BLACK);
    }
}

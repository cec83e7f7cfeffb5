#![forbid(unsafe_code)]

//! Text attributes, fonts, and the style handed to a drawing surface.

use crate::color::PackedRgba;

bitflags::bitflags! {
    /// Text attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextAttrs: u16 {
        const BLINK       = 0b0000_0000_0001;
        /// Swap foreground and background when drawing.
        const REVERSE     = 0b0000_0000_0010;
        const UNDERLINE   = 0b0000_0000_0100;
        const SUPERSCRIPT = 0b0000_0000_1000;
        const SUBSCRIPT   = 0b0000_0001_0000;
        const ITALIC      = 0b0000_0010_0000;
        const BOLD        = 0b0000_0100_0000;
        const STRIKEOUT   = 0b0000_1000_0000;
    }
}

/// An installed font, numbered from 1.
///
/// Font 1 is the terminal (fixed pitch) font; the backend decides the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

impl FontId {
    pub const TERMINAL: Self = Self(1);
}

impl Default for FontId {
    fn default() -> Self {
        Self::TERMINAL
    }
}

/// Character cell metrics for a font at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontMetrics {
    /// Cell width in pixels.
    pub cell_width: i32,
    /// Cell height in pixels.
    pub cell_height: i32,
    /// Distance from the cell top to the baseline.
    pub ascent: i32,
}

impl FontMetrics {
    #[must_use]
    pub const fn new(cell_width: i32, cell_height: i32) -> Self {
        Self {
            cell_width,
            cell_height,
            ascent: cell_height * 4 / 5,
        }
    }

    /// Metrics where one character is one pixel, as on a text terminal.
    pub const UNIT: Self = Self {
        cell_width: 1,
        cell_height: 1,
        ascent: 1,
    };
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

/// How a color combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MixMode {
    /// Replace the destination.
    #[default]
    Overwrite,
    /// Leave the destination untouched.
    Invisible,
    /// Invert the destination.
    Xor,
}

/// Everything a surface needs to draw a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub foreground: PackedRgba,
    pub background: PackedRgba,
    pub attrs: TextAttrs,
    pub font: FontId,
    pub metrics: FontMetrics,
    pub foreground_mode: MixMode,
    pub background_mode: MixMode,
}

impl TextStyle {
    /// Foreground and background after applying reverse video.
    #[must_use]
    pub fn effective_colors(&self) -> (PackedRgba, PackedRgba) {
        if self.attrs.contains(TextAttrs::REVERSE) {
            (self.background, self.foreground)
        } else {
            (self.foreground, self.background)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_swaps_colors() {
        let style = TextStyle {
            foreground: PackedRgba::BLACK,
            background: PackedRgba::WHITE,
            attrs: TextAttrs::REVERSE | TextAttrs::BOLD,
            font: FontId::TERMINAL,
            metrics: FontMetrics::default(),
            foreground_mode: MixMode::Overwrite,
            background_mode: MixMode::Overwrite,
        };
        assert_eq!(
            style.effective_colors(),
            (PackedRgba::WHITE, PackedRgba::BLACK)
        );
    }

    #[test]
    fn default_metrics_have_ascent_inside_cell() {
        let m = FontMetrics::default();
        assert!(m.ascent > 0 && m.ascent <= m.cell_height);
    }
}

#![forbid(unsafe_code)]

//! Modal dialogs.
//!
//! Every query returns `Ok(None)` when the user cancels and `Err` only on a
//! native failure.

use fwin_core::error::Result;
use fwin_render::color::PackedRgba;
use fwin_render::style::{FontId, TextAttrs};

bitflags::bitflags! {
    /// Search options for find and replace.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FindOptions: u8 {
        const MATCH_CASE = 0b0001;
        /// Search toward the start of the text.
        const UP         = 0b0010;
        const WHOLE_WORD = 0b0100;
        /// Replace every match rather than the next one.
        const ALL        = 0b1000;
    }
}

/// A find (and optionally replace) request or result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindQuery {
    pub text: String,
    /// Present for find-and-replace.
    pub replace: Option<String>,
    pub options: FindOptions,
}

/// A font selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChoice {
    pub font: FontId,
    /// Cell height in pixels.
    pub size: i32,
    pub foreground: PackedRgba,
    pub background: PackedRgba,
    pub attrs: TextAttrs,
}

/// Modal dialogs, run on the dialog thread.
pub trait NativeDialogs {
    fn alert(&mut self, title: &str, message: &str) -> Result<()>;

    fn choose_color(&mut self, initial: PackedRgba) -> Result<Option<PackedRgba>>;

    fn open_file(&mut self, initial: &str) -> Result<Option<String>>;

    fn save_file(&mut self, initial: &str) -> Result<Option<String>>;

    fn find(&mut self, initial: &FindQuery) -> Result<Option<FindQuery>>;

    fn choose_font(&mut self, initial: &FontChoice) -> Result<Option<FontChoice>>;
}

#![forbid(unsafe_code)]

//! Dialogs on a text terminal.
//!
//! The screen belongs to the application window, so there is nowhere to put
//! a modal dialog. Alerts go to the log; everything else is unsupported.

use fwin_backend::{FindQuery, FontChoice, NativeDialogs};
use fwin_core::error::{Error, Result};
use fwin_render::color::PackedRgba;

const NO_DIALOGS: Error = Error::Unsupported("dialogs on a text terminal");

#[derive(Debug, Default)]
pub struct TtyDialogs;

impl NativeDialogs for TtyDialogs {
    fn alert(&mut self, title: &str, message: &str) -> Result<()> {
        tracing::warn!(title, message, "alert");
        Ok(())
    }

    fn choose_color(&mut self, _initial: PackedRgba) -> Result<Option<PackedRgba>> {
        Err(NO_DIALOGS)
    }

    fn open_file(&mut self, _initial: &str) -> Result<Option<String>> {
        Err(NO_DIALOGS)
    }

    fn save_file(&mut self, _initial: &str) -> Result<Option<String>> {
        Err(NO_DIALOGS)
    }

    fn find(&mut self, _initial: &FindQuery) -> Result<Option<FindQuery>> {
        Err(NO_DIALOGS)
    }

    fn choose_font(&mut self, _initial: &FontChoice) -> Result<Option<FontChoice>> {
        Err(NO_DIALOGS)
    }
}

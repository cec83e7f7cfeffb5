#![forbid(unsafe_code)]

//! Modal dialogs, run on the dialog pump.
//!
//! A cancelled dialog answers `Ok(None)`; only a native failure is an error.

use fwin_backend::{FindQuery, FontChoice, NativeDialogs};
use fwin_core::error::{Error, Result};
use fwin_render::color::PackedRgba;

use crate::context::Context;
use crate::intertask::{self, Intertask};

const PUMP: &str = "dialog pump";

/// Which dialog to run.
#[derive(Debug, Clone)]
pub enum DialogOp {
    Alert { title: String, message: String },
    Color(PackedRgba),
    OpenFile(String),
    SaveFile(String),
    Find(FindQuery),
    Font(FontChoice),
}

/// What a dialog produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAnswer {
    Dismissed,
    Color(Option<PackedRgba>),
    Path(Option<String>),
    Find(Option<FindQuery>),
    Font(Option<FontChoice>),
}

pub type DialogRequest = Intertask<DialogOp, Result<DialogAnswer>>;

/// Run one dialog on the calling (pump) thread.
pub fn serve(dialogs: &mut impl NativeDialogs, op: &DialogOp) -> Result<DialogAnswer> {
    Ok(match op {
        DialogOp::Alert { title, message } => {
            dialogs.alert(title, message)?;
            DialogAnswer::Dismissed
        }
        DialogOp::Color(initial) => DialogAnswer::Color(dialogs.choose_color(*initial)?),
        DialogOp::OpenFile(initial) => DialogAnswer::Path(dialogs.open_file(initial)?),
        DialogOp::SaveFile(initial) => DialogAnswer::Path(dialogs.save_file(initial)?),
        DialogOp::Find(initial) => DialogAnswer::Find(dialogs.find(initial)?),
        DialogOp::Font(initial) => DialogAnswer::Font(dialogs.choose_font(initial)?),
    })
}

fn mismatch(answer: &DialogAnswer) -> Error {
    tracing::error!(?answer, "dialog pump answered with the wrong kind");
    Error::Disconnected(PUMP)
}

impl Context {
    fn dialog(&self, op: DialogOp) -> Result<DialogAnswer> {
        let tag = self.tags.next();
        intertask::request(&self.dialogs, tag, op, PUMP)?
    }

    /// Show a message and wait for it to be dismissed.
    pub fn alert(&self, title: &str, message: &str) -> Result<()> {
        match self.dialog(DialogOp::Alert {
            title: title.to_owned(),
            message: message.to_owned(),
        })? {
            DialogAnswer::Dismissed => Ok(()),
            other => Err(mismatch(&other)),
        }
    }

    pub fn choose_color(&self, initial: PackedRgba) -> Result<Option<PackedRgba>> {
        match self.dialog(DialogOp::Color(initial))? {
            DialogAnswer::Color(c) => Ok(c),
            other => Err(mismatch(&other)),
        }
    }

    pub fn open_file(&self, initial: &str) -> Result<Option<String>> {
        match self.dialog(DialogOp::OpenFile(initial.to_owned()))? {
            DialogAnswer::Path(p) => Ok(p),
            other => Err(mismatch(&other)),
        }
    }

    pub fn save_file(&self, initial: &str) -> Result<Option<String>> {
        match self.dialog(DialogOp::SaveFile(initial.to_owned()))? {
            DialogAnswer::Path(p) => Ok(p),
            other => Err(mismatch(&other)),
        }
    }

    /// Find, or find-and-replace when `initial.replace` is set.
    pub fn find(&self, initial: &FindQuery) -> Result<Option<FindQuery>> {
        match self.dialog(DialogOp::Find(initial.clone()))? {
            DialogAnswer::Find(q) => Ok(q),
            other => Err(mismatch(&other)),
        }
    }

    pub fn choose_font(&self, initial: &FontChoice) -> Result<Option<FontChoice>> {
        match self.dialog(DialogOp::Font(*initial))? {
            DialogAnswer::Font(f) => Ok(f),
            other => Err(mismatch(&other)),
        }
    }
}

#![forbid(unsafe_code)]

//! Scripted modal dialogs. Each dialog consumes one queued
//! [`DialogReply`]; with none queued it is accepted as opened.

use fwin_backend::{FindQuery, FontChoice, NativeDialogs};
use fwin_core::error::Result;
use fwin_render::color::PackedRgba;

use crate::world::{self, DialogReply, SharedWorld};

#[derive(Debug)]
pub struct HeadlessDialogs {
    world: SharedWorld,
}

impl HeadlessDialogs {
    pub(crate) fn new(world: SharedWorld) -> Self {
        Self { world }
    }

    fn next_reply(&self) -> DialogReply {
        world::lock(&self.world)
            .replies
            .pop_front()
            .unwrap_or(DialogReply::Accept)
    }
}

impl NativeDialogs for HeadlessDialogs {
    fn alert(&mut self, title: &str, message: &str) -> Result<()> {
        let mut w = world::lock(&self.world);
        w.replies.pop_front();
        w.alerts.push((title.to_owned(), message.to_owned()));
        Ok(())
    }

    fn choose_color(&mut self, initial: PackedRgba) -> Result<Option<PackedRgba>> {
        Ok(match self.next_reply() {
            DialogReply::Cancel => None,
            DialogReply::Color(c) => Some(c),
            DialogReply::Accept | DialogReply::Text(_) => Some(initial),
        })
    }

    fn open_file(&mut self, initial: &str) -> Result<Option<String>> {
        Ok(path_reply(self.next_reply(), initial))
    }

    fn save_file(&mut self, initial: &str) -> Result<Option<String>> {
        Ok(path_reply(self.next_reply(), initial))
    }

    fn find(&mut self, initial: &FindQuery) -> Result<Option<FindQuery>> {
        Ok(match self.next_reply() {
            DialogReply::Cancel => None,
            DialogReply::Text(text) => Some(FindQuery {
                text,
                ..initial.clone()
            }),
            DialogReply::Accept | DialogReply::Color(_) => Some(initial.clone()),
        })
    }

    fn choose_font(&mut self, initial: &FontChoice) -> Result<Option<FontChoice>> {
        Ok(match self.next_reply() {
            DialogReply::Cancel => None,
            DialogReply::Color(foreground) => Some(FontChoice {
                foreground,
                ..*initial
            }),
            DialogReply::Accept | DialogReply::Text(_) => Some(*initial),
        })
    }
}

fn path_reply(reply: DialogReply, initial: &str) -> Option<String> {
    match reply {
        DialogReply::Cancel => None,
        DialogReply::Text(path) => Some(path),
        DialogReply::Accept | DialogReply::Color(_) => Some(initial.to_owned()),
    }
}

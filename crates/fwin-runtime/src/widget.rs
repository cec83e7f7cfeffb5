#![forbid(unsafe_code)]

//! Widget entries and the mapping between widgets and native controls.
//!
//! Widgets are keyed by an application-chosen id, unique within a window.
//! Creation and destruction go through the display pump (see
//! [`Context::create_widget`](crate::Context::create_widget)); everything
//! else here is bookkeeping done under the runtime lock.

use fwin_backend::{
    ControlClass, ControlHandles, ControlNotify, ControlSpec, ControlStyle, ScrollAction,
};
use fwin_core::error::{Error, Result};
use fwin_core::event::EventKind;
use fwin_core::geometry::Rect;
use fwin_core::handle::NativeHandle;

/// Full range of scroll bars, sliders, and progress bars.
pub const POSITION_RANGE: (i32, i32) = (0, i32::MAX);

/// Range of a number select created without one.
pub const NUMBER_RANGE: (i32, i32) = (0, i32::MAX);

/// Widget families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Button,
    Checkbox,
    RadioButton,
    Group,
    Background,
    ScrollVertical,
    ScrollHorizontal,
    /// Spin control with an edit buddy.
    NumSelect,
    EditBox,
    Progress,
    ListBox,
    DropBox,
    DropEditBox,
    SliderHorizontal,
    SliderVertical,
    TabBar,
}

impl WidgetKind {
    fn control(self) -> (ControlClass, ControlStyle) {
        use ControlClass as C;
        match self {
            WidgetKind::Button => (C::PushButton, ControlStyle::empty()),
            WidgetKind::Checkbox => (C::CheckBox, ControlStyle::empty()),
            WidgetKind::RadioButton => (C::RadioButton, ControlStyle::empty()),
            WidgetKind::Group => (C::GroupBox, ControlStyle::empty()),
            WidgetKind::Background => (C::Panel, ControlStyle::empty()),
            WidgetKind::ScrollVertical => (C::ScrollBar, ControlStyle::VERTICAL),
            WidgetKind::ScrollHorizontal => (C::ScrollBar, ControlStyle::empty()),
            WidgetKind::NumSelect => (C::Spin, ControlStyle::BUDDY | ControlStyle::NUMERIC),
            WidgetKind::EditBox => (C::Edit, ControlStyle::empty()),
            WidgetKind::Progress => (C::Progress, ControlStyle::empty()),
            WidgetKind::ListBox => (C::ListBox, ControlStyle::empty()),
            WidgetKind::DropBox => (C::ComboBox, ControlStyle::empty()),
            WidgetKind::DropEditBox => (C::ComboBox, ControlStyle::EDITABLE),
            WidgetKind::SliderHorizontal => (C::Trackbar, ControlStyle::empty()),
            WidgetKind::SliderVertical => (C::Trackbar, ControlStyle::VERTICAL),
            WidgetKind::TabBar => (C::TabStrip, ControlStyle::empty()),
        }
    }

    /// True when the widget has a position that `set_value` can move.
    #[must_use]
    pub const fn has_value(self) -> bool {
        matches!(
            self,
            WidgetKind::ScrollVertical
                | WidgetKind::ScrollHorizontal
                | WidgetKind::NumSelect
                | WidgetKind::Progress
                | WidgetKind::SliderHorizontal
                | WidgetKind::SliderVertical
                | WidgetKind::TabBar
        )
    }

    /// True when the widget has an on/off state.
    #[must_use]
    pub const fn is_checkable(self) -> bool {
        matches!(self, WidgetKind::Checkbox | WidgetKind::RadioButton)
    }

    /// Range used when the spec gives none. Tabs count from 1.
    fn default_range(self, items: usize) -> (i32, i32) {
        match self {
            WidgetKind::ScrollVertical
            | WidgetKind::ScrollHorizontal
            | WidgetKind::Progress
            | WidgetKind::SliderHorizontal
            | WidgetKind::SliderVertical => POSITION_RANGE,
            WidgetKind::NumSelect => NUMBER_RANGE,
            WidgetKind::TabBar => (1, i32::try_from(items).unwrap_or(i32::MAX).max(1)),
            _ => (0, 0),
        }
    }
}

/// What to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    /// Client pixel rect, 0-based.
    pub rect: Rect,
    pub label: String,
    pub items: Vec<String>,
    /// Inclusive value range; the kind's default when `None`.
    pub range: Option<(i32, i32)>,
}

impl WidgetSpec {
    #[must_use]
    pub fn new(kind: WidgetKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            label: String::new(),
            items: Vec::new(),
            range: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn range(mut self, low: i32, high: i32) -> Self {
        self.range = Some((low, high));
        self
    }

    /// The explicit range, or the kind's default for these items.
    #[must_use]
    pub fn value_range(&self) -> (i32, i32) {
        self.range
            .unwrap_or_else(|| self.kind.default_range(self.items.len()))
    }

    /// Native request for this widget on `parent`.
    pub fn control_spec(&self, parent: NativeHandle) -> Result<ControlSpec> {
        let range = self.value_range();
        if range.0 > range.1 {
            return Err(Error::invalid(format!(
                "widget range {}..={}",
                range.0, range.1
            )));
        }
        let (class, style) = self.kind.control();
        let mut spec = ControlSpec::new(parent, class, self.rect);
        spec.style = style;
        spec.label = self.label.clone();
        spec.items = self.items.clone();
        spec.range = match self.kind {
            WidgetKind::TabBar => (range.0.saturating_sub(1), range.1.saturating_sub(1)),
            _ => range,
        };
        Ok(spec)
    }
}

/// A live widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEntry {
    pub id: i32,
    pub kind: WidgetKind,
    pub handles: ControlHandles,
    /// Client pixel rect, 0-based.
    pub rect: Rect,
    pub enabled: bool,
    pub checked: bool,
    pub value: i32,
    pub range: (i32, i32),
}

impl WidgetEntry {
    #[must_use]
    pub fn new(id: i32, spec: &WidgetSpec, handles: ControlHandles) -> Self {
        let range = spec.value_range();
        Self {
            id,
            kind: spec.kind,
            handles,
            rect: spec.rect,
            enabled: true,
            checked: false,
            value: range.0,
            range,
        }
    }

    /// `value` as the native control counts it. Tab strips select by
    /// 0-based index.
    #[must_use]
    pub fn native_value(&self, value: i32) -> i32 {
        match self.kind {
            WidgetKind::TabBar => value.saturating_sub(1),
            _ => value,
        }
    }

    /// Handle that carries the widget's text.
    #[must_use]
    pub fn text_handle(&self) -> NativeHandle {
        match self.kind {
            WidgetKind::NumSelect => self.handles.buddy.unwrap_or(self.handles.main),
            _ => self.handles.main,
        }
    }

    /// Translate a native notification into the widget's event, updating
    /// cached state on the way.
    ///
    /// List, drop box, and tab indices are reported 1-based.
    pub fn notify(&mut self, notify: ControlNotify) -> Option<EventKind> {
        let id = self.id;
        match (self.kind, notify) {
            (WidgetKind::Button, ControlNotify::Clicked) => Some(EventKind::Button(id)),
            (WidgetKind::Checkbox, ControlNotify::Clicked) => Some(EventKind::Checkbox(id)),
            (WidgetKind::RadioButton, ControlNotify::Clicked) => Some(EventKind::RadioButton(id)),
            (
                WidgetKind::ScrollVertical | WidgetKind::ScrollHorizontal,
                ControlNotify::Scroll(action),
            ) => Some(match action {
                ScrollAction::LineUp => EventKind::ScrollUpLine(id),
                ScrollAction::LineDown => EventKind::ScrollDownLine(id),
                ScrollAction::PageUp => EventKind::ScrollUpPage(id),
                ScrollAction::PageDown => EventKind::ScrollDownPage(id),
                ScrollAction::Position(p) => {
                    self.value = p;
                    EventKind::ScrollPosition { id, position: p }
                }
            }),
            (WidgetKind::NumSelect, ControlNotify::Value(v)) => {
                let v = v.clamp(self.range.0, self.range.1);
                self.value = v;
                Some(EventKind::NumSelect { id, value: v })
            }
            (WidgetKind::EditBox, ControlNotify::TextCommitted) => Some(EventKind::EditBox(id)),
            (WidgetKind::ListBox, ControlNotify::Selected(i)) => Some(EventKind::ListSelect {
                id,
                index: i + 1,
            }),
            (WidgetKind::DropBox | WidgetKind::DropEditBox, ControlNotify::Selected(i)) => {
                Some(EventKind::DropSelect { id, index: i + 1 })
            }
            (WidgetKind::DropEditBox, ControlNotify::TextCommitted) => {
                Some(EventKind::DropEditBox(id))
            }
            (
                WidgetKind::SliderHorizontal | WidgetKind::SliderVertical,
                ControlNotify::Value(p),
            ) => {
                self.value = p;
                Some(EventKind::SliderPosition { id, position: p })
            }
            (WidgetKind::TabBar, ControlNotify::Selected(i)) => {
                let index = i.saturating_add(1);
                self.value = index;
                Some(EventKind::TabSelect { id, index })
            }
            (kind, notify) => {
                tracing::trace!(id, ?kind, ?notify, "unmapped control notification");
                None
            }
        }
    }
}

/// The widgets of one window.
#[derive(Debug, Clone, Default)]
pub struct WidgetList {
    entries: Vec<WidgetEntry>,
}

impl WidgetList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Reject `id` if it is already taken.
    pub fn check_free(&self, id: i32) -> Result<()> {
        if self.contains(id) {
            Err(Error::DuplicateWidget(id))
        } else {
            Ok(())
        }
    }

    pub fn get(&self, id: i32) -> Result<&WidgetEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(Error::WidgetNotFound(id))
    }

    pub fn get_mut(&mut self, id: i32) -> Result<&mut WidgetEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Error::WidgetNotFound(id))
    }

    /// Widget owning a native control handle (main or buddy).
    pub fn by_control_mut(&mut self, control: NativeHandle) -> Option<&mut WidgetEntry> {
        self.entries.iter_mut().find(|e| e.handles.owns(control))
    }

    pub fn insert(&mut self, entry: WidgetEntry) -> Result<()> {
        self.check_free(entry.id)?;
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, id: i32) -> Result<WidgetEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::WidgetNotFound(id))?;
        Ok(self.entries.remove(pos))
    }

    /// Remove every entry, for window teardown.
    pub fn drain(&mut self) -> Vec<WidgetEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::error::ErrorKind;

    fn handles(n: u64) -> ControlHandles {
        ControlHandles {
            main: NativeHandle(n),
            buddy: None,
        }
    }

    fn entry(id: i32, kind: WidgetKind, n: u64) -> WidgetEntry {
        WidgetEntry::new(id, &WidgetSpec::new(kind, Rect::new(0, 0, 10, 10)), handles(n))
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut list = WidgetList::default();
        list.insert(entry(1, WidgetKind::Button, 10)).unwrap();
        let err = list.insert(entry(1, WidgetKind::Checkbox, 11)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateWidget);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn missing_widget() {
        let mut list = WidgetList::default();
        assert_eq!(list.get(4).unwrap_err().kind(), ErrorKind::WidgetNotFound);
        assert_eq!(list.remove(4).unwrap_err().kind(), ErrorKind::WidgetNotFound);
    }

    #[test]
    fn control_lookup_covers_buddy() {
        let mut list = WidgetList::default();
        let spec = WidgetSpec::new(WidgetKind::NumSelect, Rect::new(0, 0, 30, 10)).range(1, 9);
        let h = ControlHandles {
            main: NativeHandle(20),
            buddy: Some(NativeHandle(21)),
        };
        list.insert(WidgetEntry::new(7, &spec, h)).unwrap();
        let e = list.by_control_mut(NativeHandle(21)).unwrap();
        assert_eq!(e.id, 7);
        assert_eq!(e.text_handle(), NativeHandle(21));
        assert_eq!(e.value, 1);
    }

    #[test]
    fn control_spec_carries_class_and_range() {
        let spec = WidgetSpec::new(WidgetKind::SliderVertical, Rect::new(1, 2, 3, 4))
            .label("vol")
            .control_spec(NativeHandle(5))
            .unwrap();
        assert_eq!(spec.class, ControlClass::Trackbar);
        assert!(spec.style.contains(ControlStyle::VERTICAL));
        assert_eq!(spec.range, POSITION_RANGE);
        assert_eq!(spec.label, "vol");
        let bad = WidgetSpec::new(WidgetKind::NumSelect, Rect::new(0, 0, 1, 1)).range(5, 1);
        assert!(bad.control_spec(NativeHandle(1)).is_err());
    }

    #[test]
    fn notifications_map_to_events() {
        let mut b = entry(3, WidgetKind::Button, 1);
        assert_eq!(b.notify(ControlNotify::Clicked), Some(EventKind::Button(3)));
        assert_eq!(b.notify(ControlNotify::Selected(0)), None);

        let mut s = entry(4, WidgetKind::ScrollVertical, 2);
        assert_eq!(
            s.notify(ControlNotify::Scroll(ScrollAction::PageDown)),
            Some(EventKind::ScrollDownPage(4))
        );
        assert_eq!(
            s.notify(ControlNotify::Scroll(ScrollAction::Position(99))),
            Some(EventKind::ScrollPosition { id: 4, position: 99 })
        );
        assert_eq!(s.value, 99);

        let mut l = entry(5, WidgetKind::ListBox, 3);
        assert_eq!(
            l.notify(ControlNotify::Selected(0)),
            Some(EventKind::ListSelect { id: 5, index: 1 })
        );

        let mut d = entry(6, WidgetKind::DropEditBox, 4);
        assert_eq!(
            d.notify(ControlNotify::TextCommitted),
            Some(EventKind::DropEditBox(6))
        );
        assert_eq!(
            d.notify(ControlNotify::Selected(2)),
            Some(EventKind::DropSelect { id: 6, index: 3 })
        );

        let mut t = entry(8, WidgetKind::TabBar, 5);
        assert_eq!(
            t.notify(ControlNotify::Selected(1)),
            Some(EventKind::TabSelect { id: 8, index: 2 })
        );
    }

    #[test]
    fn default_ranges_fit_their_kind() {
        let rect = Rect::new(0, 0, 1, 1);
        let number = WidgetSpec::new(WidgetKind::NumSelect, rect);
        let mut n = WidgetEntry::new(1, &number, handles(1));
        assert_eq!(n.range, NUMBER_RANGE);
        assert_eq!(
            n.notify(ControlNotify::Value(5)),
            Some(EventKind::NumSelect { id: 1, value: 5 })
        );
        assert_eq!(
            n.notify(ControlNotify::Value(-3)),
            Some(EventKind::NumSelect { id: 1, value: 0 })
        );

        let tabs = WidgetSpec::new(WidgetKind::TabBar, rect).items(["a", "b", "c"]);
        assert_eq!(tabs.value_range(), (1, 3));
        let mut t = WidgetEntry::new(2, &tabs, handles(2));
        assert_eq!(t.value, 1);
        assert_eq!(
            t.notify(ControlNotify::Selected(2)),
            Some(EventKind::TabSelect { id: 2, index: 3 })
        );
        assert_eq!(t.value, 3);
        assert_eq!(t.native_value(3), 2);

        assert_eq!(tabs.control_spec(NativeHandle(1)).unwrap().range, (0, 2));

        let empty = WidgetSpec::new(WidgetKind::TabBar, rect);
        assert_eq!(empty.value_range(), (1, 1));
    }

    #[test]
    fn num_select_clamps_to_range() {
        let spec = WidgetSpec::new(WidgetKind::NumSelect, Rect::new(0, 0, 1, 1)).range(1, 10);
        let mut e = WidgetEntry::new(9, &spec, handles(1));
        assert_eq!(
            e.notify(ControlNotify::Value(42)),
            Some(EventKind::NumSelect { id: 9, value: 10 })
        );
    }
}

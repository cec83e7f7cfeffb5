#![forbid(unsafe_code)]

//! Creation requests for native windows, controls, and menus.

use fwin_core::geometry::{Rect, Size};
use fwin_core::handle::NativeHandle;

/// A request for a native top-level or child window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    /// Initial client size in pixels.
    pub client: Size,
    /// Owning native window for child windows.
    pub parent: Option<NativeHandle>,
    pub visible: bool,
}

impl WindowSpec {
    #[must_use]
    pub fn new(title: impl Into<String>, client: Size) -> Self {
        Self {
            title: title.into(),
            client,
            parent: None,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Option<NativeHandle>) -> Self {
        self.parent = parent;
        self
    }
}

/// Native control families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlClass {
    PushButton,
    CheckBox,
    RadioButton,
    GroupBox,
    /// Static filled panel.
    Panel,
    ScrollBar,
    /// Up/down arrows, paired with an edit buddy.
    Spin,
    Edit,
    Progress,
    ListBox,
    ComboBox,
    Trackbar,
    TabStrip,
}

bitflags::bitflags! {
    /// Control style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlStyle: u8 {
        /// Vertical orientation (scroll bars, trackbars, tab strips).
        const VERTICAL = 0b0000_0001;
        /// Combo box accepts typed text.
        const EDITABLE = 0b0000_0010;
        /// Edit accepts digits only.
        const NUMERIC  = 0b0000_0100;
        /// Spin control drives an edit buddy.
        const BUDDY    = 0b0000_1000;
    }
}

/// A request for a native control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSpec {
    pub parent: NativeHandle,
    pub class: ControlClass,
    pub style: ControlStyle,
    /// Client pixel rect, 0-based.
    pub rect: Rect,
    pub label: String,
    /// Entries for list, combo, and tab controls.
    pub items: Vec<String>,
    /// Inclusive value range for spin, scroll, trackbar, and progress.
    /// Tab strips use it for their 0-based tab indices.
    pub range: (i32, i32),
}

impl ControlSpec {
    #[must_use]
    pub fn new(parent: NativeHandle, class: ControlClass, rect: Rect) -> Self {
        Self {
            parent,
            class,
            style: ControlStyle::empty(),
            rect,
            label: String::new(),
            items: Vec::new(),
            range: (0, 0),
        }
    }
}

/// Handles minted for one control; `buddy` is the companion edit of a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandles {
    pub main: NativeHandle,
    pub buddy: Option<NativeHandle>,
}

impl ControlHandles {
    /// A control without a buddy.
    #[must_use]
    pub const fn single(main: NativeHandle) -> Self {
        Self { main, buddy: None }
    }

    /// True when `handle` is this control or its buddy.
    #[must_use]
    pub fn owns(&self, handle: NativeHandle) -> bool {
        self.main == handle || self.buddy == Some(handle)
    }
}

/// One menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuItem {
    pub id: i32,
    pub label: String,
    /// Checkable on/off entry.
    pub toggle: bool,
    /// Member of a one-of group: consecutive members of the same list form
    /// the group.
    pub one_of: bool,
    /// Draw a separator bar after this entry.
    pub bar: bool,
    pub submenu: Vec<MenuItem>,
}

impl MenuItem {
    #[must_use]
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn toggle(mut self) -> Self {
        self.toggle = true;
        self
    }

    #[must_use]
    pub fn one_of(mut self) -> Self {
        self.one_of = true;
        self
    }

    #[must_use]
    pub fn bar(mut self) -> Self {
        self.bar = true;
        self
    }

    #[must_use]
    pub fn with_submenu(mut self, items: Vec<MenuItem>) -> Self {
        self.submenu = items;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buddy_ownership() {
        let h = ControlHandles {
            main: NativeHandle(1),
            buddy: Some(NativeHandle(2)),
        };
        assert!(h.owns(NativeHandle(1)));
        assert!(h.owns(NativeHandle(2)));
        assert!(!h.owns(NativeHandle(3)));
    }

    #[test]
    fn menu_builder() {
        let item = MenuItem::new(3, "Wrap").toggle().bar();
        assert!(item.toggle && item.bar && !item.one_of);
    }
}

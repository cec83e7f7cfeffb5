#![forbid(unsafe_code)]

//! Menu state tracking.
//!
//! The native menu shows the tree; the window keeps a flat list of every
//! item so enable and check state can be queried and one-of groups kept
//! exclusive without walking the tree.

pub use fwin_backend::MenuItem;
use fwin_core::error::{Error, Result};

/// Tracked state of one menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedItem {
    pub id: i32,
    pub toggle: bool,
    /// One-of group number; `0` for items outside any group.
    pub group: u32,
    pub enabled: bool,
    pub checked: bool,
}

/// A state change the native menu must mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuChange {
    pub id: i32,
    pub enabled: bool,
    pub checked: bool,
}

impl From<&TrackedItem> for MenuChange {
    fn from(item: &TrackedItem) -> Self {
        Self {
            id: item.id,
            enabled: item.enabled,
            checked: item.checked,
        }
    }
}

/// Flat tracking list for a window's menu.
#[derive(Debug, Clone, Default)]
pub struct MenuTracker {
    items: Vec<TrackedItem>,
    next_group: u32,
}

impl MenuTracker {
    /// Track a new menu tree, replacing the old one.
    pub fn install(&mut self, menu: &[MenuItem]) {
        self.items.clear();
        self.next_group = 0;
        self.flatten(menu);
    }

    /// Forget the menu.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn flatten(&mut self, list: &[MenuItem]) {
        let mut group = 0;
        for item in list {
            if item.one_of {
                if group == 0 {
                    self.next_group += 1;
                    group = self.next_group;
                }
            } else {
                group = 0;
            }
            self.items.push(TrackedItem {
                id: item.id,
                toggle: item.toggle,
                group,
                enabled: true,
                checked: false,
            });
            if item.bar {
                group = 0;
            }
            self.flatten(&item.submenu);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&TrackedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: i32) -> Result<&mut TrackedItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::invalid(format!("menu id {id}")))
    }

    /// Enable or disable an item.
    pub fn enable(&mut self, id: i32, enabled: bool) -> Result<MenuChange> {
        let item = self.get_mut(id)?;
        item.enabled = enabled;
        Ok(MenuChange::from(&*item))
    }

    /// Check or uncheck a toggle or one-of item.
    ///
    /// Checking a one-of member unchecks the rest of its group; every item
    /// whose state changed is returned.
    pub fn select(&mut self, id: i32, on: bool) -> Result<Vec<MenuChange>> {
        let item = self.get_mut(id)?;
        if !item.toggle && item.group == 0 {
            return Err(Error::invalid(format!("menu id {id} is not selectable")));
        }
        item.checked = on;
        let group = item.group;
        let mut changes = vec![MenuChange::from(&*item)];
        if on && group != 0 {
            for other in self
                .items
                .iter_mut()
                .filter(|i| i.group == group && i.id != id && i.checked)
            {
                other.checked = false;
                changes.push(MenuChange::from(&*other));
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::error::ErrorKind;

    fn sample() -> Vec<MenuItem> {
        vec![
            MenuItem::new(1, "File").with_submenu(vec![
                MenuItem::new(10, "Open"),
                MenuItem::new(11, "Wrap").toggle().bar(),
                MenuItem::new(12, "Small").one_of(),
                MenuItem::new(13, "Medium").one_of(),
                MenuItem::new(14, "Large").one_of().bar(),
                MenuItem::new(15, "Red").one_of(),
                MenuItem::new(16, "Blue").one_of(),
            ]),
            MenuItem::new(2, "Help"),
        ]
    }

    #[test]
    fn flattens_tree() {
        let mut m = MenuTracker::default();
        m.install(&sample());
        assert_eq!(m.len(), 9);
        assert!(m.get(16).is_some());
    }

    #[test]
    fn one_of_selection_clears_siblings() {
        let mut m = MenuTracker::default();
        m.install(&sample());
        m.select(12, true).unwrap();
        let changes = m.select(13, true).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(m.get(13).unwrap().checked);
        assert!(!m.get(12).unwrap().checked);
    }

    #[test]
    fn bar_splits_groups() {
        let mut m = MenuTracker::default();
        m.install(&sample());
        m.select(14, true).unwrap();
        m.select(15, true).unwrap();
        assert!(m.get(14).unwrap().checked);
        assert!(m.get(15).unwrap().checked);
        m.select(16, true).unwrap();
        assert!(!m.get(15).unwrap().checked);
    }

    #[test]
    fn toggle_and_enable() {
        let mut m = MenuTracker::default();
        m.install(&sample());
        assert_eq!(m.select(11, true).unwrap().len(), 1);
        assert!(m.get(11).unwrap().checked);
        let change = m.enable(10, false).unwrap();
        assert_eq!(
            change,
            MenuChange {
                id: 10,
                enabled: false,
                checked: false
            }
        );
    }

    #[test]
    fn plain_items_are_not_selectable() {
        let mut m = MenuTracker::default();
        m.install(&sample());
        assert_eq!(m.select(10, true).unwrap_err().kind(), ErrorKind::InvalidParameter);
        assert_eq!(m.enable(99, true).unwrap_err().kind(), ErrorKind::InvalidParameter);
    }
}

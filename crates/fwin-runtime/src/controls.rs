#![forbid(unsafe_code)]

//! Widget, menu, and picture operations on a window.
//!
//! Widget creation and destruction round-trip through the display pump
//! with the runtime lock released; every other widget call is a direct
//! native call under the lock.

use fwin_backend::{MenuItem, NativeDisplay};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Rect, Size};
use fwin_core::handle::FileHandle;
use fwin_render::color::PackedRgba;

use crate::context::{Context, DISPLAY_PUMP};
use crate::intertask;
use crate::pump::ControlOp;
use crate::widget::{WidgetEntry, WidgetSpec};

impl Context {
    /// Run `f` on widget `id` of the window bound to `output`.
    fn with_widget<T>(
        &self,
        output: FileHandle,
        id: i32,
        f: impl FnOnce(&mut WidgetEntry, &mut dyn NativeDisplay) -> Result<T>,
    ) -> Result<T> {
        self.with_window(output, |w, d| f(w.widgets.get_mut(id)?, d))
    }

    // ── Widgets ────────────────────────────────────────────────────────

    /// Create widget `id` on the window bound to `output`.
    ///
    /// Fails with `DuplicateWidget` if the id is taken, including by a
    /// widget created on another thread while this request was in flight.
    pub fn create_widget(&self, output: FileHandle, id: i32, spec: &WidgetSpec) -> Result<()> {
        let control = {
            let guard = self.lock();
            let window = guard.registry.by_output(output)?;
            window.widgets.check_free(id)?;
            spec.control_spec(window.native)?
        };

        let handles = intertask::request(
            &self.controls,
            self.tags.next(),
            ControlOp::Create(control),
            DISPLAY_PUMP,
        )??;
        let entry = WidgetEntry::new(id, spec, handles);

        let inserted = self
            .lock()
            .registry
            .by_output_mut(output)
            .and_then(|w| w.widgets.insert(entry.clone()));
        if let Err(err) = inserted {
            if let Err(cleanup) = self.destroy_control(&entry) {
                tracing::warn!(id, %cleanup, "orphaned control could not be destroyed");
            }
            return Err(err);
        }
        tracing::debug!(%output, id, kind = ?spec.kind, "widget created");
        Ok(())
    }

    /// Destroy widget `id`. The entry stays registered until the native
    /// control is gone.
    pub fn destroy_widget(&self, output: FileHandle, id: i32) -> Result<()> {
        let entry = self.lock().registry.by_output(output)?.widgets.get(id)?.clone();
        self.destroy_control(&entry)?;
        let removed = self
            .lock()
            .registry
            .by_output_mut(output)
            .and_then(|w| w.widgets.remove(id));
        if let Err(err) = removed {
            tracing::debug!(%output, id, %err, "widget already unlinked");
        }
        tracing::debug!(%output, id, "widget destroyed");
        Ok(())
    }

    pub fn enable_widget(&self, output: FileHandle, id: i32, enabled: bool) -> Result<()> {
        self.with_widget(output, id, |e, d| {
            d.control_set_enabled(e.handles.main, enabled)?;
            if let Some(buddy) = e.handles.buddy {
                d.control_set_enabled(buddy, enabled)?;
            }
            e.enabled = enabled;
            Ok(())
        })
    }

    /// Check or uncheck a checkbox or radio button.
    pub fn select_widget(&self, output: FileHandle, id: i32, checked: bool) -> Result<()> {
        self.with_widget(output, id, |e, d| {
            if !e.kind.is_checkable() {
                return Err(Error::invalid(format!("widget {id} has no check state")));
            }
            d.control_set_checked(e.handles.main, checked)?;
            e.checked = checked;
            Ok(())
        })
    }

    /// Last known check state of a checkbox or radio button.
    pub fn widget_checked(&self, output: FileHandle, id: i32) -> Result<bool> {
        self.read_window(output, |w| w.widgets.get(id).map(|e| e.checked))?
    }

    pub fn widget_text(&self, output: FileHandle, id: i32) -> Result<String> {
        let guard = self.lock();
        let handle = guard.registry.by_output(output)?.widgets.get(id)?.text_handle();
        guard.display.control_text(handle)
    }

    pub fn put_widget_text(&self, output: FileHandle, id: i32, text: &str) -> Result<()> {
        self.with_widget(output, id, |e, d| d.control_set_text(e.text_handle(), text))
    }

    /// Resize widget `id` to `width` x `height` pixels, keeping its origin.
    pub fn resize_widget(&self, output: FileHandle, id: i32, width: i32, height: i32) -> Result<()> {
        if width < 0 || height < 0 {
            return Err(Error::invalid(format!("widget size {width}x{height}")));
        }
        self.with_widget(output, id, |e, d| {
            let rect = Rect::new(e.rect.x, e.rect.y, width, height);
            d.control_set_rect(e.handles.main, rect)?;
            e.rect = rect;
            Ok(())
        })
    }

    /// Move widget `id` to 0-based client pixel `(x, y)`.
    pub fn reposition_widget(&self, output: FileHandle, id: i32, x: i32, y: i32) -> Result<()> {
        self.with_widget(output, id, |e, d| {
            let rect = Rect::new(x, y, e.rect.width, e.rect.height);
            d.control_set_rect(e.handles.main, rect)?;
            e.rect = rect;
            Ok(())
        })
    }

    pub fn widget_front(&self, output: FileHandle, id: i32) -> Result<()> {
        self.with_widget(output, id, |e, d| d.control_raise(e.handles.main, true))
    }

    pub fn widget_back(&self, output: FileHandle, id: i32) -> Result<()> {
        self.with_widget(output, id, |e, d| d.control_raise(e.handles.main, false))
    }

    /// Set the position of a scroll bar, slider, progress bar, or number
    /// select, or the selected tab (1-based). The value is clamped to the
    /// widget's range.
    pub fn set_widget_value(&self, output: FileHandle, id: i32, value: i32) -> Result<()> {
        self.with_widget(output, id, |e, d| {
            if !e.kind.has_value() {
                return Err(Error::invalid(format!("widget {id} has no position")));
            }
            let value = value.clamp(e.range.0, e.range.1);
            d.control_set_value(e.handles.main, e.native_value(value))?;
            e.value = value;
            Ok(())
        })
    }

    /// Last known position of widget `id`.
    pub fn widget_value(&self, output: FileHandle, id: i32) -> Result<i32> {
        self.read_window(output, |w| w.widgets.get(id).map(|e| e.value))?
    }

    // ── Menus ──────────────────────────────────────────────────────────

    /// Install a menu bar, or remove it with `None`.
    pub fn set_menu(&self, output: FileHandle, menu: Option<&[MenuItem]>) -> Result<()> {
        self.with_window(output, |w, d| {
            d.set_menu(w.native, menu)?;
            match menu {
                Some(items) => w.menu.install(items),
                None => w.menu.clear(),
            }
            Ok(())
        })
    }

    pub fn menu_enable(&self, output: FileHandle, id: i32, enabled: bool) -> Result<()> {
        self.with_window(output, |w, d| {
            let change = w.menu.enable(id, enabled)?;
            d.set_menu_state(w.native, change.id, change.enabled, change.checked)
        })
    }

    /// Check or uncheck a toggle or one-of item. Checking a one-of member
    /// unchecks the rest of its group.
    pub fn menu_select(&self, output: FileHandle, id: i32, on: bool) -> Result<()> {
        self.with_window(output, |w, d| {
            for change in w.menu.select(id, on)? {
                d.set_menu_state(w.native, change.id, change.enabled, change.checked)?;
            }
            Ok(())
        })
    }

    /// Tracked check state of menu item `id`.
    pub fn menu_checked(&self, output: FileHandle, id: i32) -> Result<bool> {
        self.read_window(output, |w| {
            w.menu
                .get(id)
                .map(|item| item.checked)
                .ok_or_else(|| Error::invalid(format!("menu id {id}")))
        })?
    }

    // ── Pictures ───────────────────────────────────────────────────────

    /// Store a `width` x `height` bitmap of row-major pixels in `slot`.
    pub fn load_picture(
        &self,
        output: FileHandle,
        slot: usize,
        width: i32,
        height: i32,
        pixels: &[PackedRgba],
    ) -> Result<()> {
        self.with_window(output, |w, _| w.pictures.load(slot, width, height, pixels))
    }

    /// Stretch picture `slot` into the 1-based corners `(x1, y1)`..`(x2, y2)`.
    pub fn draw_picture(
        &self,
        output: FileHandle,
        slot: usize,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<()> {
        self.with_window(output, |w, d| w.draw_picture(d, slot, x1, y1, x2, y2))
    }

    pub fn delete_picture(&self, output: FileHandle, slot: usize) -> Result<()> {
        self.with_window(output, |w, _| w.pictures.delete(slot))
    }

    pub fn picture_size(&self, output: FileHandle, slot: usize) -> Result<Size> {
        self.read_window(output, |w| w.pictures.size(slot))?
    }
}

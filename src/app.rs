//! Demo host: one multi-select, a Submit control and a status line.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config;
use crate::error::Result;
use crate::focus::{FocusCheck, FocusId, FocusRing, FocusTracker, Part, WidgetId};
use crate::handle::MultiSelectHandle;
use crate::models::SelectableItem;
use crate::multiselect::MultiSelect;
use crate::theme::Theme;
use crate::ui::HitRegions;

/// Status line shared between the app and the widget's listeners.
pub type Status = Arc<Mutex<String>>;

/// Listener that writes the current selection into `status`.
pub fn report_selection(status: &Status) -> impl FnMut(&[SelectableItem]) + Send + 'static {
    let status = Arc::clone(status);
    move |items: &[SelectableItem]| {
        let names: Vec<&str> = items.iter().map(|i| i.content.as_str()).collect();
        *status.lock() = format!("Selected ({}): {}", items.len(), names.join(", "));
    }
}

pub struct App {
    pub handle: MultiSelectHandle,
    pub focus: FocusTracker,
    pub hits: HitRegions,
    pub theme: Theme,
    widget: WidgetId,
    submit: FocusId,
    pointer_in_menu: bool,
    status: Status,
    save_path: Option<PathBuf>,
}

impl App {
    /// `save_path` is the config file the selection is saved into; `None`
    /// uses the user config file.
    pub fn new(widget: MultiSelect, status: Status, save_path: Option<PathBuf>) -> Self {
        let widget_id = widget.id();
        Self {
            handle: MultiSelectHandle::new(widget),
            focus: FocusTracker::new(),
            hits: HitRegions::default(),
            theme: Theme::default(),
            widget: widget_id,
            submit: FocusId::new(WidgetId::next(), Part::Control),
            pointer_in_menu: false,
            status,
            save_path,
        }
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget
    }

    pub fn submit_id(&self) -> FocusId {
        self.submit
    }

    pub fn status(&self) -> String {
        self.status.lock().clone()
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.lock() = message.into();
    }

    /// Widget part holding focus, if focus is inside the widget.
    pub fn focused_part(&self) -> Option<Part> {
        self.focus
            .active()
            .filter(|f| f.widget == self.widget)
            .map(|f| f.part)
    }

    pub fn focus_ring(&self) -> FocusRing {
        let widget = self.handle.lock();
        let mut order: Vec<FocusId> = widget
            .focusable_parts()
            .into_iter()
            .map(|part| widget.focus_id(part))
            .collect();
        order.push(self.submit);
        FocusRing::new(order)
    }

    pub fn move_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        let current = self.focus.active();
        let next = if forward {
            ring.next_after(current)
        } else {
            ring.prev_before(current)
        };
        self.change_focus(next);
    }

    /// Keeps focus on a live part after a key press changed the widget. The
    /// Select All / Clear All slot follows its replacement; any other part
    /// that vanished hands focus back to the toggle.
    pub fn keep_focus_in_place(&mut self) {
        let Some(part) = self.focused_part() else {
            return;
        };
        let parts = self.handle.lock().focusable_parts();
        if parts.contains(&part) {
            return;
        }
        let replacement = match part {
            Part::SelectAll | Part::ClearAll => parts
                .iter()
                .copied()
                .find(|p| matches!(p, Part::SelectAll | Part::ClearAll))
                .unwrap_or(Part::Toggle),
            _ => Part::Toggle,
        };
        self.focus.focus(Some(FocusId::new(self.widget, replacement)));
    }

    /// Moves focus to `next`. When focus leaves a widget part, the widget is
    /// blurred first; the returned task resolves once its focus check ran.
    pub fn change_focus(&mut self, next: Option<FocusId>) -> Option<JoinHandle<FocusCheck>> {
        let previous = self.focus.active();
        if previous == next {
            return None;
        }
        let check = previous
            .filter(|f| f.widget == self.widget)
            .map(|f| self.handle.blur(f.part, &self.focus));
        self.focus.focus(next);
        check
    }

    /// Pointer press at a screen cell. Waits for a pending focus check so the
    /// click lands on settled state.
    pub async fn press(&mut self, column: u16, row: u16) {
        let target = self.hits.hit(column, row);
        let (focus_target, click) = match target {
            Some(t) if t.widget == self.widget => match t.part {
                Part::Menu => return,
                Part::Disclosure => (Some(FocusId::new(t.widget, Part::Toggle)), Some(t.part)),
                part => (Some(t), Some(part)),
            },
            Some(t) => (Some(t), None),
            None => (None, None),
        };

        if let Some(check) = self.change_focus(focus_target) {
            if let Err(e) = check.await {
                warn!(error = %e, "focus check task failed");
            }
        }
        match click {
            Some(part) => {
                self.handle.lock().click(part);
            }
            None if target == Some(self.submit) => self.submit(),
            None => {}
        }
    }

    /// Pointer moved to a screen cell.
    pub fn hover(&mut self, column: u16, row: u16) {
        let over_menu = self
            .hits
            .hit(column, row)
            .filter(|t| t.widget == self.widget && matches!(t.part, Part::Menu | Part::Item(_)));
        match over_menu {
            Some(target) => {
                self.pointer_in_menu = true;
                self.handle.lock().pointer_move(target.part);
            }
            None if self.pointer_in_menu => {
                self.pointer_in_menu = false;
                self.handle.lock().pointer_leave_menu();
            }
            None => {}
        }
    }

    pub fn submit(&self) {
        let widget = self.handle.lock();
        let selection = widget.selection();
        info!(count = selection.len(), "selection submitted");
        self.set_status(format!("Submitted {} item(s): {}", selection.len(), selection.summary()));
    }

    /// Saves the selected ids as the initial selection for the next start.
    pub fn save_selection(&self) -> Result<PathBuf> {
        let ids = self.handle.lock().selection().ids();
        let path = match &self.save_path {
            Some(path) => {
                config::save_initial_selection(path, &ids)?;
                path.clone()
            }
            None => config::save_user_selection(&ids)?,
        };
        info!(path = %path.display(), count = ids.len(), "selection saved");
        self.set_status(format!("Saved {} id(s) to {}", ids.len(), path.display()));
        Ok(path)
    }

    /// Reports a failure on the status line.
    pub fn report_error(&self, context: &str, error: &dyn std::error::Error) {
        warn!(%error, "{context}");
        self.set_status(format!("{context}: {error}"));
    }
}

//! Parent-held handle to a mounted [`MultiSelect`].
//!
//! Each call locks the widget for the whole handler, listener callbacks
//! included, so handlers never interleave.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::focus::{FocusCheck, FocusTracker, Part};
use crate::models::{IdRecord, SelectableItem};
use crate::multiselect::{Command, MultiSelect};

/// Listeners run while the widget is locked. A listener must not call back
/// into a clone of the same handle; that call would deadlock.
#[derive(Debug, Clone)]
pub struct MultiSelectHandle {
    inner: Arc<Mutex<MultiSelect>>,
}

impl MultiSelectHandle {
    pub fn new(widget: MultiSelect) -> Self {
        Self {
            inner: Arc::new(Mutex::new(widget)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, MultiSelect> {
        self.inner.lock()
    }

    pub fn dispatch(&self, command: Command) {
        self.inner.lock().apply(command);
    }

    pub fn set_selected_items_list(&self, items: Vec<SelectableItem>) {
        self.dispatch(Command::ReplaceSelection(items));
    }

    pub fn set_selected_items_list_from_ids(&self, records: Vec<IdRecord>) {
        self.dispatch(Command::ReplaceSelectionByIds(records));
    }

    pub fn toggle_item(&self, item: SelectableItem) {
        self.dispatch(Command::ToggleItem(item));
    }

    pub fn selected_items(&self) -> Vec<SelectableItem> {
        self.inner.lock().selected_items().to_vec()
    }

    /// `part` lost focus. Runs the input blur now and schedules the wrapper's
    /// focus check for the next turn of the runtime, when the new focus
    /// target has been recorded in `focus`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn blur(&self, part: Part, focus: &FocusTracker) -> JoinHandle<FocusCheck> {
        let token = {
            let mut widget = self.inner.lock();
            widget.focus_out(part);
            widget.lifetime_token()
        };
        let weak = Arc::downgrade(&self.inner);
        let focus = focus.clone();

        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if token.is_cancelled() {
                debug!("widget dropped before focus check");
                return FocusCheck::Skipped;
            }
            let Some(inner) = weak.upgrade() else {
                return FocusCheck::Skipped;
            };
            let active = focus.active();
            let outcome = inner.lock().settle_focus(active.as_ref());
            debug!(?outcome, "focus check");
            outcome
        })
    }
}

//! Focus identities and the host-side focus tracker.
//!
//! The tracker plays the role of the active element: hosts move it on Tab,
//! clicks and similar, and a widget asks it after a blur whether focus is
//! still inside.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a mounted widget or host control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A region of a widget that can be focused, clicked or hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The toggle surface, which also acts as the combobox input.
    Toggle,
    Disclosure,
    SelectAll,
    ClearAll,
    Done,
    Menu,
    Item(usize),
    /// A host control that is not part of a multi-select.
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusId {
    pub widget: WidgetId,
    pub part: Part,
}

impl FocusId {
    pub fn new(widget: WidgetId, part: Part) -> Self {
        Self { widget, part }
    }
}

/// Outcome of a deferred post-blur focus check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCheck {
    /// Focus stayed inside the widget; the highlight was cleared.
    StillInside,
    /// Focus left the widget; the menu was closed.
    Closed,
    /// The widget was gone before the check ran.
    Skipped,
}

/// Shared record of which element holds focus.
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    active: Arc<Mutex<Option<FocusId>>>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<FocusId> {
        *self.active.lock()
    }

    /// Moves focus, returning the previously focused element.
    pub fn focus(&self, next: Option<FocusId>) -> Option<FocusId> {
        std::mem::replace(&mut *self.active.lock(), next)
    }

    pub fn is_within(&self, widget: WidgetId) -> bool {
        self.active().is_some_and(|f| f.widget == widget)
    }
}

/// Tab order over the currently focusable elements.
#[derive(Debug, Clone, Default)]
pub struct FocusRing {
    order: Vec<FocusId>,
}

impl FocusRing {
    pub fn new(order: Vec<FocusId>) -> Self {
        Self { order }
    }

    pub fn next_after(&self, current: Option<FocusId>) -> Option<FocusId> {
        let position = current.and_then(|c| self.order.iter().position(|f| *f == c));
        match position {
            Some(i) => self.order.get((i + 1) % self.order.len()).copied(),
            None => self.order.first().copied(),
        }
    }

    pub fn prev_before(&self, current: Option<FocusId>) -> Option<FocusId> {
        let position = current.and_then(|c| self.order.iter().position(|f| *f == c));
        match position {
            Some(0) | None => self.order.last().copied(),
            Some(i) => self.order.get(i - 1).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_reports_previous_focus() {
        let tracker = FocusTracker::new();
        let widget = WidgetId::next();
        let toggle = FocusId::new(widget, Part::Toggle);

        assert_eq!(tracker.focus(Some(toggle)), None);
        assert!(tracker.is_within(widget));
        assert_eq!(tracker.focus(None), Some(toggle));
        assert!(!tracker.is_within(widget));
    }

    #[test]
    fn ring_wraps_both_ways() {
        let w = WidgetId::next();
        let a = FocusId::new(w, Part::Toggle);
        let b = FocusId::new(w, Part::Done);
        let c = FocusId::new(WidgetId::next(), Part::Control);
        let ring = FocusRing::new(vec![a, b, c]);

        assert_eq!(ring.next_after(None), Some(a));
        assert_eq!(ring.next_after(Some(c)), Some(a));
        assert_eq!(ring.prev_before(Some(a)), Some(c));
        assert_eq!(ring.prev_before(Some(c)), Some(b));

        let stale = FocusId::new(w, Part::Item(9));
        assert_eq!(ring.next_after(Some(stale)), Some(a));
    }

    #[test]
    fn widget_ids_are_unique() {
        assert_ne!(WidgetId::next(), WidgetId::next());
    }
}

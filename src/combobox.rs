//! Headless combobox state machine.
//!
//! The machine owns open/closed state, the highlighted index and the last
//! selected item. Every action first computes the default transition, then
//! passes it through [`ComboboxHooks::state_reducer`] so a caller can patch
//! the transition table per action kind. Actions that carry a selection then
//! raise [`ComboboxHooks::on_selected_item_change`].

use std::fmt;

use tracing::{debug, trace};

/// Interaction state of a combobox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxState<T> {
    pub is_open: bool,
    pub highlighted_index: Option<usize>,
    pub selected_item: Option<T>,
}

impl<T> Default for ComboboxState<T> {
    fn default() -> Self {
        Self {
            is_open: false,
            highlighted_index: None,
            selected_item: None,
        }
    }
}

/// Kind of a state transition, used by reducers to pick overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeType {
    InputKeyDownArrowDown,
    InputKeyDownArrowUp,
    InputKeyDownHome,
    InputKeyDownEnd,
    InputKeyDownEscape,
    InputKeyDownEnter,
    InputBlur,
    MenuMouseLeave,
    ItemMouseMove,
    ItemClick,
    ToggleButtonClick,
    FunctionToggleMenu,
    FunctionOpenMenu,
    FunctionCloseMenu,
    FunctionSetHighlightedIndex,
    FunctionSelectItem,
    FunctionReset,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    InputKeyDownArrowDown,
    InputKeyDownArrowUp,
    InputKeyDownHome,
    InputKeyDownEnd,
    InputKeyDownEscape,
    InputKeyDownEnter,
    InputBlur,
    MenuMouseLeave,
    ItemMouseMove(usize),
    ItemClick(usize),
    ToggleButtonClick,
    FunctionToggleMenu,
    FunctionOpenMenu,
    FunctionCloseMenu,
    FunctionSetHighlightedIndex(Option<usize>),
    FunctionSelectItem(T),
    FunctionReset,
}

impl<T> Action<T> {
    pub fn kind(&self) -> StateChangeType {
        match self {
            Action::InputKeyDownArrowDown => StateChangeType::InputKeyDownArrowDown,
            Action::InputKeyDownArrowUp => StateChangeType::InputKeyDownArrowUp,
            Action::InputKeyDownHome => StateChangeType::InputKeyDownHome,
            Action::InputKeyDownEnd => StateChangeType::InputKeyDownEnd,
            Action::InputKeyDownEscape => StateChangeType::InputKeyDownEscape,
            Action::InputKeyDownEnter => StateChangeType::InputKeyDownEnter,
            Action::InputBlur => StateChangeType::InputBlur,
            Action::MenuMouseLeave => StateChangeType::MenuMouseLeave,
            Action::ItemMouseMove(_) => StateChangeType::ItemMouseMove,
            Action::ItemClick(_) => StateChangeType::ItemClick,
            Action::ToggleButtonClick => StateChangeType::ToggleButtonClick,
            Action::FunctionToggleMenu => StateChangeType::FunctionToggleMenu,
            Action::FunctionOpenMenu => StateChangeType::FunctionOpenMenu,
            Action::FunctionCloseMenu => StateChangeType::FunctionCloseMenu,
            Action::FunctionSetHighlightedIndex(_) => StateChangeType::FunctionSetHighlightedIndex,
            Action::FunctionSelectItem(_) => StateChangeType::FunctionSelectItem,
            Action::FunctionReset => StateChangeType::FunctionReset,
        }
    }

    fn selects(&self) -> bool {
        matches!(
            self,
            Action::InputKeyDownEnter | Action::ItemClick(_) | Action::FunctionSelectItem(_)
        )
    }
}

/// The action being applied together with the default changes it produced.
#[derive(Debug)]
pub struct ActionAndChanges<'a, T> {
    pub kind: StateChangeType,
    pub action: &'a Action<T>,
    pub changes: ComboboxState<T>,
}

/// Raised after every selecting action, including re-selection of the item
/// that is already the machine's selected item.
#[derive(Debug)]
pub struct SelectedItemChange<'a, T> {
    pub kind: StateChangeType,
    pub selected_item: Option<&'a T>,
}

/// Caller-side hooks of the state machine.
pub trait ComboboxHooks<T> {
    /// Returns the state to commit for a transition. `state` is the state
    /// before the transition.
    fn state_reducer(
        &mut self,
        state: &ComboboxState<T>,
        action_and_changes: ActionAndChanges<'_, T>,
    ) -> ComboboxState<T> {
        let _ = state;
        action_and_changes.changes
    }

    fn on_selected_item_change(&mut self, change: SelectedItemChange<'_, T>);
}

#[derive(Debug, Clone)]
pub struct Combobox<T> {
    state: ComboboxState<T>,
}

impl<T> Default for Combobox<T> {
    fn default() -> Self {
        Self {
            state: ComboboxState::default(),
        }
    }
}

impl<T: Clone + PartialEq + fmt::Debug> Combobox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ComboboxState<T> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.state.highlighted_index
    }

    /// Applies `action` against `items`. Returns `false` when the action does
    /// not apply in the current state, in which case nothing changes and no
    /// hook runs.
    pub fn dispatch<H>(&mut self, items: &[T], action: Action<T>, hooks: &mut H) -> bool
    where
        H: ComboboxHooks<T> + ?Sized,
    {
        let kind = action.kind();
        let Some(changes) = default_changes(&self.state, items, &action) else {
            trace!(?kind, "combobox action ignored");
            return false;
        };

        let next = hooks.state_reducer(
            &self.state,
            ActionAndChanges {
                kind,
                action: &action,
                changes,
            },
        );
        debug!(
            ?kind,
            is_open = next.is_open,
            highlighted = ?next.highlighted_index,
            "combobox transition"
        );
        self.state = next;

        if action.selects() {
            hooks.on_selected_item_change(SelectedItemChange {
                kind,
                selected_item: self.state.selected_item.as_ref(),
            });
        }
        true
    }
}

fn index_on_open<T: PartialEq>(state: &ComboboxState<T>, items: &[T]) -> Option<usize> {
    state
        .selected_item
        .as_ref()
        .and_then(|selected| items.iter().position(|i| i == selected))
}

fn default_changes<T: Clone + PartialEq>(
    state: &ComboboxState<T>,
    items: &[T],
    action: &Action<T>,
) -> Option<ComboboxState<T>> {
    let len = items.len();
    let mut changes = state.clone();

    match action {
        Action::InputKeyDownArrowDown => {
            if len == 0 {
                return None;
            }
            let next = if state.is_open {
                match state.highlighted_index {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                }
            } else {
                index_on_open(state, items).unwrap_or(0)
            };
            changes.is_open = true;
            changes.highlighted_index = Some(next);
        }
        Action::InputKeyDownArrowUp => {
            if len == 0 {
                return None;
            }
            let next = if state.is_open {
                match state.highlighted_index {
                    Some(i) if i > 0 && i < len => i - 1,
                    _ => len - 1,
                }
            } else {
                index_on_open(state, items).unwrap_or(len - 1)
            };
            changes.is_open = true;
            changes.highlighted_index = Some(next);
        }
        Action::InputKeyDownHome | Action::InputKeyDownEnd => {
            if !state.is_open || len == 0 {
                return None;
            }
            let at_end = matches!(action, Action::InputKeyDownEnd);
            changes.highlighted_index = Some(if at_end { len - 1 } else { 0 });
        }
        Action::InputKeyDownEscape | Action::InputBlur | Action::FunctionCloseMenu => {
            changes.is_open = false;
            changes.highlighted_index = None;
        }
        Action::InputKeyDownEnter => {
            if !state.is_open {
                return None;
            }
            let item = items.get(state.highlighted_index?)?;
            changes.selected_item = Some(item.clone());
            changes.is_open = false;
            changes.highlighted_index = None;
        }
        Action::MenuMouseLeave => {
            changes.highlighted_index = None;
        }
        Action::ItemMouseMove(index) => {
            if *index >= len {
                return None;
            }
            changes.highlighted_index = Some(*index);
        }
        Action::ItemClick(index) => {
            let item = items.get(*index)?;
            changes.selected_item = Some(item.clone());
            changes.is_open = false;
            changes.highlighted_index = None;
        }
        Action::ToggleButtonClick | Action::FunctionToggleMenu => {
            if state.is_open {
                changes.is_open = false;
                changes.highlighted_index = None;
            } else {
                changes.is_open = true;
                changes.highlighted_index = index_on_open(state, items);
            }
        }
        Action::FunctionOpenMenu => {
            changes.is_open = true;
            changes.highlighted_index = index_on_open(state, items);
        }
        Action::FunctionSetHighlightedIndex(index) => {
            if matches!(index, Some(i) if *i >= len) {
                return None;
            }
            changes.highlighted_index = *index;
        }
        Action::FunctionSelectItem(item) => {
            changes.selected_item = Some(item.clone());
        }
        Action::FunctionReset => {
            changes = ComboboxState::default();
        }
    }

    Some(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        selections: Vec<Option<&'static str>>,
        keep_open: bool,
    }

    impl ComboboxHooks<&'static str> for Recorder {
        fn state_reducer(
            &mut self,
            _state: &ComboboxState<&'static str>,
            ac: ActionAndChanges<'_, &'static str>,
        ) -> ComboboxState<&'static str> {
            let mut changes = ac.changes;
            if self.keep_open && ac.kind == StateChangeType::ItemClick {
                changes.is_open = true;
            }
            changes
        }

        fn on_selected_item_change(&mut self, change: SelectedItemChange<'_, &'static str>) {
            self.selections.push(change.selected_item.copied());
        }
    }

    const ITEMS: [&str; 3] = ["a", "b", "c"];

    #[test]
    fn arrow_keys_open_and_wrap() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();

        assert!(cb.dispatch(&ITEMS, Action::InputKeyDownArrowDown, &mut hooks));
        assert!(cb.is_open());
        assert_eq!(cb.highlighted_index(), Some(0));

        cb.dispatch(&ITEMS, Action::InputKeyDownArrowUp, &mut hooks);
        assert_eq!(cb.highlighted_index(), Some(2));
        cb.dispatch(&ITEMS, Action::InputKeyDownArrowDown, &mut hooks);
        assert_eq!(cb.highlighted_index(), Some(0));

        cb.dispatch(&ITEMS, Action::InputKeyDownEnd, &mut hooks);
        assert_eq!(cb.highlighted_index(), Some(2));
        assert!(hooks.selections.is_empty());
    }

    #[test]
    fn enter_is_ignored_while_closed() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();
        assert!(!cb.dispatch(&ITEMS, Action::InputKeyDownEnter, &mut hooks));
        assert_eq!(cb.state(), &ComboboxState::default());
        assert!(hooks.selections.is_empty());
    }

    #[test]
    fn enter_selects_highlighted_and_closes_by_default() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();
        cb.dispatch(&ITEMS, Action::FunctionOpenMenu, &mut hooks);
        cb.dispatch(&ITEMS, Action::ItemMouseMove(1), &mut hooks);
        cb.dispatch(&ITEMS, Action::InputKeyDownEnter, &mut hooks);

        assert!(!cb.is_open());
        assert_eq!(cb.state().selected_item, Some("b"));
        assert_eq!(hooks.selections, vec![Some("b")]);
    }

    #[test]
    fn reducer_patches_the_default_transition() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder {
            keep_open: true,
            ..Default::default()
        };
        cb.dispatch(&ITEMS, Action::FunctionOpenMenu, &mut hooks);
        cb.dispatch(&ITEMS, Action::ItemClick(2), &mut hooks);
        assert!(cb.is_open());
        assert_eq!(cb.state().selected_item, Some("c"));
    }

    #[test]
    fn reselecting_the_same_item_raises_again() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();
        cb.dispatch(&ITEMS, Action::FunctionSelectItem("a"), &mut hooks);
        cb.dispatch(&ITEMS, Action::FunctionSelectItem("a"), &mut hooks);
        assert_eq!(hooks.selections, vec![Some("a"), Some("a")]);
    }

    #[test]
    fn opening_highlights_the_selected_item() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();
        cb.dispatch(&ITEMS, Action::FunctionSelectItem("c"), &mut hooks);
        cb.dispatch(&ITEMS, Action::ToggleButtonClick, &mut hooks);
        assert!(cb.is_open());
        assert_eq!(cb.highlighted_index(), Some(2));
        cb.dispatch(&ITEMS, Action::ToggleButtonClick, &mut hooks);
        assert!(!cb.is_open());
        assert_eq!(cb.highlighted_index(), None);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut cb = Combobox::new();
        let mut hooks = Recorder::default();
        assert!(!cb.dispatch(&ITEMS, Action::ItemClick(3), &mut hooks));
        assert!(!cb.dispatch(&ITEMS, Action::ItemMouseMove(9), &mut hooks));
        assert!(!cb.dispatch(&ITEMS, Action::FunctionSetHighlightedIndex(Some(3)), &mut hooks));
        assert!(cb.dispatch(&ITEMS, Action::FunctionSetHighlightedIndex(None), &mut hooks));
    }
}

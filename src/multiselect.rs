//! Multi-select dropdown widget built on the combobox state machine.
//!
//! The widget keeps an ordered [`SelectionSet`] next to the combobox
//! interaction state. Selection events raised by the combobox toggle items in
//! and out of the set; Select All, Clear All and [`Command`]s replace it. Every
//! commit notifies `send_items` and then `update_selected_items`.
//!
//! The combobox's default transitions are patched for three groups of
//! actions:
//!
//! * Enter on the input and item clicks keep the menu open and move the
//!   highlight to the slot before the toggled item's numeric id.
//! * Pointer movement, leaving the menu and input blur cannot close an open
//!   menu.
//! * Everything else keeps the default transition.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::combobox::{
    Action, ActionAndChanges, Combobox, ComboboxHooks, ComboboxState, SelectedItemChange,
    StateChangeType,
};
use crate::conditional::ConditionalDisplay;
use crate::focus::{FocusCheck, FocusId, Part, WidgetId};
use crate::models::{IdRecord, ItemId, SelectableItem, SelectionSet};

/// Callback receiving the full selection after each change.
pub type Listener = Box<dyn FnMut(&[SelectableItem]) + Send>;

fn default_true() -> bool {
    true
}

fn default_button_text() -> String {
    "Done".to_string()
}

/// Configuration of a [`MultiSelect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectProps {
    pub label: String,
    /// Whether clicking the closed toggle opens the menu.
    #[serde(default = "default_true")]
    pub is_editable: bool,
    /// Whether the Select All / Clear All / Done row is shown while open.
    #[serde(default = "default_true")]
    pub has_button: bool,
    #[serde(default = "default_button_text")]
    pub button_text: String,
    #[serde(default)]
    pub class_list: String,
    #[serde(default)]
    pub item_class_list: String,
    #[serde(default)]
    pub selected_item_class_list: String,
    /// Applied once when the widget is mounted.
    #[serde(default)]
    pub initial_selected_item_list: Vec<IdRecord>,
}

impl MultiSelectProps {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_editable: true,
            has_button: true,
            button_text: default_button_text(),
            class_list: String::new(),
            item_class_list: String::new(),
            selected_item_class_list: String::new(),
            initial_selected_item_list: Vec::new(),
        }
    }
}

/// Commands a parent can send to a mounted widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the selection with these items.
    ReplaceSelection(Vec<SelectableItem>),
    /// Replace the selection with the candidates matching these ids.
    ReplaceSelectionByIds(Vec<IdRecord>),
    /// Select or deselect one item through the combobox.
    ToggleItem(SelectableItem),
}

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Char(char),
    Other,
}

impl Key {
    /// Parses a key label such as `"Enter"`, `" "`, `"Space"` or
    /// `"Spacebar"`. Case-insensitive.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "enter" => Key::Enter,
            " " | "space" | "spacebar" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "home" => Key::Home,
            "end" => Key::End,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }

    pub fn activates(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

struct Listeners {
    send_items: Listener,
    update_selected_items: Listener,
}

impl Listeners {
    fn notify(&mut self, selection: &SelectionSet) {
        (self.send_items)(selection.as_slice());
        (self.update_selected_items)(selection.as_slice());
    }
}

/// Selection set plus the listeners told about each commit. Also the
/// combobox hooks, so combobox selection events land here.
struct SelectionStore {
    selection: SelectionSet,
    listeners: Listeners,
}

impl SelectionStore {
    fn commit(&mut self, selection: SelectionSet) {
        debug!(count = selection.len(), "selection committed");
        self.selection = selection;
        self.listeners.notify(&self.selection);
    }
}

/// Highlight slot for a toggled item: its numeric id minus one.
fn highlight_before(id: &ItemId) -> Option<usize> {
    id.as_number()
        .filter(|k| *k >= 1)
        .and_then(|k| usize::try_from(k - 1).ok())
}

impl ComboboxHooks<SelectableItem> for SelectionStore {
    fn state_reducer(
        &mut self,
        state: &ComboboxState<SelectableItem>,
        action_and_changes: ActionAndChanges<'_, SelectableItem>,
    ) -> ComboboxState<SelectableItem> {
        let mut changes = action_and_changes.changes;
        match action_and_changes.kind {
            StateChangeType::InputKeyDownEnter | StateChangeType::ItemClick => {
                if let Some(item) = &changes.selected_item {
                    changes.highlighted_index = highlight_before(&item.id);
                    changes.is_open = true;
                }
            }
            StateChangeType::ItemMouseMove
            | StateChangeType::MenuMouseLeave
            | StateChangeType::InputBlur => {
                if state.is_open {
                    changes.is_open = true;
                }
            }
            _ => {}
        }
        changes
    }

    fn on_selected_item_change(&mut self, change: SelectedItemChange<'_, SelectableItem>) {
        let Some(item) = change.selected_item else {
            return;
        };
        let mut next = self.selection.clone();
        let selected = next.toggle(item);
        debug!(id = %item.id, selected, kind = ?change.kind, "item toggled");
        self.commit(next);
    }
}

/// Builder collecting the optional parts of a widget before mounting.
pub struct MultiSelectBuilder {
    props: MultiSelectProps,
    items: Vec<SelectableItem>,
    send_items: Listener,
}

impl MultiSelectBuilder {
    /// Runs after every commit, before `update_selected_items`. Behind a
    /// [`MultiSelectHandle`](crate::handle::MultiSelectHandle) both listeners
    /// run with the widget locked, so they must not use that handle.
    pub fn send_items(mut self, listener: impl FnMut(&[SelectableItem]) + Send + 'static) -> Self {
        self.send_items = Box::new(listener);
        self
    }

    /// Mounts the widget: seeds the selection from
    /// `initial_selected_item_list` and notifies both listeners once.
    pub fn mount(
        self,
        update_selected_items: impl FnMut(&[SelectableItem]) + Send + 'static,
    ) -> MultiSelect {
        let mut widget = MultiSelect {
            id: WidgetId::next(),
            props: self.props,
            items: self.items,
            combobox: Combobox::new(),
            store: SelectionStore {
                selection: SelectionSet::new(),
                listeners: Listeners {
                    send_items: self.send_items,
                    update_selected_items: Box::new(update_selected_items),
                },
            },
            lifetime: CancellationToken::new(),
        };
        let initial = widget.resolve_ids(&widget.props.initial_selected_item_list);
        debug!(widget = ?widget.id, count = initial.len(), "multiselect mounted");
        widget.store.commit(initial);
        widget
    }
}

pub struct MultiSelect {
    id: WidgetId,
    props: MultiSelectProps,
    items: Vec<SelectableItem>,
    combobox: Combobox<SelectableItem>,
    store: SelectionStore,
    lifetime: CancellationToken,
}

impl fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("id", &self.id)
            .field("props", &self.props)
            .field("items", &self.items.len())
            .field("state", self.combobox.state())
            .field("selection", &self.store.selection)
            .finish()
    }
}

impl Drop for MultiSelect {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

impl MultiSelect {
    pub fn builder(props: MultiSelectProps, items: Vec<SelectableItem>) -> MultiSelectBuilder {
        MultiSelectBuilder {
            props,
            items,
            send_items: Box::new(|_| {}),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn props(&self) -> &MultiSelectProps {
        &self.props
    }

    pub fn items(&self) -> &[SelectableItem] {
        &self.items
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.store.selection
    }

    pub fn selected_items(&self) -> &[SelectableItem] {
        self.store.selection.as_slice()
    }

    pub fn is_open(&self) -> bool {
        self.combobox.is_open()
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.combobox.highlighted_index()
    }

    pub fn focus_id(&self, part: Part) -> FocusId {
        FocusId::new(self.id, part)
    }

    pub fn contains_focus(&self, focus: &FocusId) -> bool {
        focus.widget == self.id
    }

    /// Token cancelled when the widget is dropped.
    pub(crate) fn lifetime_token(&self) -> CancellationToken {
        self.lifetime.child_token()
    }

    /// Replaces the candidate list. The selection is left as it is.
    pub fn set_items(&mut self, items: Vec<SelectableItem>) {
        self.items = items;
        if self
            .highlighted_index()
            .is_some_and(|i| i >= self.items.len())
        {
            self.dispatch(Action::FunctionSetHighlightedIndex(None));
        }
    }

    /// Parts that take focus, in tab order.
    pub fn focusable_parts(&self) -> Vec<Part> {
        let mut parts = vec![Part::Toggle];
        if self.actions_visible() {
            parts.push(self.primary_action().part());
            parts.push(Part::Done);
        }
        if self.is_open() {
            parts.extend((0..self.items.len()).map(Part::Item));
        }
        parts
    }

    fn dispatch(&mut self, action: Action<SelectableItem>) -> bool {
        self.combobox.dispatch(&self.items, action, &mut self.store)
    }

    fn resolve_ids(&self, records: &[IdRecord]) -> SelectionSet {
        SelectionSet::from_items(records.iter().filter_map(|record| {
            let found = self.items.iter().find(|i| i.id == record.id).cloned();
            if found.is_none() {
                debug!(id = %record.id, "no candidate with this id");
            }
            found
        }))
    }

    fn candidate(&self, id: &ItemId) -> Option<SelectableItem> {
        self.items.iter().find(|i| &i.id == id).cloned()
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::ReplaceSelection(items) => {
                let known = items.into_iter().filter(|item| {
                    let known = self.items.contains(item);
                    if !known {
                        debug!(id = %item.id, "no candidate with this id");
                    }
                    known
                });
                let selection = SelectionSet::from_items(known.collect::<Vec<_>>());
                self.store.commit(selection);
            }
            Command::ReplaceSelectionByIds(records) => {
                let selection = self.resolve_ids(&records);
                self.store.commit(selection);
            }
            Command::ToggleItem(item) => match self.candidate(&item.id) {
                Some(candidate) => {
                    self.dispatch(Action::FunctionSelectItem(candidate));
                }
                None => debug!(id = %item.id, "toggle of unknown item ignored"),
            },
        }
    }

    pub fn set_selected_items_list(&mut self, items: Vec<SelectableItem>) {
        self.apply(Command::ReplaceSelection(items));
    }

    pub fn set_selected_items_list_from_ids(&mut self, records: &[IdRecord]) {
        self.apply(Command::ReplaceSelectionByIds(records.to_vec()));
    }

    pub fn toggle_item(&mut self, item: SelectableItem) {
        self.apply(Command::ToggleItem(item));
    }

    fn actions_visible(&self) -> bool {
        self.is_open() && self.props.has_button
    }

    fn primary_action(&self) -> ActionButton {
        if self.store.selection.is_empty() {
            ActionButton::SelectAll
        } else {
            ActionButton::ClearAll
        }
    }

    /// Selects every candidate. Only available while the Select All button
    /// is shown; returns whether it applied.
    pub fn select_all(&mut self) -> bool {
        if !self.actions_visible() || self.primary_action() != ActionButton::SelectAll {
            return false;
        }
        self.store.commit(SelectionSet::from_items(self.items.clone()));
        true
    }

    /// Empties the selection. Only available while the Clear All button is
    /// shown; returns whether it applied.
    pub fn clear_all(&mut self) -> bool {
        if !self.actions_visible() || self.primary_action() != ActionButton::ClearAll {
            return false;
        }
        self.store.commit(SelectionSet::new());
        true
    }

    pub fn open_menu(&mut self) {
        self.dispatch(Action::FunctionOpenMenu);
    }

    pub fn close_menu(&mut self) {
        self.dispatch(Action::FunctionCloseMenu);
    }

    pub fn set_highlighted_index(&mut self, index: Option<usize>) {
        self.dispatch(Action::FunctionSetHighlightedIndex(index));
    }

    /// Pointer click on `part`. Returns whether anything changed.
    pub fn click(&mut self, part: Part) -> bool {
        match part {
            Part::Toggle | Part::Disclosure => {
                self.props.is_editable && !self.is_open() && self.dispatch(Action::FunctionOpenMenu)
            }
            Part::Done => self.actions_visible() && self.dispatch(Action::ToggleButtonClick),
            Part::SelectAll => self.select_all(),
            Part::ClearAll => self.clear_all(),
            Part::Item(index) => self.is_open() && self.dispatch(Action::ItemClick(index)),
            Part::Menu | Part::Control => false,
        }
    }

    /// Key press on the focused `part`, delivered as key-down then key-up.
    pub fn key(&mut self, part: Part, key: Key) {
        self.key_down(part, key);
        self.key_up(part, key);
    }

    pub fn key_down(&mut self, part: Part, key: Key) {
        if part != Part::Toggle {
            return;
        }
        let action = match key {
            Key::ArrowDown => Action::InputKeyDownArrowDown,
            Key::ArrowUp => Action::InputKeyDownArrowUp,
            Key::Home => Action::InputKeyDownHome,
            Key::End => Action::InputKeyDownEnd,
            Key::Escape => Action::InputKeyDownEscape,
            Key::Enter => Action::InputKeyDownEnter,
            _ => return,
        };
        self.dispatch(action);
    }

    pub fn key_up(&mut self, part: Part, key: Key) {
        if !key.activates() {
            return;
        }
        let handled = match part {
            Part::Item(index) => self.is_open() && self.dispatch(Action::ItemClick(index)),
            Part::SelectAll | Part::ClearAll | Part::Done => self.click(part),
            _ => false,
        };
        if !handled && !self.is_open() {
            self.open_menu();
        }
    }

    pub fn pointer_move(&mut self, part: Part) {
        if let Part::Item(index) = part {
            if self.is_open() && self.highlighted_index() != Some(index) {
                self.dispatch(Action::ItemMouseMove(index));
            }
        }
    }

    pub fn pointer_leave_menu(&mut self) {
        if self.is_open() {
            self.dispatch(Action::MenuMouseLeave);
        }
    }

    /// `part` lost focus. Blur of the toggle is the combobox input blur.
    pub fn focus_out(&mut self, part: Part) {
        if part == Part::Toggle {
            self.dispatch(Action::InputBlur);
        }
    }

    /// Post-blur focus check: closes the menu when focus left the widget,
    /// otherwise clears the highlight.
    pub fn settle_focus(&mut self, active: Option<&FocusId>) -> FocusCheck {
        if active.is_some_and(|focus| self.contains_focus(focus)) {
            self.dispatch(Action::FunctionSetHighlightedIndex(None));
            FocusCheck::StillInside
        } else {
            self.dispatch(Action::FunctionCloseMenu);
            FocusCheck::Closed
        }
    }

    pub fn view(&self) -> MultiSelectView {
        let selection = &self.store.selection;
        let count = selection.len();
        let is_open = self.is_open();

        let actions = ConditionalDisplay::new(ActionRow {
            primary: self.primary_action(),
            done_text: self.props.button_text.clone(),
        })
        .display(self.actions_visible())
        .into_option();

        let menu = is_open.then(|| {
            self.items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let active = selection.contains(&item.id);
                    let mut class_list = self.props.item_class_list.clone();
                    if active {
                        class_list = format!("{class_list} is-active {}", self.props.selected_item_class_list);
                    }
                    ItemRow {
                        index,
                        id: item.id.clone(),
                        content: item.content.clone(),
                        active,
                        highlighted: self.highlighted_index() == Some(index),
                        class_list: class_list.trim().to_string(),
                    }
                })
                .collect()
        });

        MultiSelectView {
            label: self.props.label.clone(),
            class_list: self.props.class_list.clone(),
            is_open,
            count_text: format!("{count} selected"),
            summary: ConditionalDisplay::new(selection.summary())
                .display(count >= 1)
                .into_option(),
            actions,
            disclosure: !is_open,
            menu,
        }
    }
}

/// The button shown next to Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    SelectAll,
    ClearAll,
}

impl ActionButton {
    pub fn label(self) -> &'static str {
        match self {
            ActionButton::SelectAll => "Select All",
            ActionButton::ClearAll => "Clear All",
        }
    }

    pub fn part(self) -> Part {
        match self {
            ActionButton::SelectAll => Part::SelectAll,
            ActionButton::ClearAll => Part::ClearAll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRow {
    pub primary: ActionButton,
    pub done_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub index: usize,
    pub id: ItemId,
    pub content: String,
    /// Item is in the selection.
    pub active: bool,
    pub highlighted: bool,
    pub class_list: String,
}

/// Everything needed to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelectView {
    pub label: String,
    pub class_list: String,
    pub is_open: bool,
    /// `"<n> selected"`.
    pub count_text: String,
    /// Selected contents joined with `", "`, when anything is selected.
    pub summary: Option<String>,
    /// Action row, while open with buttons enabled.
    pub actions: Option<ActionRow>,
    /// Disclosure affordance, while closed.
    pub disclosure: bool,
    /// Menu rows, while open.
    pub menu: Option<Vec<ItemRow>>,
}

//! Accessible multi-select dropdown for terminal UIs.
//!
//! [`combobox`] holds the headless combobox state machine, [`multiselect`]
//! the widget built on it, and [`ui`] draws it with Ratatui.

pub mod app;
pub mod combobox;
pub mod conditional;
pub mod config;
pub mod error;
pub mod focus;
pub mod handle;
pub mod input;
pub mod logging;
pub mod models;
pub mod multiselect;
pub mod theme;
pub mod ui;

pub use error::{Error, Result};
pub use focus::{FocusCheck, FocusId, FocusTracker, Part, WidgetId};
pub use handle::MultiSelectHandle;
pub use models::{IdRecord, ItemId, SelectableItem, SelectionSet};
pub use multiselect::{Command, Key, MultiSelect, MultiSelectProps, MultiSelectView};

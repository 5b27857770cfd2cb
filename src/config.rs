use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{IdRecord, SelectableItem};
use crate::multiselect::MultiSelectProps;

/// Built-in defaults, the lowest configuration layer.
const DEFAULTS: &str = r#"
tick_rate_ms = 200

[widget]
label = "Options"
"#;

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub widget: MultiSelectProps,
    /// Candidate list file (`.json` or `.toml`). Takes precedence over `items`.
    #[serde(default)]
    pub items_path: Option<String>,
    #[serde(default)]
    pub items: Vec<SelectableItem>,
    #[serde(default)]
    pub log_file: Option<String>,
    pub tick_rate_ms: u64,
}

impl Settings {
    /// Loads settings from, lowest first: built-in defaults, the user config,
    /// `multiselect.toml` in the working directory, then `explicit`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));

        if let Some(user_config_path) = get_user_config_path() {
            builder = builder.add_source(File::from(user_config_path).required(false));
        }
        builder = builder.add_source(File::with_name("multiselect.toml").required(false));
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading explicit config");
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// The candidate list: `items_path` when set, otherwise the inline items.
    pub fn candidate_items(&self) -> Result<Vec<SelectableItem>> {
        match &self.items_path {
            Some(raw) => load_items(&expand_path(raw)?),
            None => Ok(self.items.clone()),
        }
    }
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("multiselect");
    path.push("multiselect.toml");
    Some(path)
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| Error::PathExpansion {
            path: raw.to_string(),
            message: e.to_string(),
        })
}

#[derive(Deserialize)]
struct ItemsFile {
    items: Vec<SelectableItem>,
}

/// Reads a candidate list: a JSON array of items, or a TOML file with an
/// `[[items]]` array.
pub fn load_items(path: &Path) -> Result<Vec<SelectableItem>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let items = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("toml") => {
            let file: ItemsFile = toml::from_str(&content).map_err(|source| Error::Toml {
                path: path.to_path_buf(),
                source,
            })?;
            file.items
        }
        _ => {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    debug!(path = %path.display(), count = items.len(), "candidate list loaded");
    Ok(items)
}

/// Writes `selection` as `widget.initial_selected_item_list` into the config
/// file at `path`, keeping everything else in it.
pub fn save_initial_selection(path: &Path, selection: &[IdRecord]) -> Result<()> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let mut doc = config_str.parse::<toml::Table>().map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    let widget = doc
        .entry("widget")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| Error::NotATable("widget".to_string()))?;

    let records = selection
        .iter()
        .map(|record| {
            let mut table = toml::Table::new();
            table.insert("id".to_string(), toml::Value::String(record.id.to_string()));
            toml::Value::Table(table)
        })
        .collect();
    widget.insert("initial_selected_item_list".to_string(), toml::Value::Array(records));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, doc.to_string()).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Writes `selection` into the user config file.
pub fn save_user_selection(selection: &[IdRecord]) -> Result<PathBuf> {
    let path = get_user_config_path().ok_or(Error::NoHomeDir)?;
    save_initial_selection(&path, selection)?;
    Ok(path)
}

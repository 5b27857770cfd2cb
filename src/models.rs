use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a selectable item. Integer ids from config files are
/// stringified, so `1` and `"1"` name the same item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct ItemId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl From<RawId> for ItemId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => ItemId(n.to_string()),
            RawId::Text(s) => ItemId(s),
        }
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric reading of the id, if it has one.
    pub fn as_number(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId(n.to_string())
    }
}

/// An `{ id }` record used to seed or replace a selection by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRecord {
    pub id: ItemId,
}

impl IdRecord {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self { id: id.into() }
    }
}

/// One entry of the candidate list.
///
/// Equality is by `id` only: two items with the same id are the same item
/// whatever their content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectableItem {
    pub id: ItemId,
    pub content: String,
}

impl SelectableItem {
    pub fn new(id: impl Into<ItemId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

impl PartialEq for SelectableItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SelectableItem {}

/// Items currently chosen, in the order they were chosen.
///
/// Never holds two items with the same id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    items: Vec<SelectableItem>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `items`, keeping the first occurrence of each id.
    pub fn from_items(items: impl IntoIterator<Item = SelectableItem>) -> Self {
        let mut set = Self::new();
        for item in items {
            if !set.contains(&item.id) {
                set.items.push(item);
            }
        }
        set
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|i| &i.id == id)
    }

    /// Removes `item` if present, otherwise appends it. Returns whether the
    /// item is selected afterwards.
    pub fn toggle(&mut self, item: &SelectableItem) -> bool {
        if let Some(pos) = self.items.iter().position(|i| i.id == item.id) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(item.clone());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[SelectableItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectableItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<IdRecord> {
        self.items.iter().map(|i| IdRecord { id: i.id.clone() }).collect()
    }

    /// Contents joined with `", "`, as shown under the selected count.
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|i| i.content.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a SelectableItem;
    type IntoIter = std::slice::Iter<'a, SelectableItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> Vec<SelectableItem> {
        vec![
            SelectableItem::new("1", "Apple"),
            SelectableItem::new("2", "Banana"),
            SelectableItem::new("3", "Cherry"),
        ]
    }

    #[test]
    fn toggle_appends_then_removes() {
        let items = fruit();
        let mut set = SelectionSet::new();
        assert!(set.toggle(&items[2]));
        assert!(set.toggle(&items[0]));
        assert_eq!(set.summary(), "Cherry, Apple");
        assert!(!set.toggle(&items[2]));
        assert_eq!(set.as_slice(), &[items[0].clone()]);
    }

    #[test]
    fn from_items_drops_duplicate_ids() {
        let items = fruit();
        let dup = SelectableItem::new("1", "Another apple");
        let set = SelectionSet::from_items(vec![items[0].clone(), dup, items[1].clone()]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].content, "Apple");
    }

    #[test]
    fn item_equality_ignores_content() {
        assert_eq!(SelectableItem::new("7", "a"), SelectableItem::new("7", "b"));
        assert_ne!(SelectableItem::new("7", "a"), SelectableItem::new("8", "a"));
    }

    #[test]
    fn ids_deserialize_from_numbers_and_strings() {
        let records: Vec<IdRecord> = serde_json::from_str(r#"[{"id": 1}, {"id": "2"}]"#).unwrap();
        assert_eq!(records, vec![IdRecord::new("1"), IdRecord::new("2")]);
        assert_eq!(ItemId::new(" 4 ").as_number(), Some(4));
        assert_eq!(ItemId::new("four").as_number(), None);
    }
}

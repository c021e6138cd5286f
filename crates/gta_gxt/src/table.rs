//! A single named table of text entries.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::hash::key_hash;

/// Named collection of key → text entries
///
/// Entries are addressed by the [`key_hash`] of their key name. The original names are
/// only known when the table was loaded from a string keyed file with name preservation
/// enabled, or created with [`Table::with_key_names`].
///
/// ```
/// use gta_gxt::Table;
///
/// let mut table = Table::with_key_names("MAIN");
/// table.set_by_name("GA_1", "~g~Hello");
///
/// assert_eq!(table.get_by_name("ga_1"), Some("~g~Hello"));
/// assert_eq!(table.key_name(gta_gxt::hash::key_hash("GA_1")), Some("GA_1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    name: String,
    entries: IndexMap<u32, String>,
    key_names: Option<HashMap<u32, String>>,
}

impl Table {
    /// Create an empty table that only tracks key hashes.
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            entries: IndexMap::new(),
            key_names: None,
        }
    }

    /// Create an empty table that remembers the key names it is given.
    pub fn with_key_names(name: impl Into<String>) -> Table {
        Table {
            key_names: Some(HashMap::new()),
            ..Table::new(name)
        }
    }

    /// Name of the table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the table names match, ignoring ASCII case
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Number of entries in this table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the original key names are being tracked
    pub fn preserves_key_names(&self) -> bool {
        self.key_names.is_some()
    }

    /// Get a value by key hash
    pub fn get(&self, hash: u32) -> Option<&str> {
        self.entries.get(&hash).map(|v| v.as_str())
    }

    /// Get a value by key name
    pub fn get_by_name(&self, key: &str) -> Option<&str> {
        self.get(key_hash(key))
    }

    /// Whether an entry exists for the key hash
    pub fn contains(&self, hash: u32) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Whether an entry exists for the key name
    pub fn contains_name(&self, key: &str) -> bool {
        self.contains(key_hash(key))
    }

    /// Set a value by key hash, returning the value it replaced.
    pub fn set(&mut self, hash: u32, value: impl Into<String>) -> Option<String> {
        self.entries.insert(hash, value.into())
    }

    /// Set a value by key name, returning the value it replaced.
    ///
    /// The name is remembered when this table preserves key names.
    pub fn set_by_name(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        let hash = key_hash(key);
        if let Some(names) = self.key_names.as_mut() {
            names.insert(hash, key.to_owned());
        }
        self.set(hash, value)
    }

    /// Remove an entry by key hash, returning its value.
    pub fn remove(&mut self, hash: u32) -> Option<String> {
        if let Some(names) = self.key_names.as_mut() {
            names.remove(&hash);
        }
        self.entries.shift_remove(&hash)
    }

    /// Remove an entry by key name, returning its value.
    pub fn remove_by_name(&mut self, key: &str) -> Option<String> {
        self.remove(key_hash(key))
    }

    /// Original key name for a hash, if it is known
    pub fn key_name(&self, hash: u32) -> Option<&str> {
        self.key_names
            .as_ref()
            .and_then(|names| names.get(&hash))
            .map(|n| n.as_str())
    }

    /// Iterate over `(hash, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(hash, value)| (*hash, value.as_str()))
    }

    pub(crate) fn insert_named(&mut self, key: String, value: String) {
        let hash = key_hash(&key);
        if let Some(names) = self.key_names.as_mut() {
            names.insert(hash, key);
        }
        self.entries.insert(hash, value);
    }
}

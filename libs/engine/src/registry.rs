//! Insertion-ordered registry of every event name observed.

use indexmap::IndexMap;

/// Event names in first-seen order, each with the number of entries logged.
///
/// Grows monotonically for the engine's lifetime.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entry of `event_name`. Returns true on its first occurrence.
    ///
    /// Matching is exact and case-sensitive.
    pub fn register(&mut self, event_name: &str) -> bool {
        if let Some(count) = self.types.get_mut(event_name) {
            *count += 1;
            return false;
        }
        self.types.insert(event_name.to_string(), 1);
        true
    }

    pub fn contains(&self, event_name: &str) -> bool {
        self.types.contains_key(event_name)
    }

    /// Entries of `event_name` logged so far.
    pub fn entry_count(&self, event_name: &str) -> usize {
        self.types.get(event_name).copied().unwrap_or(0)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

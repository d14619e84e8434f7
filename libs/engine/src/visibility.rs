//! Per-type visibility toggles and the policy for fresh entries.

use std::collections::HashMap;

/// Event name to visible/hidden, as set by the user's filter controls.
#[derive(Debug, Default, Clone)]
pub struct FilterState {
    visible: HashMap<String, bool>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event_name: &str) -> Option<bool> {
        self.visible.get(event_name).copied()
    }

    /// Record the user's choice for `event_name`. Returns the previous value.
    pub fn set(&mut self, event_name: &str, visible: bool) -> Option<bool> {
        self.visible.insert(event_name.to_string(), visible)
    }

    /// Default a newly registered type to visible, keeping any choice the
    /// user already made. Returns the effective value.
    pub fn enable_default(&mut self, event_name: &str) -> bool {
        *self.visible.entry(event_name.to_string()).or_insert(true)
    }
}

/// Whether a new entry of `event_name` starts visible. Unknown types are visible.
pub fn should_render(event_name: &str, filters: &FilterState) -> bool {
    filters.get(event_name).unwrap_or(true)
}

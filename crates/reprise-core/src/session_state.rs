//! Script-visible key/value state.
//!
//! Session state is layered. Writes made during the current run land in the
//! *pending* generation; [`SessionState::promote`] folds them into the
//! *committed* generation at the run boundary. Reads go through a three-tier
//! resolver:
//!
//! 1. pending (written this run),
//! 2. widget-live (the value the client currently holds for a widget whose
//!    ID equals the key),
//! 3. committed (written by an earlier run).
//!
//! The first tier that has the key wins.

use crate::collections::map::{HashMap, HashSet};
use crate::error::WidgetError;
use crate::identity::is_generated_id;
use crate::record::WidgetId;
use crate::store::WidgetStateStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pending: HashMap<String, Value>,
    committed: HashMap<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `key` was written during the current run.
    pub fn is_new_value(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn get_new_value(&self, key: &str) -> Option<&Value> {
        self.pending.get(key)
    }

    pub fn get_old_value(&self, key: &str) -> Option<&Value> {
        self.committed.get(key)
    }

    /// Resolves `key` across pending, widget-live and committed, in that order.
    pub fn resolve(&self, key: &str, widgets: &WidgetStateStore) -> Option<Value> {
        if let Some(value) = self.pending.get(key) {
            return Some(value.clone());
        }
        if let Some(value) = widgets.deserialized_value(key) {
            return Some(value);
        }
        self.committed.get(key).cloned()
    }

    /// Snapshot of the resolved view, ordered by key.
    pub fn merged(&self, widgets: &WidgetStateStore) -> BTreeMap<String, Value> {
        let mut merged: BTreeMap<String, Value> = self
            .committed
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (id, value) in widgets.live_values() {
            merged.insert(id.as_str().to_owned(), value);
        }
        for (key, value) in &self.pending {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Makes this run's writes the next run's defaults.
    pub fn promote(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        log::trace!("promoting {} pending session state keys", self.pending.len());
        self.committed.extend(self.pending.drain());
    }

    /// Removes `key` from both generations.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pending = self.pending.remove(key);
        let committed = self.committed.remove(key);
        pending.or(committed)
    }

    /// Writes into the pending generation without the widget-conflict check.
    /// Reserved for the runtime's own commits.
    pub(crate) fn insert_pending(&mut self, key: impl Into<String>, value: Value) {
        self.pending.insert(key.into(), value);
    }

    /// Forgets values stored under generated widget IDs that are not in
    /// `live`. User keys are left alone: the script may still read them.
    pub(crate) fn cull_widget_keys(&mut self, live: &HashSet<WidgetId>) {
        let stale = |key: &String| is_generated_id(key) && !live.contains(key.as_str());
        self.pending.retain(|key, _| !stale(key));
        self.committed.retain(|key, _| !stale(key));
    }

    pub(crate) fn discard_pending(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("discarding {} pending session state keys", self.pending.len());
        }
        self.pending.clear();
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut merged: BTreeMap<&str, &Value> = self
            .committed
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        merged.extend(self.pending.iter().map(|(key, value)| (key.as_str(), value)));
        let text = serde_json::to_string(&merged).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Session state as seen from script code or a callback.
///
/// Borrowing the widget store and the set of widget IDs declared so far in
/// the run lets reads include live widget values and lets writes refuse to
/// clobber a widget that was already declared this run.
pub struct SessionStateProxy<'a> {
    state: &'a mut SessionState,
    widgets: &'a WidgetStateStore,
    registered: &'a HashSet<WidgetId>,
}

impl<'a> SessionStateProxy<'a> {
    pub fn new(
        state: &'a mut SessionState,
        widgets: &'a WidgetStateStore,
        registered: &'a HashSet<WidgetId>,
    ) -> Self {
        Self {
            state,
            widgets,
            registered,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.resolve(key, self.widgets)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Typed read. `None` when the key is unset or has another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The widget-live tier alone.
    pub fn widget_value(&self, key: &str) -> Option<Value> {
        self.widgets.deserialized_value(key)
    }

    pub fn is_new_value(&self, key: &str) -> bool {
        self.state.is_new_value(key)
    }

    pub fn get_new_value(&self, key: &str) -> Option<&Value> {
        self.state.get_new_value(key)
    }

    pub fn get_old_value(&self, key: &str) -> Option<&Value> {
        self.state.get_old_value(key)
    }

    /// Writes `key` into the pending generation.
    ///
    /// Fails with [`WidgetError::StateWriteConflict`] when `key` is the ID of
    /// a widget already declared in this run: the script would otherwise
    /// believe a value the user never sees.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<(), WidgetError> {
        let key = key.into();
        if self.registered.contains(key.as_str()) {
            return Err(WidgetError::StateWriteConflict { key });
        }
        self.state.insert_pending(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.state.remove(key)
    }

    /// Sets `key` only if the merged view doesn't have it yet.
    pub fn init_value(&mut self, key: &str, default: Value) -> Result<(), WidgetError> {
        if self.contains(key) {
            return Ok(());
        }
        self.set(key, default)
    }

    pub fn init_values<K, I>(&mut self, values: I) -> Result<(), WidgetError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (key, value) in values {
            self.init_value(key.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn merged(&self) -> BTreeMap<String, Value> {
        self.state.merged(self.widgets)
    }

    pub fn keys(&self) -> Vec<String> {
        self.merged().into_keys().collect()
    }

    pub fn len(&self) -> usize {
        self.merged().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SessionStateProxy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.merged()).finish()
    }
}

#[cfg(test)]
#[path = "tests/session_state_tests.rs"]
mod tests;

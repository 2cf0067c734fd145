//! Per-session widget state.
//!
//! The [`WidgetStateStore`] keeps two generations of client records: the
//! current batch, authoritative for the run about to start, and the batch
//! before it. Change detection for on-change callbacks compares the two
//! through each widget's registered deserializer.
//!
//! Records are only ever replaced wholesale when a new batch arrives; nothing
//! mutates a record in place, so the previous generation is always a
//! structurally distinct snapshot.

use crate::collections::map::{HashMap, HashSet};
use crate::error::WidgetError;
use crate::record::{StateRecord, WidgetId, WidgetStates, WidgetValue};
use crate::session_state::{SessionState, SessionStateProxy};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Converts a wire value (or its absence) into the widget's application value.
pub type Deserializer = Arc<dyn Fn(Option<&WidgetValue>) -> Value + Send + Sync>;

/// Decodes one client record. `None` means the record doesn't fit the widget,
/// usually because another kind of widget held the ID before.
pub type LiveDecoder = Arc<dyn Fn(&WidgetValue) -> Option<Value> + Send + Sync>;

/// Whether an application value left by an earlier run still fits a widget.
pub type ValueFilter = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// On-change callback. Receives session state and its captured arguments.
///
/// Callbacks only see session state, never the store, so they can't register
/// widgets while dispatch is walking the batch.
pub type WidgetCallback =
    Arc<dyn Fn(&mut SessionStateProxy<'_>, &[Value]) -> Result<(), WidgetError> + Send + Sync>;

/// Arguments captured at registration time and replayed on dispatch.
pub type CallbackArgs = SmallVec<[Value; 2]>;

pub fn deserializer_from<F>(decode: F) -> Deserializer
where
    F: Fn(Option<&WidgetValue>) -> Value + Send + Sync + 'static,
{
    Arc::new(decode)
}

pub fn callback_from<F>(callback: F) -> WidgetCallback
where
    F: Fn(&mut SessionStateProxy<'_>, &[Value]) -> Result<(), WidgetError> + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Decodes the raw wire value; an absent record becomes `null`.
pub fn identity_deserializer() -> Deserializer {
    deserializer_from(|value| value.map(WidgetValue::to_value).unwrap_or(Value::Null))
}

/// Merges two successive batches without losing button presses.
///
/// Every record of `new` wins, except that a `true` trigger in `old` is kept
/// when `new` still carries a trigger for that widget. A widget that stopped
/// being a trigger keeps its new value, so a stale click can't leak onto
/// whatever widget now owns the ID. The result follows `new`'s order.
pub fn coalesce(old: &WidgetStates, new: &WidgetStates) -> WidgetStates {
    let mut merged = new.clone();
    let positions: HashMap<&str, usize> = new
        .iter()
        .enumerate()
        .map(|(index, record)| (record.id.as_str(), index))
        .collect();

    for old_record in old {
        let WidgetValue::Trigger(true) = old_record.value else {
            continue;
        };
        let Some(&index) = positions.get(old_record.id.as_str()) else {
            continue;
        };
        match merged.widgets[index].value {
            WidgetValue::Trigger(false) => {
                log::trace!("coalesce: keeping unacknowledged trigger {}", old_record.id);
                merged.widgets[index].value = WidgetValue::Trigger(true);
            }
            WidgetValue::Trigger(true) => {}
            WidgetValue::Bool(_)
            | WidgetValue::Int(_)
            | WidgetValue::Double(_)
            | WidgetValue::String(_)
            | WidgetValue::IntArray(_)
            | WidgetValue::DoubleArray(_)
            | WidgetValue::StringArray(_)
            | WidgetValue::Json(_) => {}
        }
    }
    merged
}

/// Callback and deserializer tables, saved at run start so an aborted run
/// can be rolled back.
#[derive(Clone, Default)]
pub(crate) struct Registrations {
    callbacks: HashMap<WidgetId, WidgetCallback>,
    deserializers: HashMap<WidgetId, Deserializer>,
    args: HashMap<WidgetId, CallbackArgs>,
}

#[derive(Default)]
pub struct WidgetStateStore {
    states: HashMap<WidgetId, StateRecord>,
    previous_states: HashMap<WidgetId, StateRecord>,
    callbacks: HashMap<WidgetId, WidgetCallback>,
    deserializers: HashMap<WidgetId, Deserializer>,
    args: HashMap<WidgetId, CallbackArgs>,
}

impl fmt::Debug for WidgetStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut callbacks: Vec<&WidgetId> = self.callbacks.keys().collect();
        callbacks.sort();
        f.debug_struct("WidgetStateStore")
            .field("states", &self.marshall())
            .field("previous", &self.previous_states.len())
            .field("callbacks", &callbacks)
            .finish()
    }
}

impl WidgetStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `batch` the current generation; the old current one becomes
    /// previous.
    pub fn set_state(&mut self, batch: WidgetStates) {
        let incoming: HashMap<WidgetId, StateRecord> = batch
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        self.previous_states = std::mem::replace(&mut self.states, incoming);
    }

    pub fn get_value(&self, id: &str) -> Option<&WidgetValue> {
        self.states.get(id).map(|record| &record.value)
    }

    pub fn get_previous_value(&self, id: &str) -> Option<&WidgetValue> {
        self.previous_states.get(id).map(|record| &record.value)
    }

    pub fn has_value(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Registers the change-detection bookkeeping for a widget. A widget has
    /// at most one callback; registering again replaces it.
    pub fn add_callback(
        &mut self,
        id: WidgetId,
        deserializer: Deserializer,
        callback: WidgetCallback,
        args: CallbackArgs,
    ) {
        self.deserializers.insert(id.clone(), deserializer);
        self.callbacks.insert(id.clone(), callback);
        self.args.insert(id, args);
    }

    pub fn add_deserializer(&mut self, id: WidgetId, deserializer: Deserializer) {
        self.deserializers.insert(id, deserializer);
    }

    /// Drops a callback left over from an earlier declaration of `id`.
    pub fn remove_callback(&mut self, id: &str) {
        self.callbacks.remove(id);
        self.args.remove(id);
    }

    pub fn has_callback(&self, id: &str) -> bool {
        self.callbacks.contains_key(id)
    }

    pub fn clear_callbacks(&mut self) {
        self.callbacks.clear();
        self.args.clear();
    }

    pub(crate) fn registrations(&self) -> Registrations {
        Registrations {
            callbacks: self.callbacks.clone(),
            deserializers: self.deserializers.clone(),
            args: self.args.clone(),
        }
    }

    pub(crate) fn restore_registrations(&mut self, saved: Registrations) {
        let Registrations {
            callbacks,
            deserializers,
            args,
        } = saved;
        self.callbacks = callbacks;
        self.deserializers = deserializers;
        self.args = args;
    }

    /// The registered deserializer, or the identity decoder.
    pub fn deserializer(&self, id: &str) -> Deserializer {
        self.deserializers
            .get(id)
            .cloned()
            .unwrap_or_else(identity_deserializer)
    }

    /// The widget's current application value, if the client sent one.
    pub fn deserialized_value(&self, id: &str) -> Option<Value> {
        let value = self.get_value(id)?;
        Some((self.deserializer(id))(Some(value)))
    }

    /// Current application values of every widget the client sent.
    pub fn live_values(&self) -> impl Iterator<Item = (&WidgetId, Value)> + '_ {
        self.states
            .iter()
            .map(|(id, record)| (id, (self.deserializer(id.as_str()))(Some(&record.value))))
    }

    /// Whether the previous and current records decode to different values.
    ///
    /// Missing records are fed to the deserializer as unset, so a widget's
    /// first appearance compares against its default rather than against
    /// nothing.
    pub fn values_changed(&self, id: &str) -> bool {
        let deserializer = self.deserializer(id);
        let previous = deserializer(self.get_previous_value(id));
        let current = deserializer(self.get_value(id));
        previous != current
    }

    /// Invokes the callbacks of widgets in `batch` whose value changed.
    ///
    /// Runs in batch order and must complete before the next run starts.
    /// Returns how many callbacks fired; the first callback error stops
    /// dispatch.
    pub fn dispatch_callbacks(
        &self,
        batch: &WidgetStates,
        state: &mut SessionState,
    ) -> Result<usize, WidgetError> {
        let no_widgets = HashSet::default();
        let mut fired = 0;
        for record in batch {
            let id = record.id.as_str();
            let Some(callback) = self.callbacks.get(id) else {
                continue;
            };
            if !self.values_changed(id) {
                continue;
            }
            let args = self.args.get(id).map(|args| args.as_slice()).unwrap_or(&[]);
            log::debug!("dispatching on-change callback for {id}");
            let mut proxy = SessionStateProxy::new(state, self, &no_widgets);
            callback(&mut proxy, args)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Forgets every trigger record. Triggers default to false, so this is
    /// the same as resetting them, and stops a click from replaying on a run
    /// the client didn't cause.
    pub fn reset_triggers(&mut self) {
        self.states.retain(|_, record| !record.value.is_trigger());
    }

    /// Drops records and bookkeeping of widgets outside `valid_ids`.
    pub fn cull(&mut self, valid_ids: &HashSet<WidgetId>) {
        let before = self.states.len();
        self.states.retain(|id, _| valid_ids.contains(id));
        self.callbacks.retain(|id, _| valid_ids.contains(id));
        self.deserializers.retain(|id, _| valid_ids.contains(id));
        self.args.retain(|id, _| valid_ids.contains(id));
        let culled = before - self.states.len();
        if culled > 0 {
            log::debug!("culled {culled} widget states no longer declared");
        }
    }

    /// The current generation as a batch, sorted by widget ID.
    pub fn marshall(&self) -> WidgetStates {
        let mut records: Vec<StateRecord> = self.states.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        WidgetStates { widgets: records }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

//! Form scopes.
//!
//! Widgets declared inside a form don't commit their values to session state
//! as they change. Their values are buffered per form and only committed when
//! the form's submit button fires.

use crate::collections::map::{HashMap, HashSet};
use crate::error::{FormUsageError, WidgetError};
use crate::record::WidgetId;
use serde_json::Value;

/// The form stack of one run. Forms can't nest, so the stack is at most one
/// deep.
#[derive(Debug, Default)]
pub struct FormScope {
    current: Option<String>,
    seen: HashSet<String>,
}

impl FormScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, key: &str) -> Result<(), WidgetError> {
        if let Some(outer) = &self.current {
            return Err(FormUsageError::NestedForm {
                outer: outer.clone(),
                inner: key.to_owned(),
            }
            .into());
        }
        if !self.seen.insert(key.to_owned()) {
            return Err(FormUsageError::DuplicateForm {
                key: key.to_owned(),
            }
            .into());
        }
        self.current = Some(key.to_owned());
        Ok(())
    }

    pub fn exit(&mut self) {
        self.current = None;
    }

    pub fn is_in_form(&self) -> bool {
        self.current.is_some()
    }

    /// The enclosing form's ID, or `""` outside any form.
    pub fn current_form_id(&self) -> &str {
        self.current.as_deref().unwrap_or("")
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }
}

/// Unsubmitted widget values, per form. Lives as long as the session.
#[derive(Clone, Debug, Default)]
pub(crate) struct FormBuffers {
    forms: HashMap<String, HashMap<WidgetId, Value>>,
}

impl FormBuffers {
    pub(crate) fn get(&self, form_id: &str, id: &str) -> Option<&Value> {
        self.forms.get(form_id)?.get(id)
    }

    pub(crate) fn buffer(&mut self, form_id: &str, id: WidgetId, value: Value) {
        self.forms
            .entry(form_id.to_owned())
            .or_default()
            .insert(id, value);
    }

    /// Removes and returns the buffered values of `form_id`.
    pub(crate) fn take(&mut self, form_id: &str) -> HashMap<WidgetId, Value> {
        self.forms.remove(form_id).unwrap_or_default()
    }

    pub(crate) fn retain_forms(&mut self, live: &HashSet<String>) {
        self.forms.retain(|form_id, _| live.contains(form_id));
    }
}

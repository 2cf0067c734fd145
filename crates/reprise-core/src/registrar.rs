//! Per-declaration entry point.
//!
//! Every widget declaration funnels through [`register_widget`]: it derives
//! the widget's identity, rejects duplicates within the run, records the
//! change-detection bookkeeping on the store and reports the widget's value.

use crate::context::ScriptRunContext;
use crate::declaration::WidgetKind;
use crate::error::{FormUsageError, WidgetError};
use crate::identity::compute_widget_id;
use crate::record::{WidgetId, WidgetValue};
use crate::session_state::SessionStateProxy;
use crate::store::{
    callback_from, identity_deserializer, CallbackArgs, Deserializer, LiveDecoder, ValueFilter,
    WidgetCallback,
};
use serde_json::Value;
use std::fmt;

/// Everything the registrar needs to know about one declaration.
#[derive(Clone)]
pub struct WidgetRegistration {
    kind: WidgetKind,
    func_name: &'static str,
    payload: Value,
    user_key: Option<String>,
    id: WidgetId,
    deserializer: Deserializer,
    live_decoder: Option<LiveDecoder>,
    value_filter: Option<ValueFilter>,
    callback: Option<WidgetCallback>,
    args: CallbackArgs,
}

impl WidgetRegistration {
    /// `payload` holds the declaration's semantic parameters. The widget ID
    /// is derived from it right away, so later builder calls can't change
    /// the identity.
    pub fn new(kind: WidgetKind, payload: Value, user_key: Option<&str>) -> Self {
        let id = compute_widget_id(kind, &payload, user_key);
        Self {
            kind,
            func_name: kind.as_str(),
            payload,
            user_key: user_key.map(str::to_owned),
            id,
            deserializer: identity_deserializer(),
            live_decoder: None,
            value_filter: None,
            callback: None,
            args: CallbackArgs::new(),
        }
    }

    /// Name used in error messages, when it differs from the kind.
    pub fn with_func_name(mut self, func_name: &'static str) -> Self {
        self.func_name = func_name;
        self
    }

    pub fn with_deserializer(mut self, deserializer: Deserializer) -> Self {
        self.deserializer = deserializer;
        self
    }

    /// Decoder used while resolving the value. A record it rejects counts as
    /// missing. Without one, every record is decoded by the deserializer.
    pub fn with_live_decoder(mut self, decoder: LiveDecoder) -> Self {
        self.live_decoder = Some(decoder);
        self
    }

    /// Filter for values that earlier runs left in session state or in the
    /// form buffer. Without one, every value fits.
    pub fn with_value_filter(mut self, filter: ValueFilter) -> Self {
        self.value_filter = Some(filter);
        self
    }

    pub fn on_change<F>(mut self, callback: F, args: impl IntoIterator<Item = Value>) -> Self
    where
        F: Fn(&mut SessionStateProxy<'_>, &[Value]) -> Result<(), WidgetError>
            + Send
            + Sync
            + 'static,
    {
        self.callback = Some(callback_from(callback));
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_callback(mut self, callback: Option<WidgetCallback>, args: CallbackArgs) -> Self {
        self.callback = callback;
        self.args = args;
        self
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn func_name(&self) -> &'static str {
        self.func_name
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn user_key(&self) -> Option<&str> {
        self.user_key.as_deref()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn is_form_submitter(&self) -> bool {
        self.payload
            .get("is_form_submitter")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Decodes a wire value through this registration's deserializer.
    pub fn deserialize(&self, value: Option<&WidgetValue>) -> Value {
        (self.deserializer)(value)
    }

    /// Decodes a client record for value resolution; `None` if it doesn't fit.
    pub fn decode_live(&self, value: &WidgetValue) -> Option<Value> {
        match &self.live_decoder {
            Some(decode) => decode(value),
            None => Some(self.deserialize(Some(value))),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.value_filter.as_ref().map_or(true, |fits| fits(value))
    }

    pub(crate) fn duplicate_error(&self) -> WidgetError {
        WidgetError::DuplicateWidgetId {
            func_name: self.func_name.to_owned(),
            user_key: self.user_key.clone(),
            id: self.id.clone(),
        }
    }
}

impl fmt::Debug for WidgetRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistration")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("payload", &self.payload)
            .field("has_callback", &self.callback.is_some())
            .field("args", &self.args)
            .finish()
    }
}

/// Outcome of a registration.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredWidget {
    pub id: WidgetId,
    /// The store's value through the deserializer; the buffered value for an
    /// unsubmitted widget inside a form.
    pub value: Value,
}

/// Registers one widget declaration with the current run.
///
/// Without a run context the declaration is evaluated non-interactively: the
/// deserializer is applied to "unset" and nothing else happens.
pub fn register_widget(
    ctx: Option<&mut ScriptRunContext<'_>>,
    registration: WidgetRegistration,
) -> Result<RegisteredWidget, WidgetError> {
    let Some(ctx) = ctx else {
        let value = registration.deserialize(None);
        return Ok(RegisteredWidget {
            id: registration.id,
            value,
        });
    };

    if ctx.is_in_form() && registration.callback.is_some() && !registration.is_form_submitter() {
        return Err(FormUsageError::CallbackInForm {
            kind: registration.kind,
        }
        .into());
    }

    if !ctx.mark_registered(registration.id.clone()) {
        log::debug!("duplicate widget id {} in run {}", registration.id, ctx.run_id());
        return Err(registration.duplicate_error());
    }

    let WidgetRegistration {
        id,
        deserializer,
        callback,
        args,
        ..
    } = registration;

    let store = ctx.widgets_mut();
    match callback {
        Some(callback) => store.add_callback(id.clone(), deserializer.clone(), callback, args),
        None => {
            store.remove_callback(id.as_str());
            store.add_deserializer(id.clone(), deserializer.clone());
        }
    }

    let submitted = ctx.widgets().get_value(id.as_str()).cloned();
    let value = match submitted {
        Some(value) => deserializer(Some(&value)),
        None if ctx.is_in_form() => match ctx.buffered_value(id.as_str()) {
            Some(buffered) => buffered.clone(),
            None => deserializer(None),
        },
        None => deserializer(None),
    };
    log::trace!("registered widget {id}");
    Ok(RegisteredWidget { id, value })
}

#[cfg(test)]
#[path = "tests/registrar_tests.rs"]
mod tests;

//! Value precedence for non-button widgets.
//!
//! Outside a form the first of these wins:
//!
//! 1. a session-state write made earlier in this run,
//! 2. the value the client currently holds for the widget,
//! 3. the value committed by an earlier run,
//! 4. the value passed by the caller,
//! 5. the widget's built-in default.
//!
//! The result is written back to session state so it becomes the next
//! run's committed value.
//!
//! A client record the widget can't decode, or a committed value it doesn't
//! accept, is skipped. Both show up when an ID changes widget kind.
//!
//! The declaration overrides the client's display when the caller supplied a
//! value, when session state was written for the widget earlier in the run,
//! or when the client's record was skipped.
//!
//! Inside a form nothing is written to session state. A value the client
//! submitted wins, then the form's buffer, then the caller's value, then the
//! built-in default, and the winner is (re)buffered until the form's submit
//! button fires.

use crate::context::ScriptRunContext;
use crate::error::WidgetError;
use crate::registrar::WidgetRegistration;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct ValueResolution {
    pub value: Value,
    /// The declaration must carry `value` as an override of whatever the
    /// client displays.
    pub force_set_value: bool,
}

pub fn resolve_widget_value(
    ctx: Option<&mut ScriptRunContext<'_>>,
    registration: &WidgetRegistration,
    caller_value: Option<Value>,
    builtin_default: Value,
) -> Result<ValueResolution, WidgetError> {
    let Some(ctx) = ctx else {
        return Ok(ValueResolution {
            value: caller_value.unwrap_or(builtin_default),
            force_set_value: false,
        });
    };
    let id = registration.id();
    if ctx.is_registered(id.as_str()) {
        return Err(registration.duplicate_error());
    }

    let record = ctx.widgets().get_value(id.as_str());
    let live = record.and_then(|value| registration.decode_live(value));
    let stale_record = record.is_some() && live.is_none();
    if stale_record {
        log::debug!("client record of {id} doesn't fit a {}; ignoring it", registration.kind());
    }

    if ctx.is_in_form() {
        let value = match live {
            Some(value) => value,
            None => match ctx
                .buffered_value(id.as_str())
                .filter(|&buffered| registration.accepts(buffered))
            {
                Some(buffered) => buffered.clone(),
                None => caller_value.unwrap_or(builtin_default),
            },
        };
        ctx.buffer_value(id.clone(), value.clone());
        return Ok(ValueResolution {
            value,
            force_set_value: false,
        });
    }

    let has_live = live.is_some();
    let caller_supplied = caller_value.is_some();

    let mut state = ctx.session_state();
    let is_new_value = state.is_new_value(id.as_str());
    let value = state
        .get_new_value(id.as_str())
        .cloned()
        .or(live)
        .or_else(|| {
            state
                .get_old_value(id.as_str())
                .filter(|&committed| registration.accepts(committed))
                .cloned()
        })
        .or(caller_value)
        .unwrap_or(builtin_default);
    state.set(id.as_str(), value.clone())?;

    if caller_supplied && is_new_value && !has_live {
        ctx.warn(
            id.clone(),
            format!(
                "the widget with key \"{id}\" was created with a default value but also had \
                 its value set via session state"
            ),
        );
    }

    Ok(ValueResolution {
        value,
        force_set_value: caller_supplied || is_new_value || stale_record,
    })
}

#[cfg(test)]
#[path = "tests/policy_tests.rs"]
mod tests;

#![doc = r"Widget identity and state reconciliation for script-rerun UIs."]

pub extern crate self as reprise_core;

pub mod collections;
pub mod context;
pub mod declaration;
mod error;
pub mod form;
pub mod hash;
pub mod identity;
pub mod policy;
pub mod record;
pub mod registrar;
pub mod session;
pub mod session_state;
pub mod store;

pub use context::{RunId, ScriptRunContext, UserWarning};
pub use declaration::{WidgetDeclaration, WidgetKind};
pub use error::{FormUsageError, WidgetError};
pub use form::FormScope;
pub use identity::{compute_widget_id, is_generated_id, GENERATED_ID_PREFIX};
pub use policy::{resolve_widget_value, ValueResolution};
pub use record::{StateRecord, ValueKind, WidgetId, WidgetStates, WidgetValue};
pub use registrar::{register_widget, RegisteredWidget, WidgetRegistration};
pub use session::{RunOutput, Session, SessionOptions};
pub use session_state::{SessionState, SessionStateProxy};
pub use store::{
    callback_from, coalesce, deserializer_from, identity_deserializer, CallbackArgs, Deserializer,
    LiveDecoder, ValueFilter, WidgetCallback, WidgetStateStore,
};

pub use serde_json::Value;

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod form_tests;

use crate::declaration::WidgetKind;
use crate::record::WidgetId;

/// Misuse of form scopes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormUsageError {
    /// A plain button was declared inside a form.
    ButtonInForm,
    /// A form-submit button was declared outside any form.
    SubmitOutsideForm,
    /// A form was opened while another one was still open.
    NestedForm { outer: String, inner: String },
    /// Two forms with the same key in one run.
    DuplicateForm { key: String },
    /// A widget inside a form asked for an on-change callback.
    CallbackInForm { kind: WidgetKind },
}

impl std::fmt::Display for FormUsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormUsageError::ButtonInForm => {
                write!(f, "`button` can't be used inside a form; use `form_submit_button`")
            }
            FormUsageError::SubmitOutsideForm => {
                write!(f, "`form_submit_button` must be used inside a form")
            }
            FormUsageError::NestedForm { outer, inner } => write!(
                f,
                "form '{inner}' can't be declared inside form '{outer}'; forms can't be nested"
            ),
            FormUsageError::DuplicateForm { key } => write!(
                f,
                "there are multiple identical forms with key='{key}'; form keys must be unique"
            ),
            FormUsageError::CallbackInForm { kind } => write!(
                f,
                "`{kind}` inside a form can't have an on-change callback; only the form's submit button can"
            ),
        }
    }
}

/// Errors raised while declaring widgets or touching session state.
///
/// All of these are programming errors in the script. They abort the run
/// they occur in and are never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetError {
    DuplicateWidgetId {
        func_name: String,
        user_key: Option<String>,
        id: WidgetId,
    },
    StateWriteConflict {
        key: String,
    },
    Form(FormUsageError),
    InvalidValue {
        kind: WidgetKind,
        message: String,
    },
}

impl WidgetError {
    pub fn invalid_value(kind: WidgetKind, message: impl Into<String>) -> Self {
        WidgetError::InvalidValue {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetError::DuplicateWidgetId {
                func_name,
                user_key: Some(key),
                ..
            } => write!(
                f,
                "There are multiple identical `{func_name}` widgets with key='{key}'. \
                 To fix this, make sure that the `key` argument is unique for each \
                 `{func_name}` you create."
            ),
            WidgetError::DuplicateWidgetId {
                func_name,
                user_key: None,
                id,
            } => write!(
                f,
                "There are multiple identical `{func_name}` widgets with the same generated key \
                 ({id}). A widget without a key is identified by its structure, so widgets with \
                 identical structure collide. To fix this, pass a unique `key` argument to \
                 `{func_name}`."
            ),
            WidgetError::StateWriteConflict { key } => write!(
                f,
                "setting the value of widget '{key}' after its creation in this run is disallowed"
            ),
            WidgetError::Form(err) => err.fmt(f),
            WidgetError::InvalidValue { kind, message } => {
                write!(f, "invalid value for `{kind}`: {message}")
            }
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<FormUsageError> for WidgetError {
    fn from(err: FormUsageError) -> Self {
        WidgetError::Form(err)
    }
}

//! The declaration pattern shared by every value widget.
//!
//! A value widget is declared in four steps: its identity is derived from
//! the semantic parameters, the value is resolved by the precedence policy,
//! the widget is registered with a deserializer that falls back to the
//! resolved value, and a declaration is emitted for the rendering layer.
//!
//! While resolving, a client record the codec can't decode counts as
//! missing, and a value from an earlier run only counts if it survives an
//! encode and decode unchanged.

use crate::ui::{OnChange, Ui};
use reprise_core::{
    deserializer_from, register_widget, resolve_widget_value, LiveDecoder, Value, ValueFilter,
    WidgetDeclaration, WidgetError, WidgetKind, WidgetRegistration, WidgetValue,
};
use std::sync::Arc;

/// Wire value to application value. `None` means the record doesn't fit the
/// widget, which is treated like a missing record.
pub(crate) type Decode = LiveDecoder;

/// Application value to wire value.
pub(crate) type Encode = Arc<dyn Fn(&Value) -> WidgetValue + Send + Sync>;

pub(crate) struct ValueWidget {
    pub kind: WidgetKind,
    pub params: Value,
    pub key: Option<String>,
    pub caller_value: Option<Value>,
    pub builtin_default: Value,
    pub decode: Decode,
    pub encode: Encode,
    pub on_change: Option<OnChange>,
}

impl ValueWidget {
    pub fn new(kind: WidgetKind, params: Value, builtin_default: Value) -> Self {
        Self {
            kind,
            params,
            key: None,
            caller_value: None,
            builtin_default,
            decode: decode_with(|value| Some(value.to_value())),
            encode: Arc::new(WidgetValue::from_value),
            on_change: None,
        }
    }

    pub fn key(mut self, key: Option<&str>) -> Self {
        self.key = key.map(str::to_owned);
        self
    }

    pub fn caller_value(mut self, value: Option<Value>) -> Self {
        self.caller_value = value;
        self
    }

    pub fn codec<D, E>(mut self, decode: D, encode: E) -> Self
    where
        D: Fn(&WidgetValue) -> Option<Value> + Send + Sync + 'static,
        E: Fn(&Value) -> WidgetValue + Send + Sync + 'static,
    {
        self.decode = decode_with(decode);
        self.encode = Arc::new(encode);
        self
    }

    pub fn on_change(mut self, on_change: Option<OnChange>) -> Self {
        self.on_change = on_change;
        self
    }
}

fn decode_with<D>(decode: D) -> Decode
where
    D: Fn(&WidgetValue) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(decode)
}

/// Resolves and registers `widget`, emits its declaration and returns the
/// application value the script sees.
///
/// `validate` runs on the resolved value before anything is registered, so a
/// rejected value aborts the run without a half-declared widget.
pub(crate) fn declare_value_widget(
    ui: &mut Ui<'_, '_>,
    widget: ValueWidget,
    validate: impl FnOnce(&Value) -> Result<(), WidgetError>,
) -> Result<Value, WidgetError> {
    let ValueWidget {
        kind,
        mut params,
        key,
        caller_value,
        builtin_default,
        decode,
        encode,
        on_change,
    } = widget;

    let form_id = ui.current_form_id().to_owned();
    with_form_id(&mut params, &form_id);

    let (fit_decode, fit_encode) = (Arc::clone(&decode), Arc::clone(&encode));
    let fits: ValueFilter = Arc::new(move |value: &Value| {
        fit_decode(&fit_encode(value)).is_some_and(|decoded| same_value(&decoded, value))
    });
    let registration = WidgetRegistration::new(kind, params.clone(), key.as_deref())
        .with_live_decoder(Arc::clone(&decode))
        .with_value_filter(fits);

    let resolved = resolve_widget_value(ui.ctx(), &registration, caller_value, builtin_default)?;
    validate(&resolved.value)?;

    let fallback = resolved.value.clone();
    let (callback, args) = match on_change {
        Some(OnChange { callback, args }) => (Some(callback), args),
        None => (None, Default::default()),
    };
    let registration = registration
        .with_deserializer(deserializer_from(move |value| {
            value
                .and_then(|value| decode(value))
                .unwrap_or_else(|| fallback.clone())
        }))
        .with_callback(callback, args);

    let registered = register_widget(ui.ctx(), registration)?;
    log::trace!(
        "{kind} {} resolved to {} (forced: {})",
        registered.id,
        resolved.value,
        resolved.force_set_value
    );

    if let Some(ctx) = ui.ctx() {
        let mut declaration = WidgetDeclaration::new(kind, registered.id, form_id, params)
            .with_default(encode(&resolved.value));
        if resolved.force_set_value {
            declaration = declaration.with_override(encode(&resolved.value));
        }
        ctx.emit(declaration);
    }
    Ok(resolved.value)
}

/// Equality that doesn't tell `3` from `3.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Builds the `params` object of a declaration, skipping unset fields.
pub(crate) fn params(fields: impl IntoIterator<Item = (&'static str, Option<Value>)>) -> Value {
    let map = fields
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_owned(), value)))
        .collect::<serde_json::Map<String, Value>>();
    Value::Object(map)
}

/// Widgets inside a form hash their form too, so equal widgets in two forms
/// don't collide.
pub(crate) fn with_form_id(params: &mut Value, form_id: &str) {
    if form_id.is_empty() {
        return;
    }
    if let Value::Object(map) = params {
        map.insert("form_id".to_owned(), Value::from(form_id));
    }
}

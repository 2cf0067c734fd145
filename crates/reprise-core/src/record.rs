//! Client-submitted widget values.
//!
//! A [`StateRecord`] is the immutable snapshot the client produces for one
//! widget. Exactly one [`WidgetValue`] variant is populated per record; the
//! variant itself is the record's kind tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Identity of a widget across runs.
///
/// Either the user-supplied key verbatim, or a generated ID derived from the
/// widget kind and its declaration payload (see [`crate::identity`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WidgetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for WidgetId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Discriminant of a [`WidgetValue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Trigger,
    Bool,
    Int,
    Double,
    String,
    IntArray,
    DoubleArray,
    StringArray,
    Json,
}

/// The single populated value of a [`StateRecord`].
///
/// `Trigger` is the momentary flag used by buttons and form submitters. It
/// is a one-shot event rather than a persistent setting, which is why the
/// store treats it specially when coalescing and resetting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WidgetValue {
    #[serde(rename = "trigger_value")]
    Trigger(bool),
    #[serde(rename = "bool_value")]
    Bool(bool),
    #[serde(rename = "int_value")]
    Int(i64),
    #[serde(rename = "double_value")]
    Double(f64),
    #[serde(rename = "string_value")]
    String(String),
    #[serde(rename = "int_array_value")]
    IntArray(Vec<i64>),
    #[serde(rename = "double_array_value")]
    DoubleArray(Vec<f64>),
    #[serde(rename = "string_array_value")]
    StringArray(Vec<String>),
    /// Raw JSON text, decoded lazily.
    #[serde(rename = "json_value")]
    Json(String),
}

impl WidgetValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            WidgetValue::Trigger(_) => ValueKind::Trigger,
            WidgetValue::Bool(_) => ValueKind::Bool,
            WidgetValue::Int(_) => ValueKind::Int,
            WidgetValue::Double(_) => ValueKind::Double,
            WidgetValue::String(_) => ValueKind::String,
            WidgetValue::IntArray(_) => ValueKind::IntArray,
            WidgetValue::DoubleArray(_) => ValueKind::DoubleArray,
            WidgetValue::StringArray(_) => ValueKind::StringArray,
            WidgetValue::Json(_) => ValueKind::Json,
        }
    }

    #[inline]
    pub fn is_trigger(&self) -> bool {
        matches!(self, WidgetValue::Trigger(_))
    }

    /// Decodes the wire value into an application value.
    ///
    /// Malformed JSON blobs decode to `null`; the transport is expected to
    /// reject those before they get here.
    pub fn to_value(&self) -> Value {
        match self {
            WidgetValue::Trigger(flag) | WidgetValue::Bool(flag) => Value::Bool(*flag),
            WidgetValue::Int(v) => Value::from(*v),
            WidgetValue::Double(v) => Value::from(*v),
            WidgetValue::String(v) => Value::String(v.clone()),
            WidgetValue::IntArray(items) => Value::from(items.clone()),
            WidgetValue::DoubleArray(items) => Value::from(items.clone()),
            WidgetValue::StringArray(items) => Value::from(items.clone()),
            WidgetValue::Json(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
                log::warn!("discarding malformed json widget value: {err}");
                Value::Null
            }),
        }
    }

    /// Best-effort encoding of an application value for the wire.
    ///
    /// Widgets with a specific wire shape (selection indices, dates) encode
    /// themselves; this is the fallback for everything else.
    pub fn from_value(value: &Value) -> WidgetValue {
        match value {
            Value::Bool(flag) => WidgetValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(v) => WidgetValue::Int(v),
                None => WidgetValue::Double(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(v) => WidgetValue::String(v.clone()),
            Value::Array(items) => {
                if items.is_empty() {
                    return WidgetValue::IntArray(Vec::new());
                }
                if let Some(strings) = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>()
                {
                    return WidgetValue::StringArray(strings);
                }
                if let Some(ints) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
                    return WidgetValue::IntArray(ints);
                }
                if let Some(doubles) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
                    return WidgetValue::DoubleArray(doubles);
                }
                WidgetValue::Json(value.to_string())
            }
            Value::Null | Value::Object(_) => WidgetValue::Json(value.to_string()),
        }
    }
}

/// One widget's client-submitted value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: WidgetId,
    pub value: WidgetValue,
}

impl StateRecord {
    pub fn new(id: impl Into<WidgetId>, value: WidgetValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    pub fn trigger(id: impl Into<WidgetId>, fired: bool) -> Self {
        Self::new(id, WidgetValue::Trigger(fired))
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

/// An ordered batch of records, as delivered by the transport once per
/// interaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetStates {
    pub widgets: Vec<StateRecord>,
}

impl WidgetStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StateRecord) {
        self.widgets.push(record);
    }

    /// Builder-style [`WidgetStates::push`].
    pub fn with(mut self, id: impl Into<WidgetId>, value: WidgetValue) -> Self {
        self.push(StateRecord::new(id, value));
        self
    }

    pub fn get(&self, id: &str) -> Option<&StateRecord> {
        self.widgets.iter().find(|record| record.id.as_str() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateRecord> {
        self.widgets.iter()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl FromIterator<StateRecord> for WidgetStates {
    fn from_iter<I: IntoIterator<Item = StateRecord>>(iter: I) -> Self {
        Self {
            widgets: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for WidgetStates {
    type Item = StateRecord;
    type IntoIter = std::vec::IntoIter<StateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.widgets.into_iter()
    }
}

impl<'a> IntoIterator for &'a WidgetStates {
    type Item = &'a StateRecord;
    type IntoIter = std::slice::Iter<'a, StateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.widgets.iter()
    }
}

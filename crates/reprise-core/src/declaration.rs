//! Outbound widget declarations handed to the rendering layer.

use crate::record::{WidgetId, WidgetValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Button,
    Checkbox,
    TextInput,
    TextArea,
    NumberInput,
    Selectbox,
    Radio,
    Multiselect,
    SelectSlider,
    ColorPicker,
    DateInput,
    TimeInput,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Button => "button",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::TextInput => "text_input",
            WidgetKind::TextArea => "text_area",
            WidgetKind::NumberInput => "number_input",
            WidgetKind::Selectbox => "selectbox",
            WidgetKind::Radio => "radio",
            WidgetKind::Multiselect => "multiselect",
            WidgetKind::SelectSlider => "select_slider",
            WidgetKind::ColorPicker => "color_picker",
            WidgetKind::DateInput => "date_input",
            WidgetKind::TimeInput => "time_input",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one widget declaration produced in a run.
///
/// `params` carries the semantic parameters (label, options, bounds, ...)
/// and is what the generated ID hashes. `default` is the resolved value in
/// wire form. When `value_set` is true, `value` must overwrite whatever the
/// client currently displays.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDeclaration {
    pub kind: WidgetKind,
    pub id: WidgetId,
    pub form_id: String,
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<WidgetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<WidgetValue>,
    pub value_set: bool,
}

impl WidgetDeclaration {
    pub fn new(kind: WidgetKind, id: WidgetId, form_id: impl Into<String>, params: Value) -> Self {
        Self {
            kind,
            id,
            form_id: form_id.into(),
            params,
            default: None,
            value: None,
            value_set: false,
        }
    }

    pub fn with_default(mut self, default: WidgetValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks `value` as an explicit override of the client's display.
    pub fn with_override(mut self, value: WidgetValue) -> Self {
        self.value = Some(value);
        self.value_set = true;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.params.get("label").and_then(Value::as_str)
    }

    pub fn is_form_submitter(&self) -> bool {
        self.params
            .get("is_form_submitter")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

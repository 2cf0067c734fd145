use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextInputType {
    #[default]
    Default,
    Password,
}

impl TextInputType {
    fn as_str(self) -> &'static str {
        match self {
            TextInputType::Default => "default",
            TextInputType::Password => "password",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextInputOptions {
    pub key: Option<String>,
    pub value: Option<String>,
    pub max_chars: Option<usize>,
    pub input_type: TextInputType,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

#[derive(Clone, Debug, Default)]
pub struct TextAreaOptions {
    pub key: Option<String>,
    pub value: Option<String>,
    pub max_chars: Option<usize>,
    /// Height in pixels.
    pub height: Option<u32>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn text_input(&mut self, label: &str) -> Result<String, WidgetError> {
        self.text_input_with(label, TextInputOptions::default())
    }

    pub fn text_input_with(
        &mut self,
        label: &str,
        options: TextInputOptions,
    ) -> Result<String, WidgetError> {
        let params = params([
            ("label", Some(Value::from(label))),
            ("max_chars", options.max_chars.map(Value::from)),
            ("type", Some(Value::from(options.input_type.as_str()))),
            ("help", options.help.map(Value::from)),
            ("disabled", options.disabled.then_some(Value::Bool(true))),
        ]);
        declare_text(
            self,
            WidgetKind::TextInput,
            params,
            options.key.as_deref(),
            options.value,
            options.max_chars,
            options.on_change,
        )
    }

    pub fn text_area(&mut self, label: &str) -> Result<String, WidgetError> {
        self.text_area_with(label, TextAreaOptions::default())
    }

    pub fn text_area_with(
        &mut self,
        label: &str,
        options: TextAreaOptions,
    ) -> Result<String, WidgetError> {
        let params = params([
            ("label", Some(Value::from(label))),
            ("max_chars", options.max_chars.map(Value::from)),
            ("height", options.height.map(Value::from)),
            ("help", options.help.map(Value::from)),
            ("disabled", options.disabled.then_some(Value::Bool(true))),
        ]);
        declare_text(
            self,
            WidgetKind::TextArea,
            params,
            options.key.as_deref(),
            options.value,
            options.max_chars,
            options.on_change,
        )
    }
}

fn declare_text(
    ui: &mut Ui<'_, '_>,
    kind: WidgetKind,
    params: Value,
    key: Option<&str>,
    value: Option<String>,
    max_chars: Option<usize>,
    on_change: Option<OnChange>,
) -> Result<String, WidgetError> {
    let widget = ValueWidget::new(kind, params, Value::String(String::new()))
        .key(key)
        .caller_value(value.map(Value::String))
        .codec(
            |value| match value {
                WidgetValue::String(text) => Some(Value::String(text.clone())),
                _ => None,
            },
            |value| WidgetValue::String(value.as_str().unwrap_or_default().to_owned()),
        )
        .on_change(on_change);

    let value = declare_value_widget(ui, widget, |value| {
        let Some(text) = value.as_str() else {
            return Err(WidgetError::invalid_value(
                kind,
                format!("expected a string, got {value}"),
            ));
        };
        match max_chars {
            Some(max) if text.chars().count() > max => Err(WidgetError::invalid_value(
                kind,
                format!("value is longer than max_chars ({max})"),
            )),
            _ => Ok(()),
        }
    })?;
    Ok(value.as_str().unwrap_or_default().to_owned())
}

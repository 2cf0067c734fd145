use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};

#[derive(Clone, Debug, Default)]
pub struct CheckboxOptions {
    pub key: Option<String>,
    pub value: Option<bool>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn checkbox(&mut self, label: &str) -> Result<bool, WidgetError> {
        self.checkbox_with(label, CheckboxOptions::default())
    }

    pub fn checkbox_with(
        &mut self,
        label: &str,
        options: CheckboxOptions,
    ) -> Result<bool, WidgetError> {
        let widget = ValueWidget::new(
            WidgetKind::Checkbox,
            params([
                ("label", Some(Value::from(label))),
                ("help", options.help.map(Value::from)),
                ("disabled", options.disabled.then_some(Value::Bool(true))),
            ]),
            Value::Bool(false),
        )
        .key(options.key.as_deref())
        .caller_value(options.value.map(Value::Bool))
        .codec(
            |value| match value {
                WidgetValue::Bool(checked) => Some(Value::Bool(*checked)),
                _ => None,
            },
            |value| WidgetValue::Bool(value.as_bool().unwrap_or(false)),
        )
        .on_change(options.on_change);

        let value = declare_value_widget(self, widget, |value| {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(WidgetError::invalid_value(
                    WidgetKind::Checkbox,
                    format!("expected a boolean, got {value}"),
                ))
            }
        })?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

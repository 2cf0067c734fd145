use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};

#[derive(Clone, Debug, Default)]
pub struct ColorPickerOptions {
    pub key: Option<String>,
    /// Hex color, `#RGB` or `#RRGGBB`. Black when unset.
    pub value: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn color_picker(&mut self, label: &str) -> Result<String, WidgetError> {
        self.color_picker_with(label, ColorPickerOptions::default())
    }

    pub fn color_picker_with(
        &mut self,
        label: &str,
        options: ColorPickerOptions,
    ) -> Result<String, WidgetError> {
        let kind = WidgetKind::ColorPicker;
        let widget = ValueWidget::new(
            kind,
            params([
                ("label", Some(Value::from(label))),
                ("help", options.help.map(Value::from)),
                ("disabled", options.disabled.then_some(Value::Bool(true))),
            ]),
            Value::from("#000000"),
        )
        .key(options.key.as_deref())
        .caller_value(options.value.map(Value::from))
        .codec(
            |value| match value {
                WidgetValue::String(color) => Some(Value::from(color.as_str())),
                _ => None,
            },
            |value| WidgetValue::String(value.as_str().unwrap_or("#000000").to_owned()),
        )
        .on_change(options.on_change);

        let value = declare_value_widget(self, widget, |value| match value.as_str() {
            Some(color) if is_hex_color(color) => Ok(()),
            _ => Err(WidgetError::invalid_value(
                kind,
                format!("{value} is not a valid hex color like #1e90ff or #fff"),
            )),
        })?;
        Ok(value.as_str().unwrap_or("#000000").to_owned())
    }
}

pub(crate) fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

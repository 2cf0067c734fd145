//! Widgets that pick from a fixed list of options.
//!
//! The client only ever sees option indices; the script sees the option
//! strings.

use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct SelectOptions {
    pub key: Option<String>,
    /// Index of the initially selected option.
    pub index: usize,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

#[derive(Clone, Debug, Default)]
pub struct MultiselectOptions {
    pub key: Option<String>,
    pub default: Option<Vec<String>>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

#[derive(Clone, Debug, Default)]
pub struct SelectSliderOptions {
    pub key: Option<String>,
    pub value: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

type Choices = Arc<[String]>;

fn choices<S: AsRef<str>>(options: &[S]) -> Choices {
    options.iter().map(|option| option.as_ref().to_owned()).collect()
}

fn position(choices: &[String], value: &Value) -> Option<usize> {
    let value = value.as_str()?;
    choices.iter().position(|choice| choice == value)
}

fn option_at(choices: &[String], index: i64) -> Option<Value> {
    let index = usize::try_from(index).ok()?;
    choices.get(index).map(|choice| Value::from(choice.as_str()))
}

impl<'a, 's> Ui<'a, 's> {
    pub fn selectbox<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
    ) -> Result<Option<String>, WidgetError> {
        self.selectbox_with(label, options, SelectOptions::default())
    }

    /// `None` when `options` is empty.
    pub fn selectbox_with<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        select: SelectOptions,
    ) -> Result<Option<String>, WidgetError> {
        declare_single_choice(self, WidgetKind::Selectbox, label, choices(options), select)
    }

    pub fn radio<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
    ) -> Result<Option<String>, WidgetError> {
        self.radio_with(label, options, SelectOptions::default())
    }

    pub fn radio_with<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        select: SelectOptions,
    ) -> Result<Option<String>, WidgetError> {
        declare_single_choice(self, WidgetKind::Radio, label, choices(options), select)
    }

    pub fn multiselect<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
    ) -> Result<Vec<String>, WidgetError> {
        self.multiselect_with(label, options, MultiselectOptions::default())
    }

    pub fn multiselect_with<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        select: MultiselectOptions,
    ) -> Result<Vec<String>, WidgetError> {
        let kind = WidgetKind::Multiselect;
        let choices = choices(options);
        let decode_choices = Arc::clone(&choices);
        let encode_choices = Arc::clone(&choices);
        let check_choices = Arc::clone(&choices);

        let widget = ValueWidget::new(
            kind,
            params([
                ("label", Some(Value::from(label))),
                ("options", Some(Value::from(choices.to_vec()))),
                ("help", select.help.map(Value::from)),
                ("disabled", select.disabled.then_some(Value::Bool(true))),
            ]),
            Value::Array(Vec::new()),
        )
        .key(select.key.as_deref())
        .caller_value(select.default.map(Value::from))
        .codec(
            move |value| match value {
                WidgetValue::IntArray(indices) => indices
                    .iter()
                    .map(|&index| option_at(&decode_choices, index))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array),
                _ => None,
            },
            move |value| {
                let indices = value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| position(&encode_choices, item))
                            .map(|index| index as i64)
                            .collect()
                    })
                    .unwrap_or_default();
                WidgetValue::IntArray(indices)
            },
        )
        .on_change(select.on_change);

        let value = declare_value_widget(self, widget, |value| {
            let Some(items) = value.as_array() else {
                return Err(WidgetError::invalid_value(
                    kind,
                    format!("expected a list of options, got {value}"),
                ));
            };
            match items.iter().find(|item| position(&check_choices, item).is_none()) {
                Some(missing) => Err(WidgetError::invalid_value(
                    kind,
                    format!("every multiselect default value must exist in options; {missing} doesn't"),
                )),
                None => Ok(()),
            }
        })?;
        Ok(value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn select_slider<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
    ) -> Result<String, WidgetError> {
        self.select_slider_with(label, options, SelectSliderOptions::default())
    }

    /// A slider over `options`. Fails when `options` is empty.
    pub fn select_slider_with<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        select: SelectSliderOptions,
    ) -> Result<String, WidgetError> {
        let kind = WidgetKind::SelectSlider;
        let choices = choices(options);
        let Some(first) = choices.first().cloned() else {
            return Err(WidgetError::invalid_value(
                kind,
                "the `options` argument needs to be non-empty",
            ));
        };
        let decode_choices = Arc::clone(&choices);
        let encode_choices = Arc::clone(&choices);
        let check_choices = Arc::clone(&choices);

        let widget = ValueWidget::new(
            kind,
            params([
                ("label", Some(Value::from(label))),
                ("options", Some(Value::from(choices.to_vec()))),
                ("min", Some(Value::from(0))),
                ("max", Some(Value::from(choices.len() - 1))),
                ("step", Some(Value::from(1))),
                ("help", select.help.map(Value::from)),
                ("disabled", select.disabled.then_some(Value::Bool(true))),
            ]),
            Value::from(first),
        )
        .key(select.key.as_deref())
        .caller_value(select.value.map(Value::from))
        .codec(
            move |value| match value {
                WidgetValue::IntArray(indices) => indices
                    .first()
                    .and_then(|&index| option_at(&decode_choices, index)),
                _ => None,
            },
            move |value| {
                let index = position(&encode_choices, value).unwrap_or(0);
                WidgetValue::IntArray(vec![index as i64])
            },
        )
        .on_change(select.on_change);

        let value = declare_value_widget(self, widget, |value| {
            if position(&check_choices, value).is_some() {
                Ok(())
            } else {
                Err(WidgetError::invalid_value(
                    kind,
                    format!("{value} is not one of the options"),
                ))
            }
        })?;
        Ok(value.as_str().unwrap_or_default().to_owned())
    }
}

fn declare_single_choice(
    ui: &mut Ui<'_, '_>,
    kind: WidgetKind,
    label: &str,
    choices: Choices,
    select: SelectOptions,
) -> Result<Option<String>, WidgetError> {
    if !choices.is_empty() && select.index >= choices.len() {
        return Err(WidgetError::invalid_value(
            kind,
            format!(
                "index {} must be between 0 and the number of options ({})",
                select.index,
                choices.len()
            ),
        ));
    }
    let caller_value = choices
        .get(select.index)
        .map(|choice| Value::from(choice.as_str()));
    let decode_choices = Arc::clone(&choices);
    let encode_choices = Arc::clone(&choices);
    let check_choices = Arc::clone(&choices);

    let widget = ValueWidget::new(
        kind,
        params([
            ("label", Some(Value::from(label))),
            ("options", Some(Value::from(choices.to_vec()))),
            ("help", select.help.map(Value::from)),
            ("disabled", select.disabled.then_some(Value::Bool(true))),
        ]),
        Value::Null,
    )
    .key(select.key.as_deref())
    .caller_value(caller_value)
    .codec(
        move |value| match value {
            WidgetValue::Int(index) => option_at(&decode_choices, *index),
            _ => None,
        },
        move |value| WidgetValue::Int(position(&encode_choices, value).unwrap_or(0) as i64),
    )
    .on_change(select.on_change);

    let value = declare_value_widget(ui, widget, |value| {
        if value.is_null() && check_choices.is_empty() {
            return Ok(());
        }
        if position(&check_choices, value).is_some() {
            Ok(())
        } else {
            Err(WidgetError::invalid_value(
                kind,
                format!("{value} is not one of the options"),
            ))
        }
    })?;
    Ok(value.as_str().map(str::to_owned))
}

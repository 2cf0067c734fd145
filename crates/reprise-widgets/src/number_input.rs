//! Numeric input, for integers and floats.

use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};
use std::cmp::Ordering;
use std::fmt;

/// Largest integer the client can represent exactly.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

/// A number a [`Ui::number_input_with`] can hold.
pub trait NumberValue: Copy + PartialOrd + fmt::Display + Send + Sync + 'static {
    const DATA_TYPE: &'static str;
    const DEFAULT_FORMAT: &'static str;
    const DEFAULT_STEP: Self;
    const ZERO: Self;

    fn to_json(self) -> Value;
    fn from_json(value: &Value) -> Option<Self>;
    fn to_wire(self) -> WidgetValue;
    fn from_wire(value: &WidgetValue) -> Option<Self>;
    /// Whether the client can hold this number without losing it.
    fn is_representable(self) -> bool;
}

impl NumberValue for i64 {
    const DATA_TYPE: &'static str = "int";
    const DEFAULT_FORMAT: &'static str = "%d";
    const DEFAULT_STEP: Self = 1;
    const ZERO: Self = 0;

    fn to_json(self) -> Value {
        Value::from(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn to_wire(self) -> WidgetValue {
        WidgetValue::Int(self)
    }

    fn from_wire(value: &WidgetValue) -> Option<Self> {
        match value {
            WidgetValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn is_representable(self) -> bool {
        (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&self)
    }
}

impl NumberValue for f64 {
    const DATA_TYPE: &'static str = "float";
    const DEFAULT_FORMAT: &'static str = "%0.2f";
    const DEFAULT_STEP: Self = 0.01;
    const ZERO: Self = 0.0;

    fn to_json(self) -> Value {
        Value::from(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_wire(self) -> WidgetValue {
        WidgetValue::Double(self)
    }

    fn from_wire(value: &WidgetValue) -> Option<Self> {
        match value {
            WidgetValue::Double(v) => Some(*v),
            WidgetValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn is_representable(self) -> bool {
        self.is_finite()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NumberInputOptions<N> {
    pub key: Option<String>,
    pub value: Option<N>,
    pub min_value: Option<N>,
    pub max_value: Option<N>,
    pub step: Option<N>,
    /// printf-style display format.
    pub format: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn number_input(&mut self, label: &str) -> Result<f64, WidgetError> {
        self.number_input_with(label, NumberInputOptions::default())
    }

    pub fn int_input(&mut self, label: &str) -> Result<i64, WidgetError> {
        self.number_input_with(label, NumberInputOptions::default())
    }

    pub fn number_input_with<N: NumberValue>(
        &mut self,
        label: &str,
        options: NumberInputOptions<N>,
    ) -> Result<N, WidgetError> {
        let invalid = |message: String| WidgetError::invalid_value(WidgetKind::NumberInput, message);
        let min = options.min_value;
        let max = options.max_value;
        let step = options.step.unwrap_or(N::DEFAULT_STEP);

        for (name, bound) in [("min_value", min), ("max_value", max), ("step", Some(step))] {
            if let Some(bound) = bound {
                if !bound.is_representable() {
                    return Err(invalid(format!("`{name}` ({bound}) is out of range")));
                }
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(invalid(format!(
                    "`min_value` ({min}) must not exceed `max_value` ({max})"
                )));
            }
        }
        if step.partial_cmp(&N::ZERO) != Some(Ordering::Greater) {
            return Err(invalid(format!("`step` ({step}) must be positive")));
        }

        let format = options
            .format
            .unwrap_or_else(|| N::DEFAULT_FORMAT.to_owned());
        let widget = ValueWidget::new(
            WidgetKind::NumberInput,
            params([
                ("label", Some(Value::from(label))),
                ("data_type", Some(Value::from(N::DATA_TYPE))),
                ("min", min.map(N::to_json)),
                ("max", max.map(N::to_json)),
                ("step", Some(step.to_json())),
                ("format", Some(Value::from(format))),
                ("help", options.help.map(Value::from)),
                ("disabled", options.disabled.then_some(Value::Bool(true))),
            ]),
            min.unwrap_or(N::ZERO).to_json(),
        )
        .key(options.key.as_deref())
        .caller_value(options.value.map(N::to_json))
        .codec(
            |value| N::from_wire(value).map(N::to_json),
            |value| N::from_json(value).unwrap_or(N::ZERO).to_wire(),
        )
        .on_change(options.on_change);

        let value = declare_value_widget(self, widget, |value| {
            let Some(number) = N::from_json(value) else {
                return Err(invalid(format!("expected {} number, got {value}", N::DATA_TYPE)));
            };
            if !number.is_representable() {
                return Err(invalid(format!("value ({number}) is out of range")));
            }
            let below = min.is_some_and(|min| number < min);
            let above = max.is_some_and(|max| number > max);
            if below || above {
                return Err(invalid(format!(
                    "the value {number} must lie between the `min_value` of {} and the \
                     `max_value` of {}, inclusively",
                    display_bound(min),
                    display_bound(max)
                )));
            }
            Ok(())
        })?;
        N::from_json(&value).ok_or_else(|| invalid(format!("expected a number, got {value}")))
    }
}

fn display_bound<N: fmt::Display>(bound: Option<N>) -> String {
    bound.map_or_else(|| "None".to_owned(), |bound| bound.to_string())
}

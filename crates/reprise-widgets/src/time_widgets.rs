//! Date and time pickers.
//!
//! Application values are ISO strings (`2024-05-17`, `13:45`) so they
//! survive a round trip through session state. The client speaks
//! `2024/05/17` for dates.

use crate::ui::{OnChange, Ui};
use crate::value_widget::{declare_value_widget, params, ValueWidget};
use chrono::{Local, Months, NaiveDate, NaiveTime, Timelike};
use reprise_core::{Value, WidgetError, WidgetKind, WidgetValue};

const ISO_DATE: &str = "%Y-%m-%d";
const WIRE_DATE: &str = "%Y/%m/%d";
const TIME: &str = "%H:%M";

/// Distance of the default bounds from the initial date.
const DEFAULT_BOUND_MONTHS: u32 = 120;

#[derive(Clone, Debug, Default)]
pub struct DateInputOptions {
    pub key: Option<String>,
    /// Today when unset.
    pub value: Option<NaiveDate>,
    /// Ten years before the initial date when unset.
    pub min_value: Option<NaiveDate>,
    /// Ten years after the initial date when unset.
    pub max_value: Option<NaiveDate>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

#[derive(Clone, Debug, Default)]
pub struct TimeInputOptions {
    pub key: Option<String>,
    /// The current time, to the minute, when unset.
    pub value: Option<NaiveTime>,
    pub help: Option<String>,
    pub disabled: bool,
    pub on_change: Option<OnChange>,
}

fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, format).ok()
}

fn iso_date(date: NaiveDate) -> Value {
    Value::from(date.format(ISO_DATE).to_string())
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or(time)
}

impl<'a, 's> Ui<'a, 's> {
    pub fn date_input(&mut self, label: &str) -> Result<NaiveDate, WidgetError> {
        self.date_input_with(label, DateInputOptions::default())
    }

    pub fn date_input_with(
        &mut self,
        label: &str,
        options: DateInputOptions,
    ) -> Result<NaiveDate, WidgetError> {
        let kind = WidgetKind::DateInput;
        let initial = options.value.unwrap_or_else(|| Local::now().date_naive());
        let span = Months::new(DEFAULT_BOUND_MONTHS);
        let min = options
            .min_value
            .unwrap_or_else(|| initial.checked_sub_months(span).unwrap_or(NaiveDate::MIN));
        let max = options
            .max_value
            .unwrap_or_else(|| initial.checked_add_months(span).unwrap_or(NaiveDate::MAX));
        if min > max {
            return Err(WidgetError::invalid_value(
                kind,
                format!("`min_value` ({min}) must not exceed `max_value` ({max})"),
            ));
        }

        let widget = ValueWidget::new(
            kind,
            params([
                ("label", Some(Value::from(label))),
                ("min", Some(Value::from(min.format(WIRE_DATE).to_string()))),
                ("max", Some(Value::from(max.format(WIRE_DATE).to_string()))),
                ("help", options.help.map(Value::from)),
                ("disabled", options.disabled.then_some(Value::Bool(true))),
            ]),
            iso_date(initial),
        )
        .key(options.key.as_deref())
        .caller_value(options.value.map(iso_date))
        .codec(
            |value| match value {
                WidgetValue::StringArray(dates) => dates
                    .first()
                    .and_then(|date| parse_date(date, WIRE_DATE))
                    .map(iso_date),
                _ => None,
            },
            |value| {
                let dates = value
                    .as_str()
                    .and_then(|date| parse_date(date, ISO_DATE))
                    .map(|date| vec![date.format(WIRE_DATE).to_string()])
                    .unwrap_or_default();
                WidgetValue::StringArray(dates)
            },
        )
        .on_change(options.on_change);

        let value = declare_value_widget(self, widget, |value| {
            let Some(date) = value.as_str().and_then(|date| parse_date(date, ISO_DATE)) else {
                return Err(WidgetError::invalid_value(
                    kind,
                    format!("expected a date like 2024-05-17, got {value}"),
                ));
            };
            if date < min || date > max {
                return Err(WidgetError::invalid_value(
                    kind,
                    format!("{date} must lie between {min} and {max}"),
                ));
            }
            Ok(())
        })?;
        value
            .as_str()
            .and_then(|date| parse_date(date, ISO_DATE))
            .ok_or_else(|| WidgetError::invalid_value(kind, format!("expected a date, got {value}")))
    }

    pub fn time_input(&mut self, label: &str) -> Result<NaiveTime, WidgetError> {
        self.time_input_with(label, TimeInputOptions::default())
    }

    pub fn time_input_with(
        &mut self,
        label: &str,
        options: TimeInputOptions,
    ) -> Result<NaiveTime, WidgetError> {
        let kind = WidgetKind::TimeInput;
        let as_value = |time: NaiveTime| Value::from(time.format(TIME).to_string());
        let initial = options
            .value
            .unwrap_or_else(|| truncate_to_minute(Local::now().time()));

        let widget = ValueWidget::new(
            kind,
            params([
                ("label", Some(Value::from(label))),
                ("help", options.help.map(Value::from)),
                ("disabled", options.disabled.then_some(Value::Bool(true))),
            ]),
            as_value(initial),
        )
        .key(options.key.as_deref())
        .caller_value(options.value.map(as_value))
        .codec(
            |value| match value {
                WidgetValue::String(time) => NaiveTime::parse_from_str(time, TIME)
                    .ok()
                    .map(|time| Value::from(time.format(TIME).to_string())),
                _ => None,
            },
            |value| WidgetValue::String(value.as_str().unwrap_or_default().to_owned()),
        )
        .on_change(options.on_change);

        let parse = |value: &Value| {
            value
                .as_str()
                .and_then(|time| NaiveTime::parse_from_str(time, TIME).ok())
        };
        let value = declare_value_widget(self, widget, |value| match parse(value) {
            Some(_) => Ok(()),
            None => Err(WidgetError::invalid_value(
                kind,
                format!("expected a time like 13:45, got {value}"),
            )),
        })?;
        parse(&value)
            .ok_or_else(|| WidgetError::invalid_value(kind, format!("expected a time, got {value}")))
    }
}

//! Widget declaration functions for Reprise scripts.
//!
//! Every widget is a method on [`Ui`]. A widget returns the value the script
//! should act on in this run, which is the client's value when the user has
//! touched it and the declared default otherwise.

mod button;
mod checkbox;
mod color_picker;
mod number_input;
mod selection;
mod text_widgets;
mod time_widgets;
mod ui;
mod value_widget;

pub use button::ButtonOptions;
pub use checkbox::CheckboxOptions;
pub use color_picker::ColorPickerOptions;
pub use number_input::{NumberInputOptions, NumberValue, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
pub use selection::{MultiselectOptions, SelectOptions, SelectSliderOptions};
pub use text_widgets::{TextAreaOptions, TextInputOptions, TextInputType};
pub use time_widgets::{DateInputOptions, TimeInputOptions};
pub use ui::{OnChange, Ui};

pub use chrono::{NaiveDate, NaiveTime};

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod widget_tests;

#[cfg(test)]
#[path = "tests/form_widget_tests.rs"]
mod form_widget_tests;

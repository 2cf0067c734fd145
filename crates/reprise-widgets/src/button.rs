//! Buttons and form submit buttons.
//!
//! A button's record is a trigger: it reads `true` for exactly the run the
//! click caused and `false` otherwise. Buttons don't take part in value
//! precedence and never write session state.

use crate::ui::{OnChange, Ui};
use crate::value_widget::{params, with_form_id};
use reprise_core::{
    callback_from, deserializer_from, register_widget, FormUsageError, Value, WidgetDeclaration,
    WidgetError, WidgetKind, WidgetRegistration, WidgetValue,
};

#[derive(Clone, Debug, Default)]
pub struct ButtonOptions {
    pub key: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    /// Called before the run the click causes.
    pub on_click: Option<OnChange>,
}

impl<'a, 's> Ui<'a, 's> {
    pub fn button(&mut self, label: &str) -> Result<bool, WidgetError> {
        self.button_with(label, ButtonOptions::default())
    }

    pub fn button_with(&mut self, label: &str, options: ButtonOptions) -> Result<bool, WidgetError> {
        declare_button(self, label, options, false)
    }

    /// The button that submits the enclosing form. When it fires, the values
    /// buffered by the form's widgets declared so far are committed to
    /// session state.
    pub fn form_submit_button(&mut self, label: &str) -> Result<bool, WidgetError> {
        self.form_submit_button_with(label, ButtonOptions::default())
    }

    pub fn form_submit_button_with(
        &mut self,
        label: &str,
        options: ButtonOptions,
    ) -> Result<bool, WidgetError> {
        declare_button(self, label, options, true)
    }
}

fn declare_button(
    ui: &mut Ui<'_, '_>,
    label: &str,
    options: ButtonOptions,
    is_form_submitter: bool,
) -> Result<bool, WidgetError> {
    if !ui.is_detached() {
        match (ui.is_in_form(), is_form_submitter) {
            (true, false) => return Err(FormUsageError::ButtonInForm.into()),
            (false, true) => return Err(FormUsageError::SubmitOutsideForm.into()),
            _ => {}
        }
    }

    let form_id = ui.current_form_id().to_owned();
    let mut params = params([
        ("label", Some(Value::from(label))),
        ("help", options.help.map(Value::from)),
        ("disabled", options.disabled.then_some(Value::Bool(true))),
        ("is_form_submitter", Some(Value::Bool(is_form_submitter))),
    ]);
    with_form_id(&mut params, &form_id);

    let func_name = if is_form_submitter {
        "form_submit_button"
    } else {
        "button"
    };
    let registration =
        WidgetRegistration::new(WidgetKind::Button, params.clone(), options.key.as_deref())
            .with_func_name(func_name)
            .with_deserializer(deserializer_from(|value| {
                Value::Bool(matches!(value, Some(WidgetValue::Trigger(true))))
            }));

    let registration = match options.on_click {
        Some(OnChange { callback, args }) => {
            let watched = registration.id().clone();
            // Releasing the button is a change too; only the press counts.
            let on_press = callback_from(move |state, args| {
                if state.widget_value(watched.as_str()) == Some(Value::Bool(true)) {
                    callback(state, args)
                } else {
                    Ok(())
                }
            });
            registration.with_callback(Some(on_press), args)
        }
        None => registration,
    };

    let registered = register_widget(ui.ctx(), registration)?;
    let clicked = registered.value.as_bool().unwrap_or(false);

    if let Some(ctx) = ui.ctx() {
        if is_form_submitter && clicked {
            ctx.commit_form(&form_id);
        }
        ctx.emit(
            WidgetDeclaration::new(WidgetKind::Button, registered.id, form_id, params)
                .with_default(WidgetValue::Trigger(false)),
        );
    }
    Ok(clicked)
}

use crate::color_picker::is_hex_color;
use crate::*;
use reprise_core::{
    FormUsageError, ScriptRunContext, Session, WidgetError, WidgetKind, WidgetStates, WidgetValue,
};
use serde_json::json;

fn keyed(key: &str) -> Option<String> {
    Some(key.to_owned())
}

fn agree(ctx: &mut ScriptRunContext<'_>) -> Result<bool, WidgetError> {
    Ui::new(ctx).checkbox_with(
        "Agree",
        CheckboxOptions {
            key: keyed("agree"),
            ..Default::default()
        },
    )
}

#[test]
fn detached_ui_returns_declared_defaults() {
    let mut ui = Ui::detached();
    assert!(ui.is_detached());
    assert!(!ui.checkbox("Agree").unwrap());
    assert!(!ui.button("Go").unwrap());
    let name = ui
        .text_input_with(
            "Name",
            TextInputOptions {
                value: Some("Ann".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(name, "Ann");
    assert_eq!(ui.selectbox("Size", &["S", "M"]).unwrap().as_deref(), Some("S"));
    assert!(ui.session_state().is_none());

    // Form misuse is only detected with a run behind the handle.
    let saved = ui.form("f", |ui| ui.form_submit_button("Save")).unwrap();
    assert!(!saved);
}

#[test]
fn client_value_reaches_the_script_and_session_state() {
    let mut session = Session::new();
    let (checked, output) = session.run(agree).unwrap();
    assert!(!checked);
    let declaration = output.declaration("agree").unwrap();
    assert_eq!(declaration.default, Some(WidgetValue::Bool(false)));
    assert!(!declaration.value_set);

    session.enqueue_client_update(WidgetStates::new().with("agree", WidgetValue::Bool(true)));
    let (checked, _) = session.run(agree).unwrap();
    assert!(checked);
    assert_eq!(session.session_state().get("agree"), Some(json!(true)));
}

fn agree_text(ctx: &mut ScriptRunContext<'_>) -> Result<String, WidgetError> {
    Ui::new(ctx).text_input_with(
        "Agree",
        TextInputOptions {
            key: keyed("agree"),
            ..Default::default()
        },
    )
}

#[test]
fn key_reused_by_another_widget_kind_starts_from_its_default() {
    let mut session = Session::new();
    let batch = WidgetStates::new().with("agree", WidgetValue::Bool(true));
    session.enqueue_client_update(batch.clone());
    assert!(session.run(agree).unwrap().0);

    session.enqueue_client_update(batch);
    let (typed, output) = session.run(agree_text).unwrap();
    assert_eq!(typed, "");
    let declaration = output.declaration("agree").unwrap();
    assert!(declaration.value_set);
    assert_eq!(declaration.value, Some(WidgetValue::String(String::new())));

    session.enqueue_client_update(WidgetStates::new().with("agree", WidgetValue::String("yes".into())));
    let (typed, _) = session.run(agree_text).unwrap();
    assert_eq!(typed, "yes");
}

#[test]
fn session_state_write_before_declaration_overrides_the_widget() {
    let mut session = Session::new();
    let (checked, output) = session
        .run(|ctx| {
            ctx.session_state().set("agree", json!(true))?;
            agree(ctx)
        })
        .unwrap();
    assert!(checked);
    let declaration = output.declaration("agree").unwrap();
    assert!(declaration.value_set);
    assert_eq!(declaration.value, Some(WidgetValue::Bool(true)));
    assert!(output.warnings.is_empty());
}

#[test]
fn caller_value_together_with_state_write_warns() {
    let mut session = Session::new();
    let (checked, output) = session
        .run(|ctx| {
            ctx.session_state().set("agree", json!(true))?;
            Ui::new(ctx).checkbox_with(
                "Agree",
                CheckboxOptions {
                    key: keyed("agree"),
                    value: Some(false),
                    ..Default::default()
                },
            )
        })
        .unwrap();
    assert!(checked);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].widget_id.as_str(), "agree");
}

#[test]
fn writing_a_declared_widget_key_fails() {
    let mut session = Session::new();
    let result = session.run(|ctx| {
        agree(ctx)?;
        ctx.session_state().set("agree", json!(false))
    });
    assert!(matches!(
        result,
        Err(WidgetError::StateWriteConflict { key }) if key == "agree"
    ));
}

#[test]
fn identical_unkeyed_widgets_collide() {
    let mut session = Session::new();
    let result = session.run(|ctx| {
        let mut ui = Ui::new(ctx);
        ui.checkbox("Agree")?;
        ui.checkbox("Agree")
    });
    match result {
        Err(WidgetError::DuplicateWidgetId {
            func_name,
            user_key: None,
            ..
        }) => assert_eq!(func_name, "checkbox"),
        other => panic!("expected a duplicate id error, got {other:?}"),
    }
}

fn counter(ctx: &mut ScriptRunContext<'_>) -> Result<(bool, i64), WidgetError> {
    let add = OnChange::new(|state, args| {
        let count = state.get_as::<i64>("count").unwrap_or(0);
        state.set("count", json!(count + args[0].as_i64().unwrap_or(0)))
    })
    .with_args([json!(2)]);
    let clicked = Ui::new(ctx).button_with(
        "Add",
        ButtonOptions {
            key: keyed("add"),
            on_click: Some(add),
            ..Default::default()
        },
    )?;
    let count = ctx.session_state().get_as::<i64>("count").unwrap_or(0);
    Ok((clicked, count))
}

#[test]
fn button_click_fires_once_and_reads_true_for_one_run() {
    let mut session = Session::new();
    let (first, output) = session.run(counter).unwrap();
    assert_eq!(first, (false, 0));
    assert_eq!(
        output.declaration("add").unwrap().default,
        Some(WidgetValue::Trigger(false))
    );

    session.enqueue_client_update(WidgetStates::new().with("add", WidgetValue::Trigger(true)));
    let (clicked, _) = session.run(counter).unwrap();
    assert_eq!(clicked, (true, 2));

    let (after, _) = session.run(counter).unwrap();
    assert_eq!(after, (false, 2));
}

#[test]
fn buttons_respect_form_boundaries() {
    let mut session = Session::new();
    let outside = session.run(|ctx| Ui::new(ctx).form_submit_button("Save"));
    assert!(matches!(
        outside,
        Err(WidgetError::Form(FormUsageError::SubmitOutsideForm))
    ));

    let inside = session.run(|ctx| Ui::new(ctx).form("f", |ui| ui.button("Go")));
    assert!(matches!(
        inside,
        Err(WidgetError::Form(FormUsageError::ButtonInForm))
    ));
}

fn size(ctx: &mut ScriptRunContext<'_>) -> Result<Option<String>, WidgetError> {
    Ui::new(ctx).selectbox_with(
        "Size",
        &["S", "M", "L"],
        SelectOptions {
            key: keyed("size"),
            index: 1,
            ..Default::default()
        },
    )
}

#[test]
fn selectbox_speaks_indices_to_the_client() {
    let mut session = Session::new();
    let (picked, output) = session.run(size).unwrap();
    assert_eq!(picked.as_deref(), Some("M"));
    let declaration = output.declaration("size").unwrap();
    assert_eq!(declaration.default, Some(WidgetValue::Int(1)));
    assert_eq!(declaration.params["options"], json!(["S", "M", "L"]));

    session.enqueue_client_update(WidgetStates::new().with("size", WidgetValue::Int(2)));
    let (picked, _) = session.run(size).unwrap();
    assert_eq!(picked.as_deref(), Some("L"));
    assert_eq!(session.session_state().get("size"), Some(json!("L")));
}

#[test]
fn selectbox_edge_cases() {
    let mut session = Session::new();
    let (empty, _) = session
        .run(|ctx| Ui::new(ctx).radio("Nothing", &[] as &[&str]))
        .unwrap();
    assert_eq!(empty, None);

    let out_of_range = session.run(|ctx| {
        Ui::new(ctx).selectbox_with(
            "Size",
            &["S"],
            SelectOptions {
                index: 1,
                ..Default::default()
            },
        )
    });
    assert!(matches!(
        out_of_range,
        Err(WidgetError::InvalidValue { kind: WidgetKind::Selectbox, .. })
    ));
}

fn tags(ctx: &mut ScriptRunContext<'_>) -> Result<Vec<String>, WidgetError> {
    Ui::new(ctx).multiselect_with(
        "Tags",
        &["a", "b", "c"],
        MultiselectOptions {
            key: keyed("tags"),
            default: Some(vec!["b".into()]),
            ..Default::default()
        },
    )
}

#[test]
fn multiselect_round_trips_through_indices() {
    let mut session = Session::new();
    let (picked, output) = session.run(tags).unwrap();
    assert_eq!(picked, vec!["b".to_owned()]);
    assert_eq!(
        output.declaration("tags").unwrap().default,
        Some(WidgetValue::IntArray(vec![1]))
    );

    session.enqueue_client_update(
        WidgetStates::new().with("tags", WidgetValue::IntArray(vec![0, 2])),
    );
    let (picked, _) = session.run(tags).unwrap();
    assert_eq!(picked, vec!["a".to_owned(), "c".to_owned()]);
}

#[test]
fn multiselect_default_must_be_an_option() {
    let mut ui = Ui::detached();
    let result = ui.multiselect_with(
        "Tags",
        &["a", "b"],
        MultiselectOptions {
            default: Some(vec!["z".into()]),
            ..Default::default()
        },
    );
    assert!(matches!(
        result,
        Err(WidgetError::InvalidValue { kind: WidgetKind::Multiselect, .. })
    ));
}

fn level(ctx: &mut ScriptRunContext<'_>) -> Result<String, WidgetError> {
    Ui::new(ctx).select_slider_with(
        "Level",
        &["low", "mid", "high"],
        SelectSliderOptions {
            key: keyed("level"),
            ..Default::default()
        },
    )
}

#[test]
fn select_slider_defaults_to_the_first_option() {
    let mut ui = Ui::detached();
    assert_eq!(ui.select_slider("Level", &["low", "high"]).unwrap(), "low");
    assert!(ui.select_slider("Level", &[] as &[&str]).is_err());

    let mut session = Session::new();
    let (_, output) = session.run(level).unwrap();
    assert_eq!(
        output.declaration("level").unwrap().default,
        Some(WidgetValue::IntArray(vec![0]))
    );
    session.enqueue_client_update(WidgetStates::new().with("level", WidgetValue::IntArray(vec![2])));
    let (picked, _) = session.run(level).unwrap();
    assert_eq!(picked, "high");
}

#[test]
fn number_input_checks_its_bounds() {
    let mut ui = Ui::detached();
    assert_eq!(ui.int_input("Count").unwrap(), 0);
    assert_eq!(ui.number_input("Ratio").unwrap(), 0.0);

    let inverted = ui.number_input_with(
        "Count",
        NumberInputOptions::<i64> {
            min_value: Some(5),
            max_value: Some(1),
            ..Default::default()
        },
    );
    assert!(inverted.is_err());

    let outside = ui.number_input_with(
        "Count",
        NumberInputOptions::<i64> {
            value: Some(11),
            max_value: Some(10),
            ..Default::default()
        },
    );
    assert!(matches!(
        outside,
        Err(WidgetError::InvalidValue { kind: WidgetKind::NumberInput, .. })
    ));

    let unsafe_bound = ui.number_input_with(
        "Count",
        NumberInputOptions::<i64> {
            max_value: Some(MAX_SAFE_INTEGER + 1),
            ..Default::default()
        },
    );
    assert!(unsafe_bound.is_err());

    let zero_step = ui.number_input_with(
        "Ratio",
        NumberInputOptions::<f64> {
            step: Some(0.0),
            ..Default::default()
        },
    );
    assert!(zero_step.is_err());
}

fn ratio(ctx: &mut ScriptRunContext<'_>) -> Result<f64, WidgetError> {
    Ui::new(ctx).number_input_with(
        "Ratio",
        NumberInputOptions {
            key: keyed("ratio"),
            value: Some(1.0),
            min_value: Some(0.0),
            max_value: Some(10.0),
            ..Default::default()
        },
    )
}

#[test]
fn number_input_reads_the_client_value() {
    let mut session = Session::new();
    let (value, output) = session.run(ratio).unwrap();
    assert_eq!(value, 1.0);
    let declaration = output.declaration("ratio").unwrap();
    assert_eq!(declaration.default, Some(WidgetValue::Double(1.0)));
    assert_eq!(declaration.params["data_type"], json!("float"));

    session.enqueue_client_update(WidgetStates::new().with("ratio", WidgetValue::Double(2.5)));
    let (value, _) = session.run(ratio).unwrap();
    assert_eq!(value, 2.5);

    session.enqueue_client_update(WidgetStates::new().with("ratio", WidgetValue::Double(20.0)));
    assert!(session.run(ratio).is_err());
}

#[test]
fn text_input_enforces_max_chars() {
    let mut ui = Ui::detached();
    let long = ui.text_input_with(
        "Code",
        TextInputOptions {
            value: Some("abcd".into()),
            max_chars: Some(3),
            ..Default::default()
        },
    );
    assert!(matches!(
        long,
        Err(WidgetError::InvalidValue { kind: WidgetKind::TextInput, .. })
    ));
    assert_eq!(ui.text_area("Notes").unwrap(), "");
}

#[test]
fn password_type_is_part_of_the_declaration() {
    let mut session = Session::new();
    let (_, output) = session
        .run(|ctx| {
            Ui::new(ctx).text_input_with(
                "Secret",
                TextInputOptions {
                    input_type: TextInputType::Password,
                    ..Default::default()
                },
            )
        })
        .unwrap();
    let declaration = output.find(WidgetKind::TextInput, "Secret").unwrap();
    assert_eq!(declaration.params["type"], json!("password"));
}

#[test]
fn hex_colors() {
    assert!(is_hex_color("#000000"));
    assert!(is_hex_color("#1E90ff"));
    assert!(is_hex_color("#fff"));
    assert!(!is_hex_color("fff"));
    assert!(!is_hex_color("#ffff"));
    assert!(!is_hex_color("#ggg"));

    let mut ui = Ui::detached();
    assert_eq!(ui.color_picker("Fill").unwrap(), "#000000");
    let named = ui.color_picker_with(
        "Fill",
        ColorPickerOptions {
            value: Some("red".into()),
            ..Default::default()
        },
    );
    assert!(named.is_err());
}

fn day(ctx: &mut ScriptRunContext<'_>) -> Result<NaiveDate, WidgetError> {
    Ui::new(ctx).date_input_with(
        "Day",
        DateInputOptions {
            key: keyed("day"),
            value: NaiveDate::from_ymd_opt(2024, 5, 17),
            ..Default::default()
        },
    )
}

#[test]
fn date_input_uses_slashed_dates_on_the_wire() {
    let mut session = Session::new();
    let (date, output) = session.run(day).unwrap();
    assert_eq!(Some(date), NaiveDate::from_ymd_opt(2024, 5, 17));
    let declaration = output.declaration("day").unwrap();
    assert_eq!(
        declaration.default,
        Some(WidgetValue::StringArray(vec!["2024/05/17".into()]))
    );
    assert_eq!(declaration.params["min"], json!("2014/05/17"));
    assert_eq!(declaration.params["max"], json!("2034/05/17"));
    assert_eq!(session.session_state().get("day"), Some(json!("2024-05-17")));

    session.enqueue_client_update(
        WidgetStates::new().with("day", WidgetValue::StringArray(vec!["2024/06/01".into()])),
    );
    let (date, _) = session.run(day).unwrap();
    assert_eq!(Some(date), NaiveDate::from_ymd_opt(2024, 6, 1));
}

#[test]
fn date_outside_bounds_fails() {
    let mut ui = Ui::detached();
    let late = ui.date_input_with(
        "Day",
        DateInputOptions {
            value: NaiveDate::from_ymd_opt(2024, 5, 17),
            max_value: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        },
    );
    assert!(matches!(
        late,
        Err(WidgetError::InvalidValue { kind: WidgetKind::DateInput, .. })
    ));
}

fn alarm(ctx: &mut ScriptRunContext<'_>) -> Result<NaiveTime, WidgetError> {
    Ui::new(ctx).time_input_with(
        "Alarm",
        TimeInputOptions {
            key: keyed("alarm"),
            value: NaiveTime::from_hms_opt(13, 45, 0),
            ..Default::default()
        },
    )
}

#[test]
fn time_input_works_in_minutes() {
    let mut session = Session::new();
    let (time, output) = session.run(alarm).unwrap();
    assert_eq!(Some(time), NaiveTime::from_hms_opt(13, 45, 0));
    assert_eq!(
        output.declaration("alarm").unwrap().default,
        Some(WidgetValue::String("13:45".into()))
    );

    session.enqueue_client_update(
        WidgetStates::new().with("alarm", WidgetValue::String("08:30".into())),
    );
    let (time, _) = session.run(alarm).unwrap();
    assert_eq!(Some(time), NaiveTime::from_hms_opt(8, 30, 0));
}

use reprise_core::{ScriptRunContext, Value, WidgetError, WidgetKind, WidgetValue};
use reprise_testing::ScriptTestRule;
use reprise_widgets::{ButtonOptions, OnChange, SelectOptions, TextInputOptions, Ui};

#[derive(Debug)]
struct Screen {
    count: i64,
    step: String,
    greeting: Option<String>,
}

fn add(state: &mut reprise_core::SessionStateProxy<'_>, args: &[Value]) -> Result<(), WidgetError> {
    let step = state.get_as::<String>("step").unwrap_or_else(|| "1".to_owned());
    let step: i64 = step.parse().unwrap_or(1);
    let sign = args.first().and_then(Value::as_i64).unwrap_or(1);
    let count = state.get_as::<i64>("count").unwrap_or(0);
    state.set("count", Value::from(count + sign * step))
}

fn app(ctx: &mut ScriptRunContext<'_>) -> Result<Screen, WidgetError> {
    ctx.session_state().init_value("count", Value::from(0))?;

    let mut ui = Ui::new(ctx);
    let step = ui
        .selectbox_with(
            "Step",
            &["1", "5", "10"],
            SelectOptions {
                key: Some("step".into()),
                ..Default::default()
            },
        )?
        .unwrap_or_default();
    ui.button_with(
        "Increment",
        ButtonOptions {
            on_click: Some(OnChange::new(add).with_args([Value::from(1)])),
            ..Default::default()
        },
    )?;
    ui.button_with(
        "Decrement",
        ButtonOptions {
            on_click: Some(OnChange::new(add).with_args([Value::from(-1)])),
            ..Default::default()
        },
    )?;
    let (name, joined) = ui.form("signup", |ui| {
        let name = ui.text_input_with(
            "Name",
            TextInputOptions {
                key: Some("name".into()),
                ..Default::default()
            },
        )?;
        let joined = ui.form_submit_button("Join")?;
        Ok((name, joined))
    })?;

    let count = ctx.session_state().get_as::<i64>("count").unwrap_or(0);
    Ok(Screen {
        count,
        step,
        greeting: joined.then(|| format!("Welcome, {name}!")),
    })
}

fn show(rule: &ScriptTestRule<Screen>, action: &str) {
    if let Some(screen) = rule.value() {
        log::info!("{action}: {screen:?}");
    }
    if let Some(output) = rule.output() {
        for warning in &output.warnings {
            log::warn!("{}: {}", warning.widget_id, warning.message);
        }
    }
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut rule = ScriptTestRule::new();
    rule.set_script(app)?;
    show(&rule, "initial run");

    rule.click_button("Increment")?;
    show(&rule, "increment");

    let step = rule.id_of(WidgetKind::Selectbox, "Step")?;
    rule.set_value(&step, WidgetValue::Int(2))?;
    show(&rule, "step set to 10");

    rule.click_button("Increment")?;
    rule.click_button("Decrement")?;
    show(&rule, "increment then decrement");

    rule.set_value("name", WidgetValue::String("Ada".into()))?;
    show(&rule, "typed a name (held by the form)");
    rule.submit_form("signup")?;
    show(&rule, "submitted");

    println!("session state: {:?}", rule.session_state());
    Ok(())
}

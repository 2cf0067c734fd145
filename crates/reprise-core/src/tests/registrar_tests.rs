use super::*;
use crate::record::WidgetStates;
use crate::session::Session;
use crate::store::deserializer_from;
use serde_json::json;

fn checkbox(key: Option<&str>) -> WidgetRegistration {
    WidgetRegistration::new(WidgetKind::Checkbox, json!({"label": "Agree"}), key).with_deserializer(
        deserializer_from(|value| match value {
            Some(WidgetValue::Bool(flag)) => json!(flag),
            _ => json!(false),
        }),
    )
}

#[test]
fn without_context_returns_deserialized_unset() {
    for payload in [json!(null), json!({"label": "x"}), json!([1, 2, 3])] {
        let registration = WidgetRegistration::new(WidgetKind::TextInput, payload, None)
            .with_deserializer(deserializer_from(|value| {
                value.map(WidgetValue::to_value).unwrap_or(json!("fallback"))
            }));
        let registered = register_widget(None, registration).unwrap();
        assert_eq!(registered.value, json!("fallback"));
    }
}

#[test]
fn duplicate_user_key_in_one_run_is_rejected() {
    let mut session = Session::new();
    let mut ctx = session.start_run().unwrap();
    register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap();
    let err = register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap_err();
    assert_eq!(
        err,
        WidgetError::DuplicateWidgetId {
            func_name: "checkbox".into(),
            user_key: Some("agree".into()),
            id: WidgetId::new("agree"),
        }
    );
    assert!(err.to_string().contains("key='agree'"));
}

#[test]
fn duplicate_generated_id_asks_for_a_key() {
    let mut session = Session::new();
    let mut ctx = session.start_run().unwrap();
    register_widget(Some(&mut ctx), checkbox(None)).unwrap();
    let err = register_widget(Some(&mut ctx), checkbox(None)).unwrap_err();
    match &err {
        WidgetError::DuplicateWidgetId { user_key, id, .. } => {
            assert_eq!(user_key, &None);
            assert!(crate::identity::is_generated_id(id.as_str()));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("pass a unique `key`"));
}

#[test]
fn same_key_across_runs_is_fine() {
    let mut session = Session::new();
    for _ in 0..2 {
        let mut ctx = session.start_run().unwrap();
        register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap();
        ctx.finish();
    }
}

#[test]
fn aborted_run_does_not_leak_seen_ids() {
    let mut session = Session::new();
    {
        let mut ctx = session.start_run().unwrap();
        register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap();
        // dropped without finish
    }
    let mut ctx = session.start_run().unwrap();
    assert!(register_widget(Some(&mut ctx), checkbox(Some("agree"))).is_ok());
}

#[test]
fn returns_client_value_through_deserializer() {
    let mut session = Session::new();
    session.enqueue_client_update(WidgetStates::new().with("agree", WidgetValue::Bool(true)));
    let mut ctx = session.start_run().unwrap();
    let registered = register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap();
    assert_eq!(registered.id.as_str(), "agree");
    assert_eq!(registered.value, json!(true));
}

#[test]
fn redeclaring_without_callback_drops_the_old_one() {
    let mut session = Session::new();
    let mut ctx = session.start_run().unwrap();
    register_widget(
        Some(&mut ctx),
        checkbox(Some("agree")).on_change(|_state, _args| Ok(()), []),
    )
    .unwrap();
    assert!(ctx.widgets().has_callback("agree"));
    ctx.finish();

    let mut ctx = session.start_run().unwrap();
    register_widget(Some(&mut ctx), checkbox(Some("agree"))).unwrap();
    assert!(!ctx.widgets().has_callback("agree"));
}

#[test]
fn callback_inside_form_is_rejected() {
    let mut session = Session::new();
    let mut ctx = session.start_run().unwrap();
    let err = ctx
        .with_form("f", |ctx| {
            register_widget(
                Some(ctx),
                checkbox(Some("agree")).on_change(|_state, _args| Ok(()), []),
            )
        })
        .unwrap_err();
    assert_eq!(
        err,
        WidgetError::Form(FormUsageError::CallbackInForm {
            kind: WidgetKind::Checkbox
        })
    );
    assert!(!ctx.is_registered("agree"));
}

#[test]
fn generated_id_ignores_builder_calls() {
    let plain = WidgetRegistration::new(WidgetKind::Checkbox, json!({"label": "Agree"}), None);
    let decorated = checkbox(None).with_func_name("toggle");
    assert_eq!(plain.id(), decorated.id());
    assert_eq!(decorated.func_name(), "toggle");
}

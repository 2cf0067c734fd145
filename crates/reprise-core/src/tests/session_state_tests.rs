use super::*;
use crate::record::{WidgetStates, WidgetValue};
use crate::store::deserializer_from;
use serde_json::json;

fn no_widgets() -> HashSet<WidgetId> {
    HashSet::default()
}

#[test]
fn promote_moves_pending_into_committed() {
    let mut state = SessionState::new();
    let widgets = WidgetStateStore::new();
    let registered = no_widgets();
    SessionStateProxy::new(&mut state, &widgets, &registered)
        .set("key", json!(5))
        .unwrap();
    assert!(state.is_new_value("key"));

    state.promote();
    assert!(!state.is_new_value("key"));
    assert_eq!(state.get_old_value("key"), Some(&json!(5)));
    assert_eq!(state.resolve("key", &widgets), Some(json!(5)));
}

#[test]
fn pending_beats_widget_live_beats_committed() {
    let mut state = SessionState::new();
    let mut widgets = WidgetStateStore::new();
    state.insert_pending("k", json!("old"));
    state.promote();
    assert_eq!(state.resolve("k", &widgets), Some(json!("old")));

    widgets.set_state(WidgetStates::new().with("k", WidgetValue::String("live".into())));
    assert_eq!(state.resolve("k", &widgets), Some(json!("live")));

    state.insert_pending("k", json!("new"));
    assert_eq!(state.resolve("k", &widgets), Some(json!("new")));
}

#[test]
fn widget_live_tier_uses_registered_deserializer() {
    let mut state = SessionState::new();
    let mut widgets = WidgetStateStore::new();
    widgets.add_deserializer(
        WidgetId::new("pick"),
        deserializer_from(|value| match value {
            Some(WidgetValue::Int(index)) => Value::from(["a", "b", "c"][*index as usize]),
            _ => Value::Null,
        }),
    );
    widgets.set_state(WidgetStates::new().with("pick", WidgetValue::Int(2)));
    let registered = no_widgets();
    let proxy = SessionStateProxy::new(&mut state, &widgets, &registered);
    assert_eq!(proxy.get("pick"), Some(json!("c")));
    assert_eq!(proxy.widget_value("pick"), Some(json!("c")));
    assert!(!proxy.is_new_value("pick"));
}

#[test]
fn write_to_registered_widget_conflicts() {
    let mut state = SessionState::new();
    let widgets = WidgetStateStore::new();
    let mut registered = no_widgets();
    registered.insert(WidgetId::new("k"));
    let mut proxy = SessionStateProxy::new(&mut state, &widgets, &registered);
    assert_eq!(
        proxy.set("k", json!(1)),
        Err(WidgetError::StateWriteConflict { key: "k".into() })
    );
    assert!(proxy.set("other", json!(1)).is_ok());
    assert!(!proxy.contains("k"));
}

#[test]
fn init_value_only_fills_missing_keys() {
    let mut state = SessionState::new();
    let widgets = WidgetStateStore::new();
    let registered = no_widgets();
    let mut proxy = SessionStateProxy::new(&mut state, &widgets, &registered);
    proxy.set("count", json!(3)).unwrap();
    proxy
        .init_values([("count", json!(0)), ("name", json!("anon"))])
        .unwrap();
    assert_eq!(proxy.get("count"), Some(json!(3)));
    assert_eq!(proxy.get_as::<String>("name").as_deref(), Some("anon"));
    assert_eq!(proxy.get_as::<bool>("name"), None);
    assert_eq!(proxy.keys(), vec!["count".to_owned(), "name".to_owned()]);
}

#[test]
fn remove_clears_both_generations() {
    let mut state = SessionState::new();
    state.insert_pending("k", json!(1));
    state.promote();
    state.insert_pending("k", json!(2));
    assert_eq!(state.remove("k"), Some(json!(2)));
    assert_eq!(state.get_old_value("k"), None);
    assert!(!state.is_new_value("k"));
}

#[test]
fn merged_view_and_display_are_sorted() {
    let mut state = SessionState::new();
    let mut widgets = WidgetStateStore::new();
    state.insert_pending("b", json!(1));
    state.promote();
    state.insert_pending("a", json!(2));
    widgets.set_state(WidgetStates::new().with("c", WidgetValue::Bool(true)));

    let merged = state.merged(&widgets);
    let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(state.to_string(), r#"{"a":2,"b":1}"#);
}

#[test]
fn discard_pending_keeps_committed() {
    let mut state = SessionState::new();
    state.insert_pending("kept", json!(1));
    state.promote();
    state.insert_pending("dropped", json!(2));
    state.discard_pending();
    assert_eq!(state.get_new_value("dropped"), None);
    assert_eq!(state.get_old_value("kept"), Some(&json!(1)));
}

#[test]
fn cull_widget_keys_spares_user_keys() {
    let mut state = SessionState::new();
    let generated = format!("{}-checkbox-00ff", crate::identity::GENERATED_ID_PREFIX);
    state.insert_pending(generated.clone(), json!(true));
    state.insert_pending("user_key", json!(true));
    state.promote();
    state.cull_widget_keys(&no_widgets());
    assert_eq!(state.get_old_value(&generated), None);
    assert_eq!(state.get_old_value("user_key"), Some(&json!(true)));
}

//! Widget identity.
//!
//! A widget with a user key is identified by that key. Anything else is
//! identified by a hash of its kind and declaration payload, which is why two
//! structurally identical unkeyed widgets collide.

use crate::declaration::WidgetKind;
use crate::hash;
use crate::record::WidgetId;
use serde_json::Value;
use std::hash::Hasher;

/// Prefix of every generated ID. User keys are taken verbatim.
pub const GENERATED_ID_PREFIX: &str = "$$WIDGET";

/// Computes the widget ID for a declaration.
///
/// `payload` is hashed through its canonical JSON text: object keys are
/// sorted, so two payloads built with fields in different orders agree.
pub fn compute_widget_id(kind: WidgetKind, payload: &Value, user_key: Option<&str>) -> WidgetId {
    if let Some(key) = user_key {
        return WidgetId::new(key);
    }
    let mut hasher = hash::identity::new();
    hasher.write(kind.as_str().as_bytes());
    hasher.write_u8(0xff);
    hasher.write(payload.to_string().as_bytes());
    WidgetId::new(format!("{GENERATED_ID_PREFIX}-{kind}-{:016x}", hasher.finish()))
}

pub fn is_generated_id(id: &str) -> bool {
    id.starts_with(GENERATED_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn user_key_is_used_verbatim() {
        let id = compute_widget_id(WidgetKind::Checkbox, &json!({"label": "x"}), Some("agree"));
        assert_eq!(id.as_str(), "agree");
        assert!(!is_generated_id(id.as_str()));
    }

    #[test]
    fn generated_id_depends_on_kind_and_payload() {
        let payload = json!({"label": "Name"});
        let text = compute_widget_id(WidgetKind::TextInput, &payload, None);
        let area = compute_widget_id(WidgetKind::TextArea, &payload, None);
        let other = compute_widget_id(WidgetKind::TextInput, &json!({"label": "Age"}), None);
        assert!(is_generated_id(text.as_str()));
        assert_ne!(text, area);
        assert_ne!(text, other);
    }

    #[test]
    fn field_order_does_not_change_the_id() {
        let mut first = serde_json::Map::new();
        first.insert("label".into(), json!("a"));
        first.insert("help".into(), json!("b"));
        let mut second = serde_json::Map::new();
        second.insert("help".into(), json!("b"));
        second.insert("label".into(), json!("a"));
        assert_eq!(
            compute_widget_id(WidgetKind::Button, &Value::Object(first), None),
            compute_widget_id(WidgetKind::Button, &Value::Object(second), None)
        );
    }

    proptest! {
        #[test]
        fn generated_ids_are_deterministic(label in ".{0,24}", max in proptest::option::of(0i64..1000)) {
            let payload = json!({"label": label, "max": max});
            let first = compute_widget_id(WidgetKind::NumberInput, &payload, None);
            let second = compute_widget_id(WidgetKind::NumberInput, &payload.clone(), None);
            prop_assert_eq!(first, second);
        }
    }
}

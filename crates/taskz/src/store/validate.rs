//! Structural checks for persisted envelopes and import payloads.
//!
//! Both predicates look at raw JSON so that a payload can be judged before
//! any typed decoding is attempted. They never fail and have no side effects.

use serde_json::Value;

/// True iff `envelope` is an object whose `tasks` array holds only objects
/// carrying `id`, `title` and `completed`. Field types are not checked.
pub fn validate_stored(envelope: &Value) -> bool {
    let Some(tasks) = envelope.get("tasks").and_then(Value::as_array) else {
        return false;
    };
    tasks.iter().all(|task| {
        task.as_object().is_some_and(|obj| {
            obj.contains_key("id") && obj.contains_key("title") && obj.contains_key("completed")
        })
    })
}

/// True iff `payload.tasks` is an array and every element has a non-empty string `title`.
/// Looser than [`validate_stored`]: import backfills everything else.
pub fn validate_import(payload: &Value) -> bool {
    let Some(tasks) = payload.get("tasks").and_then(Value::as_array) else {
        return false;
    };
    tasks
        .iter()
        .all(|task| {
            task.get("title")
                .and_then(Value::as_str)
                .is_some_and(|title| !title.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_accepts_minimal_tasks() {
        let v = json!({"tasks": [{"id": 1, "title": "a", "completed": false}]});
        assert!(validate_stored(&v));
        assert!(validate_stored(&json!({"tasks": []})));
    }

    #[test]
    fn stored_checks_presence_not_type() {
        let v = json!({"tasks": [{"id": "x", "title": 5, "completed": null}]});
        assert!(validate_stored(&v));
    }

    #[test]
    fn stored_rejects_bad_shapes() {
        assert!(!validate_stored(&json!(null)));
        assert!(!validate_stored(&json!([1, 2])));
        assert!(!validate_stored(&json!({"tasks": "nope"})));
        assert!(!validate_stored(&json!({"tasks": [{"id": 1, "title": "a"}]})));
        assert!(!validate_stored(&json!({"tasks": [42]})));
    }

    #[test]
    fn import_requires_non_empty_string_titles_only() {
        assert!(validate_import(&json!({"tasks": [{"title": "x"}]})));
        assert!(validate_import(&json!({"tasks": []})));
        assert!(!validate_import(&json!({"tasks": [{"title": ""}]})));
        assert!(!validate_import(&json!({"tasks": [{"title": 1}]})));
        assert!(!validate_import(&json!({"tasks": [{}]})));
        assert!(!validate_import(&json!({"items": []})));
    }
}

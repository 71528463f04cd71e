//! Field merge for partial user updates.

use crate::users::model::{UserDocument, UserPatch};
use serde_json::Value;

/// Whether a JSON value counts as supplied for merge purposes.
///
/// `null`, `false`, any zero number and the empty string are falsy. Arrays and
/// objects are truthy even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Overlay the truthy fields of `patch` onto `existing`.
///
/// Every attribute of the existing document is kept, including ones the patch
/// cannot touch. A falsy value leaves the prior value in place, so a field
/// cannot be cleared through this merge.
pub fn merge_user(existing: &UserDocument, patch: &UserPatch) -> Value {
    let mut merged = existing.fields().clone();
    for (field, value) in patch.fields() {
        if let Some(value) = value.filter(|v| is_truthy(v)) {
            merged.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> UserDocument {
        UserDocument::from_value(json!({
            "id": "u1",
            "type": "user",
            "name": "Alice",
            "username": "alice",
            "email": "a@x.com",
            "userImageUri": "img://alice",
            "followers": ["u2"],
            "following": [],
            "bio": "kept"
        }))
        .unwrap()
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(-0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_merge_overlays_supplied_fields() {
        let patch = UserPatch {
            username: Some(json!("alice2")),
            followers: Some(json!(["u2", "u3"])),
            ..UserPatch::default()
        };

        let merged = merge_user(&alice(), &patch);
        assert_eq!(merged["username"], "alice2");
        assert_eq!(merged["followers"], json!(["u2", "u3"]));
        assert_eq!(merged["email"], "a@x.com");
        assert_eq!(merged["bio"], "kept");
        assert_eq!(merged["id"], "u1");
    }

    #[test]
    fn test_merge_ignores_falsy_values() {
        let patch = UserPatch {
            name: Some(json!("")),
            email: Some(json!(false)),
            user_image_uri: Some(json!(0)),
            ..UserPatch::default()
        };

        let merged = merge_user(&alice(), &patch);
        assert_eq!(merged, alice().into_value());
    }

    #[test]
    fn test_merge_accepts_empty_collections() {
        let patch = UserPatch {
            followers: Some(json!([])),
            ..UserPatch::default()
        };

        let merged = merge_user(&alice(), &patch);
        assert_eq!(merged["followers"], json!([]));
    }

    #[test]
    fn test_merge_adds_missing_fields() {
        let existing = UserDocument::from_value(json!({"id": "u1", "type": "user"})).unwrap();
        let patch = UserPatch {
            name: Some(json!("Alice")),
            ..UserPatch::default()
        };

        let merged = merge_user(&existing, &patch);
        assert_eq!(merged, json!({"id": "u1", "type": "user", "name": "Alice"}));
    }
}

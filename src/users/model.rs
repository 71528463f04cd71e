//! User document and partial-update types.
//!
//! User documents are schema-flexible: [`UserDocument`] keeps every stored
//! attribute and only exposes typed accessors for the ones the update flow
//! inspects. [`UserPatch`] holds the updatable fields of a request body as raw
//! JSON values so that merge rules can look at their truthiness.

use crate::error::{ApiError, ApiResult};
use crate::store::ETAG_FIELD;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Discriminator value shared by all user documents.
pub const USER_TYPE: &str = "user";

/// A stored user document.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    fields: Map<String, Value>,
}

impl UserDocument {
    /// Wrap a stored document. Fails if it is not a JSON object.
    pub fn from_value(value: Value) -> ApiResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ApiError::Unexpected(format!(
                "stored user document is not an object: {}",
                other
            ))),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// The partition discriminator (`type`).
    pub fn partition(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&Value> {
        self.fields.get("email")
    }

    pub fn username(&self) -> Option<&Value> {
        self.fields.get("username")
    }

    /// Revision token assigned by the store.
    pub fn etag(&self) -> Option<&str> {
        self.fields.get(ETAG_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Updatable fields supplied in a PATCH body.
///
/// An absent field and an explicit `null` are both `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<Value>,
    pub username: Option<Value>,
    pub email: Option<Value>,
    pub user_image_uri: Option<Value>,
    pub followers: Option<Value>,
    pub following: Option<Value>,
}

impl UserPatch {
    /// Parse a raw request body.
    ///
    /// Objects contribute their recognized fields; other non-null JSON values
    /// contribute nothing. `null` and malformed JSON are errors.
    pub fn from_slice(body: &[u8]) -> ApiResult<Self> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Null => Err(ApiError::Unexpected(
                "request body must not be null".to_string(),
            )),
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            _ => Ok(Self::default()),
        }
    }

    /// Document field names paired with the supplied values, in merge order.
    pub fn fields(&self) -> [(&'static str, Option<&Value>); 6] {
        [
            ("name", self.name.as_ref()),
            ("username", self.username.as_ref()),
            ("email", self.email.as_ref()),
            ("userImageUri", self.user_image_uri.as_ref()),
            ("followers", self.followers.as_ref()),
            ("following", self.following.as_ref()),
        ]
    }

    /// Whether the patch supplies an email or username to check for uniqueness.
    pub fn has_unique_fields(&self) -> bool {
        self.email.is_some() || self.username.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_from_object() {
        let patch = UserPatch::from_slice(
            br#"{"username": "alice2", "userImageUri": "img://1", "followers": [], "extra": 1}"#,
        )
        .unwrap();

        assert_eq!(patch.username, Some(json!("alice2")));
        assert_eq!(patch.user_image_uri, Some(json!("img://1")));
        assert_eq!(patch.followers, Some(json!([])));
        assert_eq!(patch.email, None);
        assert!(patch.has_unique_fields());
    }

    #[test]
    fn test_patch_null_field_is_absent() {
        let patch = UserPatch::from_slice(br#"{"email": null, "name": "A"}"#).unwrap();
        assert_eq!(patch.email, None);
        assert!(!patch.has_unique_fields());
    }

    #[test]
    fn test_patch_non_object_bodies() {
        assert_eq!(UserPatch::from_slice(b"[1, 2]").unwrap(), UserPatch::default());
        assert_eq!(UserPatch::from_slice(b"42").unwrap(), UserPatch::default());
        assert_eq!(UserPatch::from_slice(br#""text""#).unwrap(), UserPatch::default());
    }

    #[test]
    fn test_patch_rejects_null_and_malformed() {
        assert!(matches!(
            UserPatch::from_slice(b"null"),
            Err(ApiError::Unexpected(_))
        ));
        assert!(matches!(
            UserPatch::from_slice(b"{\"name\":"),
            Err(ApiError::Unexpected(_))
        ));
        assert!(matches!(
            UserPatch::from_slice(b""),
            Err(ApiError::Unexpected(_))
        ));
    }

    #[test]
    fn test_document_accessors() {
        let document = UserDocument::from_value(json!({
            "id": "u1",
            "type": "user",
            "email": "a@x.com",
            "username": "alice",
            "_etag": "abc"
        }))
        .unwrap();

        assert_eq!(document.id(), Some("u1"));
        assert_eq!(document.partition(), Some(USER_TYPE));
        assert_eq!(document.email(), Some(&json!("a@x.com")));
        assert_eq!(document.username(), Some(&json!("alice")));
        assert_eq!(document.etag(), Some("abc"));
    }

    #[test]
    fn test_document_must_be_object() {
        assert!(UserDocument::from_value(json!("u1")).is_err());
    }
}

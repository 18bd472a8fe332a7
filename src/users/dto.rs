use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw request body for create and update.
///
/// Fields stay loosely typed so the validator can report a wrong type as a
/// field error instead of the whole body failing to decode. Unknown keys are
/// dropped here. A key sent as `null` is `Some(Value::Null)`, not `None`.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<Value>,
}

/// Only called when the key exists, so any value (null included) is `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validated input for creating a user.
#[derive(Clone, PartialEq)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated input for updating a user.
#[derive(Clone, PartialEq)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `{"result": ...}` envelope used by list and get.
#[derive(Debug, Serialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

/// `{"message": ...}` body used by writes and by not-found.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_ignores_unknown_keys() {
        let payload: UserPayload = serde_json::from_str(
            r#"{"name":"John","email":"john@example.com","password":"secret1","id":99,"remember_token":"x"}"#,
        )
        .unwrap();
        assert_eq!(payload.name, Some(Value::from("John")));
        assert_eq!(payload.password, Some(Value::from("secret1")));
    }

    #[test]
    fn payload_keeps_explicit_null_apart_from_missing_key() {
        let payload: UserPayload = serde_json::from_str(r#"{"password":null}"#).unwrap();
        assert_eq!(payload.password, Some(Value::Null));
        assert!(payload.name.is_none());
    }

    #[test]
    fn debug_output_hides_password() {
        let input = CreateUser {
            name: "John".into(),
            email: "john@example.com".into(),
            password: "secret1".into(),
        };
        let out = format!("{:?}", input);
        assert!(!out.contains("secret1"));
        assert!(out.contains("<redacted>"));
    }
}

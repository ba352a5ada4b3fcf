//! Values the application hands over for storage.

use serde::{Deserialize, Serialize};

/// A value that can be written to a text-only storage area.
///
/// The relay never inspects the value beyond asking for its stored text. The
/// original value (not its encoding) is what the application gets back in the
/// commit notification.
pub trait StoreValue: Clone + 'static {
    type EncodeError: std::error::Error + 'static;

    fn to_stored(&self) -> Result<String, Self::EncodeError>;
}

impl StoreValue for serde_json::Value {
    type EncodeError = serde_json::Error;

    fn to_stored(&self) -> Result<String, Self::EncodeError> {
        serde_json::to_string(self)
    }
}

/// A write coming out of the application.
///
/// A `value` of `None` is the absent marker: the key is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest<V> {
    pub key: String,
    pub value: Option<V>,
}

impl<V> WriteRequest<V> {
    pub fn store<K: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }

    pub fn remove<K: Into<String>>(key: K) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn is_removal(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_values_are_stored_as_json_text() {
        assert_eq!(json!("dark").to_stored().unwrap(), "\"dark\"");
        assert_eq!(json!(42).to_stored().unwrap(), "42");
        assert_eq!(
            json!({"token": "abc", "expires": 10}).to_stored().unwrap(),
            r#"{"expires":10,"token":"abc"}"#
        );
    }

    #[test]
    fn test_remove_is_the_absent_marker() {
        let req: WriteRequest<serde_json::Value> = WriteRequest::remove("theme");
        assert!(req.is_removal());
        assert!(!WriteRequest::store("theme", json!("dark")).is_removal());
    }
}

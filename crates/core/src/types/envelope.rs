//! The `{ code, message, data }` envelope every `/api` endpoint answers with.
//!
//! The envelope `code` is an application-level result code and is independent
//! of the HTTP status: a `200 OK` response can still carry a failure code.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Application-level code signalling success.
pub const SUCCESS_CODE: i64 = 200;

/// Errors when unwrapping an [`Envelope`].
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The envelope reported success but carried no `data`.
    #[error("response carried no data")]
    MissingData,

    /// `data` did not have the expected shape.
    #[error("unexpected response data: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Application result code, [`SUCCESS_CODE`] on success.
    pub code: i64,
    /// Human-readable message, present on most failures.
    pub message: Option<String>,
    /// Payload.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the application code is the success code.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Take the payload out of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MissingData`] if `data` is absent or null.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        self.data.ok_or(EnvelopeError::MissingData)
    }
}

impl Envelope<Value> {
    /// A token embedded in the payload (`data.token`), if any.
    ///
    /// Empty strings do not count as a token.
    #[must_use]
    pub fn embedded_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Re-read the payload as a concrete type.
    ///
    /// A `null` or missing payload becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Shape`] if the payload does not deserialize as `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Envelope<T>, EnvelopeError> {
        let data = match self.data {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };
        Ok(Envelope {
            code: self.code,
            message: self.message,
            data,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_is_about_code_not_presence_of_data() {
        let ok: Envelope = serde_json::from_value(json!({"code": 200})).unwrap();
        assert!(ok.is_success());
        assert!(ok.data.is_none());

        let failed: Envelope =
            serde_json::from_value(json!({"code": 500, "message": "out of stock"})).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.message.as_deref(), Some("out of stock"));
    }

    #[test]
    fn test_embedded_token() {
        let env: Envelope =
            serde_json::from_value(json!({"code": 200, "data": {"token": "t-1"}})).unwrap();
        assert_eq!(env.embedded_token(), Some("t-1"));

        let empty: Envelope =
            serde_json::from_value(json!({"code": 200, "data": {"token": ""}})).unwrap();
        assert_eq!(empty.embedded_token(), None);

        let list: Envelope = serde_json::from_value(json!({"code": 200, "data": [1, 2]})).unwrap();
        assert_eq!(list.embedded_token(), None);
    }

    #[test]
    fn test_decode_typed_payload() {
        let env: Envelope = serde_json::from_value(json!({"code": 200, "data": [1, 2, 3]})).unwrap();
        let typed: Envelope<Vec<u8>> = env.decode().unwrap();
        assert_eq!(typed.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_null_payload_is_none() {
        let env: Envelope = serde_json::from_value(json!({"code": 200, "data": null})).unwrap();
        let typed: Envelope<String> = env.decode().unwrap();
        assert!(matches!(typed.into_data(), Err(EnvelopeError::MissingData)));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let env: Envelope = serde_json::from_value(json!({"code": 200, "data": "x"})).unwrap();
        assert!(matches!(env.decode::<Vec<u8>>(), Err(EnvelopeError::Shape(_))));
    }
}

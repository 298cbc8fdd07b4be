use crate::error::SessionError;
use serde_json::Value;

/// Bytes accepted by [`Session::write_binary`](super::Session::write_binary).
///
/// Only conversions from byte-sequence-like values exist, and they are
/// fallible: integer sequences must stay within `0..=255`, and a JSON value
/// must be an array of such integers. Anything else is rejected with
/// [`SessionError::InvalidArgument`] before the gateway is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload(Vec<u8>);

impl BinaryPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn byte_at(index: usize, value: i64) -> Result<u8, SessionError> {
    u8::try_from(value).map_err(|_| {
        SessionError::invalid_argument(format!(
            "binary data must be a byte sequence: element {index} ({value}) is outside 0..=255"
        ))
    })
}

impl TryFrom<Vec<u8>> for BinaryPayload {
    type Error = SessionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(Self(bytes))
    }
}

impl TryFrom<&Vec<u8>> for BinaryPayload {
    type Error = SessionError;

    fn try_from(bytes: &Vec<u8>) -> Result<Self, Self::Error> {
        Ok(Self(bytes.clone()))
    }
}

impl TryFrom<&[u8]> for BinaryPayload {
    type Error = SessionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.to_vec()))
    }
}

impl<const N: usize> TryFrom<[u8; N]> for BinaryPayload {
    type Error = SessionError;

    fn try_from(bytes: [u8; N]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.to_vec()))
    }
}

impl<const N: usize> TryFrom<&[u8; N]> for BinaryPayload {
    type Error = SessionError;

    fn try_from(bytes: &[u8; N]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.to_vec()))
    }
}

impl TryFrom<&[i64]> for BinaryPayload {
    type Error = SessionError;

    fn try_from(values: &[i64]) -> Result<Self, Self::Error> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| byte_at(i, *v))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl TryFrom<Vec<i64>> for BinaryPayload {
    type Error = SessionError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        Self::try_from(values.as_slice())
    }
}

impl TryFrom<&Value> for BinaryPayload {
    type Error = SessionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Err(SessionError::invalid_argument(format!(
                "binary data must be an array of bytes, got {}",
                json_kind(value)
            )));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item.as_i64() {
                Some(v) => byte_at(i, v),
                None => Err(SessionError::invalid_argument(format!(
                    "binary data must be a byte sequence: element {i} is {}",
                    json_kind(item)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl TryFrom<Value> for BinaryPayload {
    type Error = SessionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Globally-unique identifier converter.

use super::{ConversionError, ValueConverter};
use crate::store::NativeValue;
use serde_json::Value;
use uuid::Uuid;

const EXPECTED: &str = "uuid";

/// Stores `Uuid` fields as their lowercase hyphenated text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConverter;

impl UuidConverter {
    pub fn encode(&self, id: Uuid) -> NativeValue {
        NativeValue::String(id.hyphenated().to_string())
    }

    /// # Errors
    /// - `OutOfRange` unless `value` is a non-empty string primitive.
    /// - `Malformed` when the text is not a uuid.
    pub fn decode(&self, value: &NativeValue) -> Result<Uuid, ConversionError> {
        let text = match value {
            NativeValue::String(text) if !text.is_empty() => text,
            NativeValue::String(_) => {
                return Err(ConversionError::OutOfRange {
                    expected: EXPECTED,
                    found: "empty string".to_string(),
                })
            }
            other => {
                return Err(ConversionError::OutOfRange {
                    expected: EXPECTED,
                    found: other.kind().to_string(),
                })
            }
        };
        parse(text)
    }
}

impl ValueConverter for UuidConverter {
    fn to_native(&self, value: &Value) -> Result<NativeValue, ConversionError> {
        let id = match value {
            Value::String(text) => parse(text)?,
            other => parse(&other.to_string())?,
        };
        Ok(self.encode(id))
    }

    fn from_native(&self, value: &NativeValue) -> Result<Value, ConversionError> {
        let id = self.decode(value)?;
        Ok(Value::String(id.hyphenated().to_string()))
    }
}

fn parse(text: &str) -> Result<Uuid, ConversionError> {
    Uuid::parse_str(text).map_err(|err| ConversionError::Malformed {
        expected: EXPECTED,
        value: text.to_string(),
        reason: err.to_string(),
    })
}

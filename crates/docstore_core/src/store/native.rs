//! Native value model of the document store.
//!
//! Values serialize as typed JSON (`{"S": "abc"}`, `{"N": "42"}`, ...), the
//! same shape the SQLite client persists.

use crate::convert::ConversionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// One stored document: attribute name to native value.
pub type NativeDocument = BTreeMap<String, NativeValue>;

/// Primitive and container values the store understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeValue {
    #[serde(rename = "S")]
    String(String),
    /// Decimal text, kept verbatim to avoid precision loss.
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "L")]
    List(Vec<NativeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, NativeValue>),
}

impl NativeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short tag used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Null => "NULL",
            Self::List(_) => "L",
            Self::Map(_) => "M",
        }
    }

    /// Default mapping for fields without a registered converter.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => Self::Number(number.to_string()),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(fields) => Self::Map(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Inverse of [`NativeValue::from_json`].
    ///
    /// # Errors
    /// - Returns `ConversionError::Malformed` when stored number text is not a
    ///   valid JSON number.
    pub fn to_json(&self) -> Result<Value, ConversionError> {
        let value = match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(text) => {
                let number = serde_json::from_str::<Number>(text).map_err(|err| {
                    ConversionError::Malformed {
                        expected: "number",
                        value: text.clone(),
                        reason: err.to_string(),
                    }
                })?;
                Value::Number(number)
            }
            Self::String(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(
                items
                    .iter()
                    .map(Self::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Self::Map(fields) => {
                let mut object = Map::with_capacity(fields.len());
                for (name, value) in fields {
                    object.insert(name.clone(), value.to_json()?);
                }
                Value::Object(object)
            }
        };
        Ok(value)
    }
}

//! Value converters between domain scalars and native store values.
//!
//! # Responsibility
//! - Define the converter contract used by the serialization layer.
//! - Keep a registry of converters keyed by the field's declared Rust type.
//!
//! # Invariants
//! - `from_native(to_native(x)) == x` for every valid `x`.
//! - Converters are stateless; the registry is frozen once shared.
//! - Malformed or absent data fails fast instead of defaulting.

mod guid;

pub use self::guid::UuidConverter;

use crate::store::NativeValue;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure to translate a value in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Input text could not be parsed as the expected domain type.
    #[error("malformed {expected} value `{value}`: {reason}")]
    Malformed {
        expected: &'static str,
        value: String,
        reason: String,
    },
    /// Native value is absent, empty, or of the wrong primitive kind.
    #[error("native value out of range for {expected}: found {found}")]
    OutOfRange {
        expected: &'static str,
        found: String,
    },
    /// A field is bound to a domain type with no registered converter.
    #[error("no converter registered for {domain_type}")]
    MissingConverter { domain_type: &'static str },
}

/// Bidirectional mapping for one domain scalar type.
pub trait ValueConverter: Send + Sync {
    /// Converts a loosely-typed domain value into the store's primitive.
    fn to_native(&self, value: &Value) -> Result<NativeValue, ConversionError>;

    /// Recovers the domain value from the store's primitive.
    fn from_native(&self, value: &NativeValue) -> Result<Value, ConversionError>;
}

/// Converter lookup table consulted per bound field.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypeId, Arc<dyn ValueConverter>>,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("converter already registered for {0}")]
    DuplicateConverter(&'static str),
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the converters every store needs (`Uuid` as text).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .converters
            .insert(TypeId::of::<uuid::Uuid>(), Arc::new(UuidConverter));
        registry
    }

    /// Registers `converter` for domain type `S`.
    ///
    /// # Errors
    /// - Returns `DuplicateConverter` when `S` already has a converter.
    pub fn register<S: 'static>(
        &mut self,
        converter: impl ValueConverter + 'static,
    ) -> Result<(), RegistryError> {
        let key = TypeId::of::<S>();
        if self.converters.contains_key(&key) {
            return Err(RegistryError::DuplicateConverter(std::any::type_name::<S>()));
        }
        self.converters.insert(key, Arc::new(converter));
        Ok(())
    }

    pub fn get(&self, domain_type: TypeId) -> Option<&dyn ValueConverter> {
        self.converters.get(&domain_type).map(|converter| converter.as_ref())
    }

    pub fn contains<S: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<S>())
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversionError, ConverterRegistry, RegistryError, UuidConverter, ValueConverter};
    use crate::store::NativeValue;
    use serde_json::{json, Value};
    use std::any::TypeId;

    struct UpperCase;

    impl ValueConverter for UpperCase {
        fn to_native(&self, value: &Value) -> Result<NativeValue, ConversionError> {
            let text = value.as_str().ok_or_else(|| ConversionError::OutOfRange {
                expected: "text",
                found: value.to_string(),
            })?;
            Ok(NativeValue::string(text.to_uppercase()))
        }

        fn from_native(&self, value: &NativeValue) -> Result<Value, ConversionError> {
            Ok(Value::String(value.as_str().unwrap_or_default().to_lowercase()))
        }
    }

    #[test]
    fn defaults_include_uuid_converter() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.contains::<uuid::Uuid>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ConverterRegistry::with_defaults();
        let err = registry
            .register::<uuid::Uuid>(UuidConverter)
            .expect_err("second uuid converter must be rejected");
        assert!(matches!(err, RegistryError::DuplicateConverter(name) if name.ends_with("Uuid")));
    }

    #[test]
    fn custom_converter_is_found_by_type() {
        struct Shout;
        let mut registry = ConverterRegistry::new();
        registry.register::<Shout>(UpperCase).unwrap();

        let converter = registry.get(TypeId::of::<Shout>()).expect("registered");
        assert_eq!(
            converter.to_native(&json!("hey")).unwrap(),
            NativeValue::string("HEY")
        );
        assert!(registry.get(TypeId::of::<String>()).is_none());
    }
}

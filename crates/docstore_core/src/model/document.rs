//! Stored entity contract.
//!
//! # Responsibility
//! - Bound the generic storage/search components to serializable,
//!   default-constructible entities.
//! - Let entities declare which fields need a value converter.
//!
//! # Invariants
//! - An entity serializes to a JSON object (one attribute per field).
//! - A binding names a top-level field and the Rust type declared for it.
//! - Only bindings declared with [`FieldBinding::optional`] accept a stored
//!   null; a null in any other bound field is a conversion error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::TypeId;

/// Entity that can be stored as one document.
///
/// `Default` supplies the payload of failure envelopes.
pub trait Document: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Fields whose values are translated by a registered converter.
    fn field_bindings() -> Vec<FieldBinding> {
        Vec::new()
    }
}

/// Declares that `field` holds a value of domain type `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    field: &'static str,
    domain_type: TypeId,
    domain_type_name: &'static str,
    nullable: bool,
}

impl FieldBinding {
    /// Binding for a field that always holds an `S`.
    pub fn of<S: 'static>(field: &'static str) -> Self {
        Self {
            field,
            domain_type: TypeId::of::<S>(),
            domain_type_name: std::any::type_name::<S>(),
            nullable: false,
        }
    }

    /// Binding for an `Option<S>` field; nulls bypass the converter.
    pub fn optional<S: 'static>(field: &'static str) -> Self {
        Self {
            nullable: true,
            ..Self::of::<S>(field)
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn domain_type(&self) -> TypeId {
        self.domain_type
    }

    pub fn domain_type_name(&self) -> &'static str {
        self.domain_type_name
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

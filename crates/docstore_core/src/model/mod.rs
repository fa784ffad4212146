//! Domain-facing data model for the access layer.
//!
//! # Responsibility
//! - Define the result envelope returned by every operation.
//! - Define the capability bound stored entities must satisfy.
//!
//! # Invariants
//! - Entities are opaque to the core apart from their serializable field set
//!   and declared converter bindings.

pub mod document;
pub mod result;

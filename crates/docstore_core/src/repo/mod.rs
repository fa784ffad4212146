//! Storage and search contracts over a document context.
//!
//! # Responsibility
//! - Expose point operations (get, save, delete) and paged reads (scan,
//!   query) with one uniform result envelope.
//! - Apply the same classify-and-wrap failure policy to every operation.
//!
//! # Invariants
//! - Components hold only shared immutable state and are safe to call
//!   concurrently.
//! - `Err` is reserved for unclassified failures; everything expected comes
//!   back as an envelope.

pub mod object_search;
pub mod object_storage;

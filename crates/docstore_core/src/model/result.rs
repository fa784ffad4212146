//! Operation result envelope.
//!
//! # Responsibility
//! - Give every storage/search operation one uniform outcome shape.
//! - Carry diagnostics for classified failures without exposing them as
//!   control-flow inputs.
//!
//! # Invariants
//! - `success == true` implies `error.is_none()`.
//! - `success == false` implies `value == T::default()`.
//! - Envelopes are immutable once constructed.

use crate::failure::FailureClass;
use crate::store::StoreError;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Payload-less envelope used by operations that return no entity.
pub type StatusResult = OperationResult<()>;

/// Diagnostic detail attached to a classified failure envelope.
///
/// Callers may log or display this, but should branch on
/// [`OperationResult::is_success`] only.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    reason: String,
    class: Option<FailureClass>,
    source: Option<Arc<StoreError>>,
}

impl ErrorInfo {
    /// Builds diagnostics from a store error that has already been classified.
    pub fn classified(class: FailureClass, error: StoreError) -> Self {
        Self {
            reason: error.to_string(),
            class: Some(class),
            source: Some(Arc::new(error)),
        }
    }

    /// Builds diagnostics that carry only a reason string.
    pub fn reason_only(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            class: None,
            source: None,
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn class(&self) -> Option<FailureClass> {
        self.class
    }

    /// Captured store error, when one caused the failure.
    pub fn source_error(&self) -> Option<&StoreError> {
        self.source.as_deref()
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.class {
            Some(class) => write!(f, "{class} failure: {}", self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Uniform success/value/error wrapper returned by every core operation.
#[derive(Debug, Clone)]
pub struct OperationResult<T> {
    success: bool,
    value: T,
    error: Option<ErrorInfo>,
}

impl<T> OperationResult<T> {
    /// Successful outcome carrying `value`.
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Consumes the envelope and returns its payload.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Splits the envelope into its parts.
    pub fn into_parts(self) -> (bool, T, Option<ErrorInfo>) {
        (self.success, self.value, self.error)
    }

    /// Transforms the payload while keeping status and diagnostics.
    ///
    /// `f` must map `T::default()` to `U::default()` for failure envelopes to
    /// keep their invariant; mapping a collection or page projection does.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            success: self.success,
            value: f(self.value),
            error: self.error,
        }
    }
}

impl<T: Default> OperationResult<T> {
    /// Failed outcome with the type's default payload.
    pub fn failed(error: Option<ErrorInfo>) -> Self {
        Self {
            success: false,
            value: T::default(),
            error,
        }
    }
}

impl<T: Default> Default for OperationResult<T> {
    fn default() -> Self {
        Self::failed(None)
    }
}

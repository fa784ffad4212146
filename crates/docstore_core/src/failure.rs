//! Failure classification and the lifecycle wrapper around store calls.
//!
//! # Responsibility
//! - Decide which store errors are expected operational failures.
//! - Run one store interaction through Requested/Completed/Failed events and
//!   fold classified failures into a failure envelope.
//!
//! # Invariants
//! - Only service-side and client-side errors are absorbed.
//! - Unclassified errors are returned unchanged and emit no `Failed` event.

use crate::events::{EventTarget, Operation, OperationEvents};
use crate::model::result::{ErrorInfo, OperationResult};
use crate::store::{StoreError, StoreResult};
use std::fmt::{Display, Formatter};
use std::future::Future;

/// Category of an absorbed failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// The store rejected or failed the request.
    ServiceSide,
    /// The local client, transport, or configuration failed.
    ClientSide,
}

impl FailureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceSide => "service-side",
            Self::ClientSide => "client-side",
        }
    }
}

impl Display for FailureClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoreError {
    /// Returns the failure class, or `None` for errors that must propagate.
    pub fn classify(&self) -> Option<FailureClass> {
        match self {
            Self::Service(_) => Some(FailureClass::ServiceSide),
            Self::Client(_) => Some(FailureClass::ClientSide),
            Self::Conversion { .. } | Self::Serialization(_) | Self::Other(_) => None,
        }
    }

    /// Message used as the `reason` of a failure event.
    pub fn reason(&self) -> String {
        match self {
            Self::Service(err) => err.message.clone(),
            Self::Client(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Runs `call` inside the three-phase lifecycle.
///
/// # Errors
/// - Returns the store error unchanged when it is not classified.
pub(crate) async fn track<T, F>(
    events: &OperationEvents,
    operation: Operation,
    target: EventTarget<'_>,
    call: F,
) -> StoreResult<OperationResult<T>>
where
    T: Default,
    F: Future<Output = StoreResult<T>>,
{
    events.requested(operation, target);

    match call.await {
        Ok(value) => {
            events.completed(operation, target);
            Ok(OperationResult::ok(value))
        }
        Err(err) => {
            let Some(class) = err.classify() else {
                return Err(err);
            };
            events.failed(operation, target, &err.reason(), &err);
            Ok(OperationResult::failed(Some(ErrorInfo::classified(class, err))))
        }
    }
}

//! Structured lifecycle events for storage and search operations.
//!
//! # Responsibility
//! - Define a fixed table of event kinds with stable ids and parameter shapes.
//! - Route records to a pluggable sink; the default forwards to `log`.
//!
//! # Invariants
//! - A failure produces two records: the lifecycle `*Failed` warning and a
//!   separate `GeneralException` error carrying the error text.
//! - Lifecycle records never embed error payloads beyond the reason string.

use log::Level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Operations that emit lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetById,
    Save,
    Delete,
    Scan,
    Query,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetById => "GetById",
            Self::Save => "Save",
            Self::Delete => "Delete",
            Self::Scan => "Scan",
            Self::Query => "Query",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Requested,
    Completed,
    Failed,
}

/// Stable event identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventCode {
    GeneralException = 1000,
    GetByIdRequested = 1101,
    GetByIdCompleted = 1102,
    GetByIdFailed = 1103,
    SaveRequested = 1201,
    SaveCompleted = 1202,
    SaveFailed = 1203,
    DeleteRequested = 1301,
    DeleteCompleted = 1302,
    DeleteFailed = 1303,
    ScanRequested = 1401,
    ScanCompleted = 1402,
    ScanFailed = 1403,
    QueryRequested = 1501,
    QueryCompleted = 1502,
    QueryFailed = 1503,
}

impl EventCode {
    pub fn lifecycle(operation: Operation, phase: Phase) -> Self {
        use EventCode::*;
        match (operation, phase) {
            (Operation::GetById, Phase::Requested) => GetByIdRequested,
            (Operation::GetById, Phase::Completed) => GetByIdCompleted,
            (Operation::GetById, Phase::Failed) => GetByIdFailed,
            (Operation::Save, Phase::Requested) => SaveRequested,
            (Operation::Save, Phase::Completed) => SaveCompleted,
            (Operation::Save, Phase::Failed) => SaveFailed,
            (Operation::Delete, Phase::Requested) => DeleteRequested,
            (Operation::Delete, Phase::Completed) => DeleteCompleted,
            (Operation::Delete, Phase::Failed) => DeleteFailed,
            (Operation::Scan, Phase::Requested) => ScanRequested,
            (Operation::Scan, Phase::Completed) => ScanCompleted,
            (Operation::Scan, Phase::Failed) => ScanFailed,
            (Operation::Query, Phase::Requested) => QueryRequested,
            (Operation::Query, Phase::Completed) => QueryCompleted,
            (Operation::Query, Phase::Failed) => QueryFailed,
        }
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        use EventCode::*;
        match self {
            GeneralException => "general_exception",
            GetByIdRequested => "get_by_id_requested",
            GetByIdCompleted => "get_by_id_completed",
            GetByIdFailed => "get_by_id_failed",
            SaveRequested => "save_requested",
            SaveCompleted => "save_completed",
            SaveFailed => "save_failed",
            DeleteRequested => "delete_requested",
            DeleteCompleted => "delete_completed",
            DeleteFailed => "delete_failed",
            ScanRequested => "scan_requested",
            ScanCompleted => "scan_completed",
            ScanFailed => "scan_failed",
            QueryRequested => "query_requested",
            QueryCompleted => "query_completed",
            QueryFailed => "query_failed",
        }
    }

    pub fn level(self) -> Level {
        use EventCode::*;
        match self {
            GeneralException => Level::Error,
            GetByIdFailed | SaveFailed | DeleteFailed | ScanFailed | QueryFailed => Level::Warn,
            _ => Level::Info,
        }
    }
}

/// One emitted event with its named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub code: EventCode,
    pub operation: Option<Operation>,
    pub partition: Option<String>,
    pub index: Option<String>,
    pub reason: Option<String>,
}

impl EventRecord {
    pub fn level(&self) -> Level {
        self.code.level()
    }

    /// Human-readable message; parameter order is fixed per event kind.
    pub fn message(&self) -> String {
        let subject = match (&self.partition, &self.index) {
            (Some(partition), _) => format!("document (partition={partition})"),
            (None, Some(index)) => format!("documents (index={index})"),
            (None, None) => "documents".to_string(),
        };
        let operation = self.operation.map_or("operation", Operation::as_str);
        let reason = self.reason.as_deref().unwrap_or_default();
        match self.code.level() {
            Level::Error => format!("docstore exception: {reason}"),
            Level::Warn => format!("docstore: {operation} failed for {subject}. reason={reason}"),
            _ if self.code.name().ends_with("requested") => {
                format!("docstore: {operation} requested for {subject}")
            }
            _ => format!("docstore: {operation} completed for {subject}"),
        }
    }
}

/// Destination for lifecycle records.
pub trait EventSink: Send + Sync {
    fn record(&self, record: &EventRecord);
}

/// Sink writing `event=<name> event_id=<id> module=docstore ...` lines via `log`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, record: &EventRecord) {
        let level = record.level();
        if !log::log_enabled!(target: "docstore", level) {
            return;
        }
        log::log!(
            target: "docstore",
            level,
            "event={} event_id={} module=docstore operation={} partition={} {}",
            record.code.name(),
            record.code.id(),
            record.operation.map_or("-", Operation::as_str),
            record.partition.as_deref().unwrap_or("-"),
            record.message()
        );
    }
}

/// Typed emit functions bound to one sink.
#[derive(Clone)]
pub struct OperationEvents {
    sink: Arc<dyn EventSink>,
}

impl Default for OperationEvents {
    fn default() -> Self {
        Self::new(Arc::new(LogSink))
    }
}

impl std::fmt::Debug for OperationEvents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationEvents").finish_non_exhaustive()
    }
}

/// Target of one operation, used as the event parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTarget<'a> {
    pub partition: Option<&'a str>,
    pub index: Option<&'a str>,
}

impl<'a> EventTarget<'a> {
    pub fn partition(key: &'a str) -> Self {
        Self {
            partition: Some(key),
            index: None,
        }
    }

    pub fn index(index: Option<&'a str>) -> Self {
        Self {
            partition: None,
            index,
        }
    }
}

impl OperationEvents {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn requested(&self, operation: Operation, target: EventTarget<'_>) {
        self.lifecycle(operation, Phase::Requested, target, None);
    }

    pub fn completed(&self, operation: Operation, target: EventTarget<'_>) {
        self.lifecycle(operation, Phase::Completed, target, None);
    }

    /// Emits the `*Failed` warning followed by a separate exception record.
    pub fn failed(
        &self,
        operation: Operation,
        target: EventTarget<'_>,
        reason: &str,
        error: &(dyn Error + 'static),
    ) {
        self.lifecycle(operation, Phase::Failed, target, Some(reason));
        self.exception(operation, error);
    }

    fn lifecycle(
        &self,
        operation: Operation,
        phase: Phase,
        target: EventTarget<'_>,
        reason: Option<&str>,
    ) {
        self.sink.record(&EventRecord {
            code: EventCode::lifecycle(operation, phase),
            operation: Some(operation),
            partition: target.partition.map(str::to_string),
            index: target.index.map(str::to_string),
            reason: reason.map(str::to_string),
        });
    }

    fn exception(&self, operation: Operation, error: &(dyn Error + 'static)) {
        self.sink.record(&EventRecord {
            code: EventCode::GeneralException,
            operation: Some(operation),
            partition: None,
            index: None,
            reason: Some(error_chain(error)),
        });
    }
}

fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

//! Generic document-storage access layer.
//!
//! Typed storage and search components over a schemaless document store,
//! returning one result envelope per call, classifying store failures, and
//! translating domain scalars through registered value converters.

pub mod config;
pub mod context;
pub mod convert;
pub mod db;
pub mod events;
pub mod failure;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::TableConfig;
pub use context::{DocumentContext, DocumentPage};
pub use convert::{ConversionError, ConverterRegistry, RegistryError, UuidConverter, ValueConverter};
pub use events::{EventCode, EventRecord, EventSink, LogSink, Operation, OperationEvents};
pub use failure::FailureClass;
pub use logging::{default_log_level, init_logging, logging_status, LogDestination, LoggingConfig};
pub use model::document::{Document, FieldBinding};
pub use model::result::{ErrorInfo, OperationResult, StatusResult};
pub use repo::object_search::{DocumentSearch, ObjectSearch};
pub use repo::object_storage::{DocumentStorage, ObjectStorage};
pub use store::{
    ClientError, ClientErrorKind, Condition, ConditionOp, MemoryStoreClient, NativeDocument,
    NativeValue, Page, QueryConfig, ScanConfig, ServiceError, ServiceErrorKind, SqliteStoreClient,
    StoreClient, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

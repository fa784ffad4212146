//! Store client seam and the bundled client implementations.
//!
//! # Responsibility
//! - Define the narrow capability set the access layer consumes from a
//!   document store: get, put, delete, paged scan, paged query.
//! - Define the error taxonomy store clients report through.
//!
//! # Invariants
//! - Clients report remote rejections as `StoreError::Service` and local
//!   client/transport/configuration faults as `StoreError::Client`.
//! - Deleting a missing key succeeds.
//! - A page is never exhaustive beyond its `last_evaluated_key`.

mod memory;
mod native;
pub(crate) mod paging;
mod request;
mod sqlite;

pub use memory::MemoryStoreClient;
pub use native::{NativeDocument, NativeValue};
pub use paging::MAX_PAGE_ITEMS;
pub use request::{Condition, ConditionOp, QueryConfig, ScanConfig};
pub use sqlite::SqliteStoreClient;

use crate::convert::ConversionError;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of raw documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<NativeDocument>,
    /// Partition key to resume after; `None` when the read is exhausted.
    pub last_evaluated_key: Option<String>,
}

/// Everything that can go wrong talking to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected or failed the request.
    #[error("store service error: {0}")]
    Service(#[from] ServiceError),
    /// The local client failed before or independent of reaching the store.
    #[error("store client error: {0}")]
    Client(#[from] ClientError),
    /// A field value could not be converted.
    #[error("conversion failed for field `{field}`: {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },
    /// An entity or stored document could not be (de)serialized.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Anything else a client implementation chose to surface.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    Throttling,
    Validation,
    ResourceNotFound,
    ConditionalCheckFailed,
    Internal,
}

impl ServiceErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Throttling => "throttling",
            Self::Validation => "validation",
            Self::ResourceNotFound => "resource_not_found",
            Self::ConditionalCheckFailed => "conditional_check_failed",
            Self::Internal => "internal",
        }
    }
}

impl Display for ServiceErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote rejection reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    Connection,
    Timeout,
    Configuration,
    /// The local driver failed (statement preparation, parameter binding, ...).
    Driver,
}

impl ClientErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::Configuration => "configuration",
            Self::Driver => "driver",
        }
    }
}

impl Display for ClientErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local client failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Capability set of a document store.
///
/// `table` is the fully resolved table name (prefix already applied).
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Loads the document at `key`, `None` when absent.
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<NativeDocument>>;

    /// Writes `document` at `key`, replacing any existing document.
    async fn put_item(&self, table: &str, key: &str, document: NativeDocument)
        -> StoreResult<()>;

    /// Removes the document at `key`; succeeds when nothing is stored there.
    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()>;

    /// Fetches one page of an unconstrained scan.
    async fn scan_page(&self, table: &str, config: &ScanConfig) -> StoreResult<Page>;

    /// Fetches one page of a key-condition query.
    async fn query_page(&self, table: &str, config: &QueryConfig) -> StoreResult<Page>;
}

#[async_trait]
impl<C> StoreClient for Arc<C>
where
    C: StoreClient + ?Sized,
{
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<NativeDocument>> {
        (**self).get_item(table, key).await
    }

    async fn put_item(
        &self,
        table: &str,
        key: &str,
        document: NativeDocument,
    ) -> StoreResult<()> {
        (**self).put_item(table, key, document).await
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        (**self).delete_item(table, key).await
    }

    async fn scan_page(&self, table: &str, config: &ScanConfig) -> StoreResult<Page> {
        (**self).scan_page(table, config).await
    }

    async fn query_page(&self, table: &str, config: &QueryConfig) -> StoreResult<Page> {
        (**self).query_page(table, config).await
    }
}

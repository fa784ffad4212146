#![allow(dead_code)]

use async_trait::async_trait;
use docstore_core::{
    ClientError, ClientErrorKind, Document, DocumentContext, EventCode, EventRecord, EventSink,
    FieldBinding, MemoryStoreClient, NativeDocument, OperationEvents, Page, QueryConfig,
    ScanConfig, ServiceError, ServiceErrorKind, StoreClient, StoreError, StoreResult, TableConfig,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const SAMPLE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Uuid::parse_str(id).unwrap(),
            name: name.to_string(),
        }
    }
}

impl Document for User {
    fn field_bindings() -> Vec<FieldBinding> {
        vec![FieldBinding::of::<Uuid>("id")]
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Service(ServiceErrorKind),
    Client(ClientErrorKind),
    Unclassified,
}

impl Fault {
    fn into_error(self) -> StoreError {
        match self {
            Self::Service(kind) => ServiceError::new(kind, "injected service fault").into(),
            Self::Client(kind) => ClientError::new(kind, "injected client fault").into(),
            Self::Unclassified => StoreError::Other(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected defect",
            ))),
        }
    }
}

/// Memory store that counts calls and can fail the next one.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStoreClient,
    calls: AtomicUsize,
    next_fault: Mutex<Option<Fault>>,
}

impl FaultyStore {
    pub fn fail_next(&self, fault: Fault) {
        *self.next_fault.lock().unwrap() = Some(fault);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_fault.lock().unwrap().take() {
            Some(fault) => Err(fault.into_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoreClient for FaultyStore {
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<NativeDocument>> {
        self.enter()?;
        self.inner.get_item(table, key).await
    }

    async fn put_item(
        &self,
        table: &str,
        key: &str,
        document: NativeDocument,
    ) -> StoreResult<()> {
        self.enter()?;
        self.inner.put_item(table, key, document).await
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        self.enter()?;
        self.inner.delete_item(table, key).await
    }

    async fn scan_page(&self, table: &str, config: &ScanConfig) -> StoreResult<Page> {
        self.enter()?;
        self.inner.scan_page(table, config).await
    }

    async fn query_page(&self, table: &str, config: &QueryConfig) -> StoreResult<Page> {
        self.enter()?;
        self.inner.query_page(table, config).await
    }
}

/// Sink keeping every record in memory.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<EventRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn codes(&self) -> Vec<EventCode> {
        self.records().into_iter().map(|record| record.code).collect()
    }

    pub fn count(&self, code: EventCode) -> usize {
        self.codes().into_iter().filter(|seen| *seen == code).count()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, record: &EventRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

pub struct Harness {
    pub store: Arc<FaultyStore>,
    pub sink: Arc<RecordingSink>,
    pub context: Arc<DocumentContext<Arc<FaultyStore>>>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(FaultyStore::default());
        let sink = Arc::new(RecordingSink::default());
        let context = Arc::new(DocumentContext::new(
            store.clone(),
            TableConfig::new("users").with_prefix("test-"),
        ));
        Self {
            store,
            sink,
            context,
        }
    }

    pub fn events(&self) -> OperationEvents {
        OperationEvents::new(self.sink.clone())
    }
}

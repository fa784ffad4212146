//! Paged reads: scan and query.
//!
//! Each call fetches exactly one page. Walking the whole result set is the
//! caller's job: feed `next_start_key` back as `exclusive_start_key`.

use crate::context::{DocumentContext, DocumentPage};
use crate::events::{EventTarget, Operation, OperationEvents};
use crate::failure::track;
use crate::model::document::Document;
use crate::model::result::OperationResult;
use crate::store::{QueryConfig, ScanConfig, StoreClient, StoreResult};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Paged-read contract for one entity type.
///
/// A missing configuration yields `{success: false, value: [], error: None}`
/// without contacting the store.
#[async_trait]
pub trait ObjectSearch<T: Document>: Send + Sync {
    /// One page of a scan, with the key to resume after.
    async fn scan_page(
        &self,
        config: Option<&ScanConfig>,
    ) -> StoreResult<OperationResult<DocumentPage<T>>>;

    /// One page of a key-condition query, with the key to resume after.
    async fn query_page(
        &self,
        config: Option<&QueryConfig>,
    ) -> StoreResult<OperationResult<DocumentPage<T>>>;

    /// Entities from the first page of a scan.
    async fn scan(&self, config: Option<&ScanConfig>) -> StoreResult<OperationResult<Vec<T>>> {
        Ok(self.scan_page(config).await?.map(|page| page.items))
    }

    /// Entities from the first page of a query.
    async fn query(&self, config: Option<&QueryConfig>) -> StoreResult<OperationResult<Vec<T>>> {
        Ok(self.query_page(config).await?.map(|page| page.items))
    }
}

/// [`ObjectSearch`] over a [`DocumentContext`].
pub struct DocumentSearch<T, C> {
    context: Arc<DocumentContext<C>>,
    events: OperationEvents,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C> DocumentSearch<T, C>
where
    T: Document,
    C: StoreClient,
{
    pub fn new(context: Arc<DocumentContext<C>>) -> Self {
        Self::with_events(context, OperationEvents::default())
    }

    pub fn with_events(context: Arc<DocumentContext<C>>, events: OperationEvents) -> Self {
        Self {
            context,
            events,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T, C> ObjectSearch<T> for DocumentSearch<T, C>
where
    T: Document,
    C: StoreClient,
{
    async fn scan_page(
        &self,
        config: Option<&ScanConfig>,
    ) -> StoreResult<OperationResult<DocumentPage<T>>> {
        let Some(config) = config else {
            return Ok(OperationResult::failed(None));
        };
        let context = &self.context;
        track(
            &self.events,
            Operation::Scan,
            EventTarget::index(config.index_name.as_deref()),
            async move { context.scan::<T>(config).await },
        )
        .await
    }

    async fn query_page(
        &self,
        config: Option<&QueryConfig>,
    ) -> StoreResult<OperationResult<DocumentPage<T>>> {
        let Some(config) = config else {
            return Ok(OperationResult::failed(None));
        };
        let context = &self.context;
        track(
            &self.events,
            Operation::Query,
            EventTarget::index(config.index_name.as_deref()),
            async move { context.query::<T>(config).await },
        )
        .await
    }
}

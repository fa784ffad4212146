//! Point operations: get by partition key, save, delete.

use crate::context::DocumentContext;
use crate::events::{EventTarget, Operation, OperationEvents};
use crate::failure::track;
use crate::model::document::Document;
use crate::model::result::{OperationResult, StatusResult};
use crate::store::{StoreClient, StoreResult};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Point-operation contract for one entity type.
#[async_trait]
pub trait ObjectStorage<T: Document>: Send + Sync {
    /// Loads the document at `partition_key`.
    ///
    /// A missing key is a success with `None`.
    async fn get_by_id(&self, partition_key: &str) -> StoreResult<OperationResult<Option<T>>>;

    /// Writes `document` at `partition_key`, overwriting any existing one,
    /// and hands it back unchanged.
    async fn save(&self, partition_key: &str, document: T) -> StoreResult<OperationResult<T>>;

    /// Removes the document at `partition_key`; missing keys succeed.
    async fn delete(&self, partition_key: &str) -> StoreResult<StatusResult>;
}

/// [`ObjectStorage`] over a [`DocumentContext`].
pub struct DocumentStorage<T, C> {
    context: Arc<DocumentContext<C>>,
    events: OperationEvents,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C> DocumentStorage<T, C>
where
    T: Document,
    C: StoreClient,
{
    /// Storage that reports lifecycle events through `log`.
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

    pub fn context(&self) -> &DocumentContext<C> {
        &self.context
    }
}

#[async_trait]
impl<T, C> ObjectStorage<T> for DocumentStorage<T, C>
where
    T: Document,
    C: StoreClient,
{
    async fn get_by_id(&self, partition_key: &str) -> StoreResult<OperationResult<Option<T>>> {
        let context = &self.context;
        track(
            &self.events,
            Operation::GetById,
            EventTarget::partition(partition_key),
            async move { context.load::<T>(partition_key).await },
        )
        .await
    }

    async fn save(&self, partition_key: &str, document: T) -> StoreResult<OperationResult<T>> {
        let context = &self.context;
        track(
            &self.events,
            Operation::Save,
            EventTarget::partition(partition_key),
            async move {
                context.save(partition_key, &document).await?;
                Ok(document)
            },
        )
        .await
    }

    async fn delete(&self, partition_key: &str) -> StoreResult<StatusResult> {
        let context = &self.context;
        track(
            &self.events,
            Operation::Delete,
            EventTarget::partition(partition_key),
            async move { context.delete(partition_key).await },
        )
        .await
    }
}

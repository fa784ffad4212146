//! In-process store client.
//!
//! Tables are created implicitly on first write; reading an unknown table
//! behaves like reading an empty one.

use super::paging::{collect_page, validate_limit, Direction};
use super::{
    ClientError, ClientErrorKind, NativeDocument, Page, QueryConfig, ScanConfig, StoreClient,
    StoreResult,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table = BTreeMap<String, NativeDocument>;

/// `RwLock`-guarded map of tables, ordered by partition key.
#[derive(Debug, Default)]
pub struct MemoryStoreClient {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `table`.
    pub fn item_count(&self, table: &str) -> usize {
        self.read()
            .map(|tables| tables.get(table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> super::StoreError {
    ClientError::new(ClientErrorKind::Connection, "memory store lock poisoned").into()
}

#[async_trait]
impl StoreClient for MemoryStoreClient {
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<NativeDocument>> {
        let tables = self.read()?;
        Ok(tables.get(table).and_then(|items| items.get(key)).cloned())
    }

    async fn put_item(
        &self,
        table: &str,
        key: &str,
        document: NativeDocument,
    ) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        let mut tables = self.write()?;
        if let Some(items) = tables.get_mut(table) {
            items.remove(key);
        }
        Ok(())
    }

    async fn scan_page(&self, table: &str, config: &ScanConfig) -> StoreResult<Page> {
        validate_limit(config.limit)?;
        let tables = self.read()?;
        let Some(items) = tables.get(table) else {
            return Ok(Page::default());
        };

        let candidates = items
            .iter()
            .filter(|(_, document)| {
                config
                    .index_name
                    .as_deref()
                    .map_or(true, |index| document.contains_key(index))
            })
            .map(|(key, document)| (key.clone(), document.clone()));

        Ok(collect_page(
            candidates,
            Direction::Forward,
            config.exclusive_start_key.as_deref(),
            config.limit,
            &config.filter,
        ))
    }

    async fn query_page(&self, table: &str, config: &QueryConfig) -> StoreResult<Page> {
        validate_limit(config.limit)?;
        let tables = self.read()?;
        let Some(items) = tables.get(table) else {
            return Ok(Page::default());
        };

        let matching = items
            .iter()
            .filter(|(key, document)| config.key_matches(key, document))
            .map(|(key, document)| (key.clone(), document.clone()));

        let page = if config.scan_forward {
            collect_page(
                matching,
                Direction::Forward,
                config.exclusive_start_key.as_deref(),
                config.limit,
                &config.filter,
            )
        } else {
            collect_page(
                matching.rev(),
                Direction::Backward,
                config.exclusive_start_key.as_deref(),
                config.limit,
                &config.filter,
            )
        };
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStoreClient;
    use crate::store::{
        Condition, NativeDocument, NativeValue, QueryConfig, ScanConfig, StoreClient,
    };

    fn doc(name: &str, team: &str) -> NativeDocument {
        let mut document = NativeDocument::new();
        document.insert("name".to_string(), NativeValue::string(name));
        document.insert("team".to_string(), NativeValue::string(team));
        document
    }

    #[tokio::test]
    async fn put_get_delete_cycle() {
        let store = MemoryStoreClient::new();
        store.put_item("users", "k1", doc("Alice", "red")).await.unwrap();

        let loaded = store.get_item("users", "k1").await.unwrap();
        assert_eq!(loaded, Some(doc("Alice", "red")));
        assert_eq!(store.item_count("users"), 1);

        store.delete_item("users", "k1").await.unwrap();
        store.delete_item("users", "k1").await.unwrap();
        assert_eq!(store.get_item("users", "k1").await.unwrap(), None);
        assert_eq!(store.get_item("missing", "k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn scan_pages_in_key_order() {
        let store = MemoryStoreClient::new();
        for (key, name) in [("b", "Bob"), ("a", "Alice"), ("c", "Carol")] {
            store.put_item("users", key, doc(name, "red")).await.unwrap();
        }

        let first = store
            .scan_page("users", &ScanConfig::new().with_limit(2))
            .await
            .unwrap();
        assert_eq!(first.items[0]["name"], NativeValue::string("Alice"));
        assert_eq!(first.last_evaluated_key.as_deref(), Some("b"));

        let second = store
            .scan_page("users", &ScanConfig::new().with_limit(2).starting_after("b"))
            .await
            .unwrap();
        assert_eq!(second.items, vec![doc("Carol", "red")]);
        assert!(second.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn query_by_index_respects_direction_and_filter() {
        let store = MemoryStoreClient::new();
        store.put_item("users", "a", doc("Alice", "red")).await.unwrap();
        store.put_item("users", "b", doc("Bob", "blue")).await.unwrap();
        store.put_item("users", "c", doc("Carol", "red")).await.unwrap();

        let reds = QueryConfig::index("team", NativeValue::string("red")).backward();
        let page = store.query_page("users", &reds).await.unwrap();
        assert_eq!(page.items, vec![doc("Carol", "red"), doc("Alice", "red")]);

        let filtered = QueryConfig::index("team", NativeValue::string("red"))
            .with_filter(Condition::begins_with("name", "Al"));
        let page = store.query_page("users", &filtered).await.unwrap();
        assert_eq!(page.items, vec![doc("Alice", "red")]);

        let single = store
            .query_page("users", &QueryConfig::partition("b"))
            .await
            .unwrap();
        assert_eq!(single.items, vec![doc("Bob", "blue")]);
    }
}

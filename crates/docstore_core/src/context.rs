//! Serialization layer between entities and the store client.
//!
//! # Responsibility
//! - Map a `Document` to a `NativeDocument` and back, consulting the
//!   converter registry for every bound field.
//! - Resolve the target table once and pass it to every client call.
//!
//! # Invariants
//! - Entities serialize to JSON objects; anything else is a serialization error.
//! - Null bound fields are stored as `NativeValue::Null` without a converter call.
//! - A stored null reaches the converter unless its binding is optional, so a
//!   null in a required field fails with that field's name.
//! - Conversion failures carry the offending field name.

use crate::config::TableConfig;
use crate::convert::{ConversionError, ConverterRegistry, ValueConverter};
use crate::model::document::{Document, FieldBinding};
use crate::store::{
    NativeDocument, NativeValue, Page, QueryConfig, ScanConfig, StoreClient, StoreError,
    StoreResult,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Decoded page of entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage<T> {
    pub items: Vec<T>,
    /// Pass as `exclusive_start_key` to fetch the following page.
    pub next_start_key: Option<String>,
}

impl<T> Default for DocumentPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_start_key: None,
        }
    }
}

/// Store client plus the configuration needed to address one table.
pub struct DocumentContext<C> {
    client: C,
    converters: Arc<ConverterRegistry>,
    config: TableConfig,
    table: String,
}

impl<C> std::fmt::Debug for DocumentContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentContext")
            .field("table", &self.table)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

impl<C: StoreClient> DocumentContext<C> {
    /// Context using the default converters.
    pub fn new(client: C, config: TableConfig) -> Self {
        Self::with_converters(client, config, Arc::new(ConverterRegistry::with_defaults()))
    }

    pub fn with_converters(
        client: C,
        config: TableConfig,
        converters: Arc<ConverterRegistry>,
    ) -> Self {
        let table = config.target_table();
        Self {
            client,
            converters,
            config,
            table,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Fully resolved table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub async fn load<T: Document>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.client.get_item(&self.table, key).await? {
            Some(document) => Ok(Some(self.decode(document)?)),
            None => Ok(None),
        }
    }

    pub async fn save<T: Document>(&self, key: &str, entity: &T) -> StoreResult<()> {
        let document = self.encode(entity)?;
        self.client.put_item(&self.table, key, document).await
    }

    pub async fn delete(&self, key: &str) -> StoreResult<()> {
        self.client.delete_item(&self.table, key).await
    }

    pub async fn scan<T: Document>(&self, config: &ScanConfig) -> StoreResult<DocumentPage<T>> {
        let page = self.client.scan_page(&self.table, config).await?;
        self.decode_page(page)
    }

    pub async fn query<T: Document>(&self, config: &QueryConfig) -> StoreResult<DocumentPage<T>> {
        let page = self.client.query_page(&self.table, config).await?;
        self.decode_page(page)
    }

    fn decode_page<T: Document>(&self, page: Page) -> StoreResult<DocumentPage<T>> {
        let items = page
            .items
            .into_iter()
            .map(|document| self.decode(document))
            .collect::<StoreResult<Vec<T>>>()?;
        Ok(DocumentPage {
            items,
            next_start_key: page.last_evaluated_key,
        })
    }

    /// Entity to native document.
    pub fn encode<T: Document>(&self, entity: &T) -> StoreResult<NativeDocument> {
        let Value::Object(fields) = serde_json::to_value(entity)? else {
            return Err(not_an_object::<T>());
        };
        let bindings = T::field_bindings();

        let mut document = NativeDocument::new();
        for (name, value) in fields {
            let native = match self.bound_converter(&bindings, &name)? {
                Some((_, converter)) if !value.is_null() => converter
                    .to_native(&value)
                    .map_err(|source| conversion(&name, source))?,
                _ => NativeValue::from_json(&value),
            };
            document.insert(name, native);
        }
        Ok(document)
    }

    /// Native document to entity.
    pub fn decode<T: Document>(&self, document: NativeDocument) -> StoreResult<T> {
        let bindings = T::field_bindings();

        let mut fields = Map::with_capacity(document.len());
        for (name, native) in document {
            let value = match self.bound_converter(&bindings, &name)? {
                Some((binding, converter)) if !(binding.is_nullable() && native.is_null()) => {
                    converter.from_native(&native)
                }
                _ => native.to_json(),
            }
            .map_err(|source| conversion(&name, source))?;
            fields.insert(name, value);
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    fn bound_converter<'b>(
        &self,
        bindings: &'b [FieldBinding],
        field: &str,
    ) -> StoreResult<Option<(&'b FieldBinding, &dyn ValueConverter)>> {
        let Some(binding) = bindings.iter().find(|binding| binding.field() == field) else {
            return Ok(None);
        };
        match self.converters.get(binding.domain_type()) {
            Some(converter) => Ok(Some((binding, converter))),
            None => Err(conversion(
                field,
                ConversionError::MissingConverter {
                    domain_type: binding.domain_type_name(),
                },
            )),
        }
    }
}

fn conversion(field: &str, source: ConversionError) -> StoreError {
    StoreError::Conversion {
        field: field.to_string(),
        source,
    }
}

fn not_an_object<T>() -> StoreError {
    let message = format!(
        "{} must serialize to an object",
        std::any::type_name::<T>()
    );
    StoreError::Serialization(<serde_json::Error as serde::ser::Error>::custom(message))
}

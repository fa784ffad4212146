//! SQLite-backed store client.
//!
//! # Responsibility
//! - Persist documents as typed JSON rows keyed by `(table_name, partition_key)`.
//! - Translate SQLite failures into the store error taxonomy.
//!
//! # Invariants
//! - Table names must match `[A-Za-z0-9_.-]{3,255}`; others are rejected as
//!   service-side validation errors before touching the database.
//! - Busy/locked databases surface as service-side throttling.
//! - Rows whose body is not a valid typed JSON document surface as
//!   `StoreError::Serialization` when read by key or by an unindexed scan.
//!   Index reads skip them, so one corrupt row never fails reads of other keys.
//! - Partition-key queries read only the requested key.

use super::paging::{collect_page, effective_limit, validate_limit, Direction};
use super::{
    ClientError, ClientErrorKind, NativeDocument, Page, QueryConfig, ScanConfig, ServiceError,
    ServiceErrorKind, StoreClient, StoreError, StoreResult,
};
use crate::db::{open_db, open_db_in_memory, DbResult};
use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,255}$").expect("table name pattern is valid"));

/// Store client over one SQLite connection.
///
/// Calls run synchronously on the connection; the mutex serializes them.
pub struct SqliteStoreClient {
    conn: Mutex<Connection>,
}

impl SqliteStoreClient {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ClientError::new(ClientErrorKind::Connection, "sqlite connection lock poisoned").into()
        })
    }

    /// Raw `(partition_key, body)` rows of `table` in key order.
    fn load_rows(
        &self,
        table: &str,
        scope: RowScope<'_>,
    ) -> StoreResult<Vec<(String, String)>> {
        let conn = self.lock()?;
        let (comparison, order) = if scope.descending {
            ("<", "DESC")
        } else {
            (">", "ASC")
        };
        let max_rows = scope
            .max_rows
            .map_or(-1, |rows| i64::try_from(rows).unwrap_or(i64::MAX));
        let mut stmt = conn
            .prepare(&format!(
                "SELECT partition_key, body FROM documents
                 WHERE table_name = ?1
                   AND (?2 IS NULL OR partition_key {comparison} ?2)
                   AND (?3 IS NULL OR partition_key = ?3)
                 ORDER BY partition_key {order}
                 LIMIT ?4;"
            ))
            .map_err(map_sqlite_error)?;

        let mut rows = stmt
            .query(params![table, scope.start_after, scope.only_key, max_rows])
            .map_err(map_sqlite_error)?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next().map_err(map_sqlite_error)? {
            let key: String = row.get(0).map_err(map_sqlite_error)?;
            let body: String = row.get(1).map_err(map_sqlite_error)?;
            loaded.push((key, body));
        }
        Ok(loaded)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RowScope<'a> {
    start_after: Option<&'a str>,
    only_key: Option<&'a str>,
    descending: bool,
    max_rows: Option<usize>,
}

/// Decodes every row; a corrupt body fails the read.
fn decode_rows(rows: Vec<(String, String)>) -> StoreResult<Vec<(String, NativeDocument)>> {
    rows.into_iter()
        .map(|(key, body)| Ok((key, decode_body(&body)?)))
        .collect()
}

/// Decodes rows for an index read, keeping those `keep` accepts.
///
/// A corrupt body cannot carry the index attribute, so it is skipped with a
/// warning instead of failing reads of unrelated keys.
fn decode_index_rows(
    table: &str,
    rows: Vec<(String, String)>,
    keep: impl Fn(&str, &NativeDocument) -> bool,
) -> Vec<(String, NativeDocument)> {
    rows.into_iter()
        .filter_map(|(key, body)| match decode_body(&body) {
            Ok(document) => keep(&key, &document).then_some((key, document)),
            Err(err) => {
                warn!(
                    "event=row_skip module=store status=error table={table} key={key} error={err}"
                );
                None
            }
        })
        .collect()
}

fn validate_table(table: &str) -> StoreResult<()> {
    if TABLE_NAME.is_match(table) {
        return Ok(());
    }
    Err(ServiceError::new(
        ServiceErrorKind::Validation,
        format!("invalid table name `{table}`"),
    )
    .into())
}

fn decode_body(body: &str) -> StoreResult<NativeDocument> {
    Ok(serde_json::from_str(body)?)
}

fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            let kind = match failure.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ServiceErrorKind::Throttling,
                ErrorCode::ConstraintViolation => ServiceErrorKind::Validation,
                _ => ServiceErrorKind::Internal,
            };
            ServiceError::new(kind, err.to_string()).into()
        }
        _ => ClientError::new(ClientErrorKind::Driver, err.to_string()).into(),
    }
}

#[async_trait]
impl StoreClient for SqliteStoreClient {
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<NativeDocument>> {
        validate_table(table)?;
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE table_name = ?1 AND partition_key = ?2;",
                params![table, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite_error)?;
        body.as_deref().map(decode_body).transpose()
    }

    async fn put_item(
        &self,
        table: &str,
        key: &str,
        document: NativeDocument,
    ) -> StoreResult<()> {
        validate_table(table)?;
        let body = serde_json::to_string(&document)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (table_name, partition_key, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (table_name, partition_key) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![table, key, body],
        )
        .map_err(map_sqlite_error)?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        validate_table(table)?;
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM documents WHERE table_name = ?1 AND partition_key = ?2;",
            params![table, key],
        )
        .map_err(map_sqlite_error)?;
        Ok(())
    }

    async fn scan_page(&self, table: &str, config: &ScanConfig) -> StoreResult<Page> {
        validate_table(table)?;
        validate_limit(config.limit)?;
        let start_after = config.exclusive_start_key.as_deref();
        let candidates = match config.index_name.as_deref() {
            // One extra row tells whether the page stopped at the limit.
            None => decode_rows(self.load_rows(
                table,
                RowScope {
                    start_after,
                    max_rows: Some(effective_limit(config.limit) + 1),
                    ..RowScope::default()
                },
            )?)?,
            Some(index) => decode_index_rows(
                table,
                self.load_rows(
                    table,
                    RowScope {
                        start_after,
                        ..RowScope::default()
                    },
                )?,
                |_, document| document.contains_key(index),
            ),
        };

        Ok(collect_page(
            candidates,
            Direction::Forward,
            start_after,
            config.limit,
            &config.filter,
        ))
    }

    async fn query_page(&self, table: &str, config: &QueryConfig) -> StoreResult<Page> {
        validate_table(table)?;
        validate_limit(config.limit)?;
        let start_after = config.exclusive_start_key.as_deref();
        let scope = RowScope {
            start_after,
            descending: !config.scan_forward,
            ..RowScope::default()
        };
        let matching = match config.index_name {
            None => {
                // Partition-key queries are point reads.
                let Some(key) = config.key_value.as_str() else {
                    return Ok(Page::default());
                };
                decode_rows(self.load_rows(
                    table,
                    RowScope {
                        only_key: Some(key),
                        ..scope
                    },
                )?)?
            }
            Some(_) => decode_index_rows(table, self.load_rows(table, scope)?, |key, document| {
                config.key_matches(key, document)
            }),
        };
        let direction = if config.scan_forward {
            Direction::Forward
        } else {
            Direction::Backward
        };

        Ok(collect_page(
            matching,
            direction,
            start_after,
            config.limit,
            &config.filter,
        ))
    }
}

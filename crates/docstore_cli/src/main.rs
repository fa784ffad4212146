//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise save, load and scan against the bundled SQLite client.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `docstore_cli [DB_PATH]`. Without a path an in-memory database is used.

use docstore_core::{
    init_logging, Document, DocumentContext, DocumentSearch, DocumentStorage, FieldBinding,
    LoggingConfig, ObjectSearch, ObjectStorage, ScanConfig, SqliteStoreClient, TableConfig,
};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

const PROBE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ProbeUser {
    id: Uuid,
    name: String,
}

impl Document for ProbeUser {
    fn field_bindings() -> Vec<FieldBinding> {
        vec![FieldBinding::of::<Uuid>("id")]
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("docstore_cli logging error={err}");
        return ExitCode::FAILURE;
    }

    match run(std::env::args().nth(1)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("docstore_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(db_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    println!("docstore_core version={}", docstore_core::core_version());

    let client = match db_path.as_deref() {
        Some(path) => SqliteStoreClient::open(path)?,
        None => SqliteStoreClient::open_in_memory()?,
    };
    let context = Arc::new(DocumentContext::new(
        client,
        TableConfig::new("users").with_prefix("probe-"),
    ));
    let storage: DocumentStorage<ProbeUser, _> = DocumentStorage::new(context.clone());
    let search: DocumentSearch<ProbeUser, _> = DocumentSearch::new(context);

    let user = ProbeUser {
        id: Uuid::parse_str(PROBE_ID)?,
        name: "Alice".to_string(),
    };
    let saved = storage.save("user-42", user).await?;
    println!("save success={}", saved.is_success());

    let loaded = storage.get_by_id("user-42").await?;
    match loaded.value() {
        Some(found) => println!(
            "get success={} id={} name={}",
            loaded.is_success(),
            found.id,
            found.name
        ),
        None => println!("get success={} missing", loaded.is_success()),
    }

    let scanned = search.scan(Some(&ScanConfig::new())).await?;
    println!(
        "scan success={} items={}",
        scanned.is_success(),
        scanned.value().len()
    );

    let removed = storage.delete("user-42").await?;
    println!("delete success={}", removed.is_success());
    Ok(())
}

mod common;

use common::{Fault, Harness, User, SAMPLE_ID};
use docstore_core::{
    ClientErrorKind, DocumentStorage, EventCode, FailureClass, NativeValue, ObjectStorage,
    ServiceErrorKind, StoreClient, StoreError,
};
use uuid::Uuid;

fn storage(harness: &Harness) -> DocumentStorage<User, std::sync::Arc<common::FaultyStore>> {
    DocumentStorage::with_events(harness.context.clone(), harness.events())
}

#[tokio::test]
async fn save_then_get_round_trips_identifier_as_text() {
    let harness = Harness::new();
    let storage = storage(&harness);
    let alice = User::new(SAMPLE_ID, "Alice");

    let saved = storage.save("user-42", alice.clone()).await.unwrap();
    assert!(saved.is_success());
    assert!(saved.error().is_none());
    assert_eq!(saved.value(), &alice);

    let stored = harness
        .store
        .get_item("test-users", "user-42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["id"], NativeValue::string(SAMPLE_ID));

    let loaded = storage.get_by_id("user-42").await.unwrap();
    assert!(loaded.is_success());
    let loaded = loaded.into_value().unwrap();
    assert_eq!(loaded, alice);
    assert_eq!(loaded.id.to_string(), SAMPLE_ID);

    assert_eq!(
        harness.sink.codes(),
        vec![
            EventCode::SaveRequested,
            EventCode::SaveCompleted,
            EventCode::GetByIdRequested,
            EventCode::GetByIdCompleted,
        ]
    );
}

#[tokio::test]
async fn save_overwrites_existing_document() {
    let harness = Harness::new();
    let storage = storage(&harness);

    storage
        .save("user-1", User::new(SAMPLE_ID, "Alice"))
        .await
        .unwrap();
    let replacement = User {
        id: Uuid::new_v4(),
        name: "Alicia".to_string(),
    };
    storage.save("user-1", replacement.clone()).await.unwrap();

    let loaded = storage.get_by_id("user-1").await.unwrap().into_value();
    assert_eq!(loaded, Some(replacement));
}

#[tokio::test]
async fn service_failure_on_get_becomes_failure_envelope() {
    let harness = Harness::new();
    let storage = storage(&harness);
    harness
        .store
        .fail_next(Fault::Service(ServiceErrorKind::Throttling));

    let result = storage.get_by_id("K1").await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.value(), &None);
    let info = result.error().expect("classified failures carry diagnostics");
    assert_eq!(info.class(), Some(FailureClass::ServiceSide));
    assert!(matches!(info.source_error(), Some(StoreError::Service(_))));

    assert_eq!(harness.sink.count(EventCode::GetByIdFailed), 1);
    assert_eq!(harness.sink.count(EventCode::GeneralException), 1);
    assert_eq!(harness.sink.count(EventCode::GetByIdCompleted), 0);

    let records = harness.sink.records();
    let failed = records
        .iter()
        .find(|record| record.code == EventCode::GetByIdFailed)
        .unwrap();
    assert_eq!(failed.partition.as_deref(), Some("K1"));
    assert_eq!(failed.reason.as_deref(), Some("injected service fault"));
}

#[tokio::test]
async fn client_failure_on_save_returns_default_entity() {
    let harness = Harness::new();
    let storage = storage(&harness);
    harness
        .store
        .fail_next(Fault::Client(ClientErrorKind::Connection));

    let result = storage
        .save("user-42", User::new(SAMPLE_ID, "Alice"))
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.value(), &User::default());
    assert_eq!(
        result.error().and_then(|info| info.class()),
        Some(FailureClass::ClientSide)
    );
    assert_eq!(
        harness.sink.codes(),
        vec![
            EventCode::SaveRequested,
            EventCode::SaveFailed,
            EventCode::GeneralException,
        ]
    );
}

#[tokio::test]
async fn unclassified_failure_on_save_propagates() {
    let harness = Harness::new();
    let storage = storage(&harness);
    harness.store.fail_next(Fault::Unclassified);

    let outcome = storage.save("user-42", User::new(SAMPLE_ID, "Alice")).await;

    assert!(matches!(outcome, Err(StoreError::Other(_))));
    assert_eq!(harness.sink.codes(), vec![EventCode::SaveRequested]);
}

#[tokio::test]
async fn corrupt_identifier_propagates_conversion_error() {
    let harness = Harness::new();
    let storage = storage(&harness);
    let mut document = docstore_core::NativeDocument::new();
    document.insert("id".to_string(), NativeValue::Bool(true));
    document.insert("name".to_string(), NativeValue::string("Mallory"));
    harness
        .store
        .put_item("test-users", "user-9", document)
        .await
        .unwrap();

    let outcome = storage.get_by_id("user-9").await;

    assert!(matches!(
        outcome,
        Err(StoreError::Conversion { ref field, .. }) if field == "id"
    ));
    assert_eq!(harness.sink.count(EventCode::GetByIdFailed), 0);
}

#[tokio::test]
async fn null_identifier_reports_its_field() {
    let harness = Harness::new();
    let storage = storage(&harness);
    let mut document = docstore_core::NativeDocument::new();
    document.insert("id".to_string(), NativeValue::Null);
    document.insert("name".to_string(), NativeValue::string("Nobody"));
    harness
        .store
        .put_item("test-users", "user-0", document)
        .await
        .unwrap();

    let outcome = storage.get_by_id("user-0").await;

    assert!(matches!(
        outcome,
        Err(StoreError::Conversion { ref field, .. }) if field == "id"
    ));
}

#[tokio::test]
async fn delete_of_missing_key_succeeds() {
    let harness = Harness::new();
    let storage = storage(&harness);

    let result = storage.delete("nonexistent-key").await.unwrap();

    assert!(result.is_success());
    assert!(result.error().is_none());
    assert_eq!(
        harness.sink.codes(),
        vec![EventCode::DeleteRequested, EventCode::DeleteCompleted]
    );
}

#[tokio::test]
async fn delete_failure_is_reported_without_payload() {
    let harness = Harness::new();
    let storage = storage(&harness);
    harness
        .store
        .fail_next(Fault::Service(ServiceErrorKind::Internal));

    let result = storage.delete("user-42").await.unwrap();

    assert!(!result.is_success());
    assert_eq!(harness.sink.count(EventCode::DeleteFailed), 1);
    assert_eq!(harness.sink.count(EventCode::GeneralException), 1);
}

#[tokio::test]
async fn concurrent_calls_share_one_storage() {
    let harness = Harness::new();
    let storage = std::sync::Arc::new(storage(&harness));

    let mut handles = Vec::new();
    for index in 0..8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("user-{index}");
            let user = User {
                id: Uuid::new_v4(),
                name: format!("user {index}"),
            };
            storage.save(&key, user.clone()).await.unwrap();
            let loaded = storage.get_by_id(&key).await.unwrap().into_value();
            assert_eq!(loaded, Some(user));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(harness.store.calls(), 16);
}

use airtable_auth_adapter::{AirtableOptions, AirtableStore, Fields, Filter, StoreError, TableStore};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{MOCK_BASE_ID, MockAirtable, store_for};

fn fields(value: Value) -> Fields {
    value.as_object().cloned().expect("fields must be an object")
}

#[tokio::test]
async fn test_create_then_find() {
    // Given a running mock base
    let mock = MockAirtable::start().await;
    let store = store_for(&mock);

    // When a record is created
    let created = store
        .create("User", fields(json!({"name": "Ana", "email": "ana@x.com"})))
        .await
        .expect("create should succeed");

    // Then it can be read back by id
    let found = store.find("User", &created.id).await.expect("find should succeed");
    assert_eq!(found.id, created.id);
    assert_eq!(found.fields.get("email"), Some(&json!("ana@x.com")));
    assert!(found.created_time.is_some());
}

#[tokio::test]
async fn test_find_missing_is_not_found() {
    let mock = MockAirtable::start().await;
    let store = store_for(&mock);

    let result = store.find("User", "recMissing").await;

    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let mock = MockAirtable::start().await;
    let store = store_for(&mock);

    let result = store
        .update("User", "recMissing", fields(json!({"name": "Ghost"})))
        .await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_select_follows_offset_pages() {
    // Given more records than fit in one page
    let mock = MockAirtable::start().await;
    mock.set_page_size(3);
    for i in 0..8 {
        mock.seed("Session", json!({"sessionToken": format!("t{i}"), "userId": ["recUser1"]}));
    }
    let store = store_for(&mock);

    // When selecting without a filter
    let records = store.select("Session", None).await.unwrap();

    // Then every page was fetched in order
    assert_eq!(records.len(), 8);
    assert_eq!(records[7].fields.get("sessionToken"), Some(&json!("t7")));
    assert_eq!(mock.count_requests("GET /Session?"), 3);
}

#[tokio::test]
async fn test_select_with_filter_formula() {
    let mock = MockAirtable::start().await;
    mock.seed("Account", json!({"provider": "github", "providerAccountId": "42"}));
    mock.seed("Account", json!({"provider": "google", "providerAccountId": "42"}));
    let store = store_for(&mock);

    let filter = Filter::and([
        Filter::eq("providerAccountId", "42"),
        Filter::eq("provider", "google"),
    ]);
    let records = store.select("Account", Some(&filter)).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields.get("provider"), Some(&json!("google")));
}

#[tokio::test]
async fn test_filter_value_with_quote_is_escaped() {
    let mock = MockAirtable::start().await;
    mock.seed("User", json!({"email": "o'brien@x.com"}));
    mock.seed("User", json!({"email": "ana@x.com"}));
    let store = store_for(&mock);

    let exact = store
        .select("User", Some(&Filter::eq("email", "o'brien@x.com")))
        .await
        .unwrap();
    let injected = store
        .select("User", Some(&Filter::eq("email", "x' OR '1'='1")))
        .await
        .unwrap();

    assert_eq!(exact.len(), 1);
    assert!(injected.is_empty());
}

#[tokio::test]
async fn test_destroy_splits_batches_of_ten() {
    // Given 23 records
    let mock = MockAirtable::start().await;
    let ids: Vec<String> = (0..23)
        .map(|i| mock.seed("Session", json!({"sessionToken": format!("t{i}")})))
        .collect();
    let store = store_for(&mock);

    // When destroying all of them
    let deleted = store.destroy("Session", &ids).await.unwrap();

    // Then three delete requests were made and nothing is left
    assert_eq!(deleted, ids);
    assert_eq!(mock.count_requests("DELETE /Session"), 3);
    assert!(mock.records("Session").is_empty());
}

#[tokio::test]
async fn test_destroy_unknown_id_is_not_found() {
    let mock = MockAirtable::start().await;
    let id = mock.seed("Session", json!({"sessionToken": "t1"}));
    let store = store_for(&mock);

    let result = store
        .destroy("Session", &[id, "recMissing".to_string()])
        .await;

    assert!(result.unwrap_err().is_not_found());
    assert_eq!(mock.records("Session").len(), 1);
}

#[tokio::test]
async fn test_api_errors_propagate_unchanged() {
    let mock = MockAirtable::start().await;
    mock.fail_next(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_REACHED", "Slow down");
    let store = store_for(&mock);

    let result = store.select("User", None).await;

    assert_eq!(
        result.unwrap_err(),
        StoreError::Api {
            status: 429,
            kind: "RATE_LIMIT_REACHED".to_string(),
            message: "Slow down".to_string(),
        }
    );
}

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let mock = MockAirtable::start().await;
    let options = AirtableOptions::new("patWrong", MOCK_BASE_ID).with_api_url(mock.api_url.clone());
    let store = AirtableStore::new(&options).unwrap();

    let result = store.select("User", None).await;

    match result {
        Err(StoreError::Api { status, kind, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(kind, "AUTHENTICATION_REQUIRED");
        }
        other => panic!("Expected an authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let options = AirtableOptions::new("patKey", MOCK_BASE_ID).with_api_url("http://127.0.0.1:9/v0");
    let store = AirtableStore::new(&options).unwrap();

    let result = store.find("User", "recAny").await;

    assert!(matches!(result, Err(StoreError::Http(_))));
}

#[tokio::test]
async fn test_blank_fields_are_dropped() {
    let mock = MockAirtable::start().await;
    let store = store_for(&mock);
    let created = store
        .create("User", fields(json!({"email": "ana@x.com", "name": "Ana"})))
        .await
        .unwrap();

    let updated = store
        .update("User", &created.id, fields(json!({"name": null})))
        .await
        .unwrap();

    assert!(!updated.fields.contains_key("name"));
    assert_eq!(updated.fields.get("email"), Some(&json!("ana@x.com")));
}

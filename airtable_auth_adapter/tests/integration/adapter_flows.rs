use airtable_auth_adapter::{
    Adapter, AdapterError, AirtableAdapter, AirtableOptions, ConfigError, ModelError,
    ProviderAccountId, SessionAndUser, SessionUpdate, StoreError, User, UserUpdate,
    VerificationTokenKey,
};
use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use crate::common::{
    MockAirtable, adapter_for, base_time, new_user, oauth_account, session, verification_token,
};

#[test]
fn test_adapter_requires_credentials() {
    let result = AirtableAdapter::new(AirtableOptions::new("", ""));

    assert!(matches!(
        result,
        Err(AdapterError::Config(ConfigError::MissingCredential(_)))
    ));
}

/// Sign-up with an OAuth provider followed by a session lookup
#[tokio::test]
async fn test_oauth_sign_in_flow() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    let key = ProviderAccountId::new("github", "1001");

    // Step 1: unknown provider identity
    assert_eq!(adapter.get_user_by_account(&key).await.unwrap(), None);

    // Step 2: create the user and link the account
    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();
    assert!(user.id.starts_with("rec"));
    adapter
        .link_account(oauth_account(&user.id, "github", "1001"))
        .await
        .unwrap();

    // The link is stored as a single-element list
    let accounts = mock.records("Account");
    assert_eq!(accounts[0]["fields"]["userId"], json!([user.id.clone()]));

    // Step 3: the identity now resolves to the user
    assert_eq!(
        adapter.get_user_by_account(&key).await.unwrap(),
        Some(user.clone())
    );

    // Step 4: a session resolves back to the same user
    adapter
        .create_session(session("tok1", &user.id))
        .await
        .unwrap();
    let found = adapter.get_session_and_user("tok1").await.unwrap();
    assert_eq!(
        found,
        Some(SessionAndUser {
            session: session("tok1", &user.id),
            user,
        })
    );
}

#[tokio::test]
async fn test_user_crud_over_http() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);

    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();
    assert_eq!(user.email_verified, None);
    assert!(
        !mock.records("User")[0]["fields"]
            .as_object()
            .unwrap()
            .contains_key("emailVerified")
    );

    let updated = adapter
        .update_user(UserUpdate {
            id: user.id.clone(),
            email_verified: Some(base_time()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        updated,
        Some(User {
            email_verified: Some(base_time()),
            ..user.clone()
        })
    );
    assert_eq!(
        mock.records("User")[0]["fields"]["emailVerified"],
        json!("2025-01-01T12:00:00.000Z")
    );

    assert_eq!(
        adapter.get_user_by_email("ana@x.com").await.unwrap(),
        updated
    );
    assert_eq!(adapter.get_user("recMissing").await.unwrap(), None);
}

#[tokio::test]
async fn test_update_missing_user_is_none() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);

    let result = adapter
        .update_user(UserUpdate {
            id: "recMissing".to_string(),
            name: Some("Ghost".to_string()),
            ..Default::default()
        })
        .await;

    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn test_reverse_links_do_not_leak_into_user() {
    let mock = MockAirtable::start().await;
    let id = mock.seed(
        "User",
        json!({
            "name": "Ana",
            "email": "ana@x.com",
            "emailVerified": "2024-05-01",
            "Account": ["recAcc1"],
            "Session": ["recSes1"]
        }),
    );
    let adapter = adapter_for(&mock);

    let user = adapter.get_user(&id).await.unwrap().unwrap();

    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({
            "id": id,
            "name": "Ana",
            "email": "ana@x.com",
            "image": null,
            "emailVerified": "2024-05-01T00:00:00Z"
        })
    );
}

#[tokio::test]
async fn test_delete_user_cascades_over_http() {
    // Given a user with many sessions and two accounts
    let mock = MockAirtable::start().await;
    mock.set_page_size(5);
    let adapter = adapter_for(&mock);
    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();
    let other = adapter
        .create_user(new_user("Bob", "bob@x.com"))
        .await
        .unwrap();
    for i in 0..14 {
        adapter
            .create_session(session(&format!("tok{i}"), &user.id))
            .await
            .unwrap();
    }
    adapter
        .create_session(session("bob-tok", &other.id))
        .await
        .unwrap();
    adapter
        .link_account(oauth_account(&user.id, "github", "1"))
        .await
        .unwrap();
    adapter
        .link_account(oauth_account(&user.id, "google", "2"))
        .await
        .unwrap();

    // When deleting the user
    adapter.delete_user(&user.id).await.unwrap();

    // Then sessions were removed in batches of at most ten
    assert_eq!(mock.count_requests("DELETE /Session"), 2);
    assert_eq!(mock.records("Session").len(), 1);
    assert!(mock.records("Account").is_empty());
    assert_eq!(adapter.get_user(&user.id).await.unwrap(), None);
    assert_eq!(
        adapter
            .get_user_by_account(&ProviderAccountId::new("github", "1"))
            .await
            .unwrap(),
        None
    );

    // And the other user is untouched
    assert!(adapter.get_session_and_user("bob-tok").await.unwrap().is_some());
}

#[tokio::test]
async fn test_unlink_account_over_http() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();
    adapter
        .link_account(oauth_account(&user.id, "github", "1001"))
        .await
        .unwrap();
    let key = ProviderAccountId::new("github", "1001");

    adapter.unlink_account(&key).await.unwrap();

    assert_eq!(adapter.get_user_by_account(&key).await.unwrap(), None);
    assert!(matches!(
        adapter.unlink_account(&key).await,
        Err(AdapterError::AccountNotFound { .. })
    ));
}

#[tokio::test]
async fn test_session_update_and_delete() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();
    adapter
        .create_session(session("tok1", &user.id))
        .await
        .unwrap();
    let extended = base_time() + Duration::days(30);

    let updated = adapter
        .update_session(SessionUpdate {
            session_token: "tok1".to_string(),
            user_id: None,
            expires: Some(extended),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.expires, extended);
    assert_eq!(updated.user_id, user.id);

    adapter.delete_session("tok1").await.unwrap();
    assert_eq!(adapter.get_session_and_user("tok1").await.unwrap(), None);
    assert!(mock.records("Session").is_empty());
}

#[tokio::test]
async fn test_verification_token_single_use_over_http() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    let token = verification_token("ana@x.com", "magic-123");

    let created = adapter
        .create_verification_token(token.clone())
        .await
        .unwrap();
    assert_eq!(created, Some(token.clone()));

    let key = VerificationTokenKey::new("ana@x.com", "magic-123");
    assert_eq!(
        adapter.use_verification_token(&key).await.unwrap(),
        Some(token)
    );
    assert_eq!(adapter.use_verification_token(&key).await.unwrap(), None);
    assert!(mock.records("Verification Token").is_empty());
}

#[tokio::test]
async fn test_rate_limit_surfaces_as_error() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    mock.fail_next(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_REACHED", "Slow down");

    let result = adapter.get_user_by_email("ana@x.com").await;

    assert!(result.unwrap_err().is_rate_limited());
}

/// A misnamed table must fail loudly instead of looking like an absent row
#[tokio::test]
async fn test_missing_table_is_an_error() {
    let mock = MockAirtable::start().await;
    let adapter = adapter_for(&mock);
    let user = adapter
        .create_user(new_user("Ana", "ana@x.com"))
        .await
        .unwrap();

    mock.fail_next(
        StatusCode::NOT_FOUND,
        "TABLE_NOT_FOUND",
        "Could not find table Usr in application appTestBase",
    );
    let lookup = adapter.get_user(&user.id).await;

    match lookup {
        Err(AdapterError::Model(ModelError::Store(StoreError::Api { status, kind, .. }))) => {
            assert_eq!(status, 404);
            assert_eq!(kind, "TABLE_NOT_FOUND");
        }
        other => panic!("Expected a table error, got {other:?}"),
    }

    mock.fail_next(StatusCode::NOT_FOUND, "TABLE_NOT_FOUND", "Could not find table");
    let update = adapter
        .update_user(UserUpdate {
            id: user.id.clone(),
            name: Some("Ana B".to_string()),
            ..Default::default()
        })
        .await;
    assert!(update.is_err());

    // The user row was never touched
    assert_eq!(mock.records("User")[0]["fields"]["name"], json!("Ana"));
}

//! Walks through a sign-in lifecycle against an Airtable base
//!
//! With `AIRTABLE_API_KEY` and `AIRTABLE_BASE_ID` set (directly or in `.env`)
//! the demo talks to the real base; otherwise it runs on the in-memory store.

use airtable_auth_adapter::{
    Account, Adapter, AirtableAdapter, NewUser, ProviderAccountId, Session, SessionUpdate,
    VerificationToken, VerificationTokenKey,
};
use chrono::{Duration, Utc};
use dotenvy::dotenv;

mod tracing_setup;
use tracing_setup::init_tracing;

fn build_adapter() -> Result<AirtableAdapter, Box<dyn std::error::Error>> {
    if std::env::var("AIRTABLE_API_KEY").is_ok() {
        tracing::info!("Using the Airtable base from the environment");
        Ok(AirtableAdapter::from_env()?)
    } else {
        tracing::warn!("AIRTABLE_API_KEY is not set, falling back to the in-memory store");
        Ok(AirtableAdapter::in_memory())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_airtable");

    let adapter = build_adapter()?;

    // Unique per run so repeated runs against a real base do not collide
    let run_id = uuid::Uuid::new_v4().simple().to_string();
    let email = format!("ana+{}@example.com", &run_id[..8]);
    let now = Utc::now();

    let user = adapter
        .create_user(NewUser {
            name: Some("Ana".to_string()),
            email: email.clone(),
            ..Default::default()
        })
        .await?;
    tracing::info!(user_id = %user.id, email = %user.email, "Created user");

    let key = ProviderAccountId::new("github", run_id.clone());
    adapter
        .link_account(Account {
            user_id: user.id.clone(),
            account_type: "oauth".to_string(),
            provider: key.provider.clone(),
            provider_account_id: key.provider_account_id.clone(),
            access_token: Some("demo-access-token".to_string()),
            token_type: Some("bearer".to_string()),
            ..Default::default()
        })
        .await?;
    let by_account = adapter.get_user_by_account(&key).await?;
    tracing::info!(found = by_account.is_some(), "Looked up user by provider account");

    let session_token = format!("session-{run_id}");
    adapter
        .create_session(Session {
            session_token: session_token.clone(),
            user_id: user.id.clone(),
            expires: now + Duration::hours(1),
        })
        .await?;

    if let Some(found) = adapter.get_session_and_user(&session_token).await? {
        tracing::info!(
            user = %found.user.email,
            expires = %found.session.expires,
            "Session resolved"
        );
    }

    let extended = adapter
        .update_session(SessionUpdate {
            session_token: session_token.clone(),
            user_id: None,
            expires: Some(now + Duration::days(30)),
        })
        .await?;
    tracing::info!(expires = ?extended.map(|s| s.expires), "Extended session");

    let token = format!("verify-{run_id}");
    adapter
        .create_verification_token(VerificationToken {
            identifier: email.clone(),
            token: token.clone(),
            expires: now + Duration::minutes(15),
        })
        .await?;
    let token_key = VerificationTokenKey::new(email.clone(), token);
    let first = adapter.use_verification_token(&token_key).await?;
    let second = adapter.use_verification_token(&token_key).await?;
    tracing::info!(
        first_use = first.is_some(),
        second_use = second.is_some(),
        "Consumed verification token"
    );

    adapter.delete_session(&session_token).await?;
    adapter.delete_user(&user.id).await?;
    tracing::info!(
        remaining = adapter.get_user(&user.id).await?.is_some(),
        "Deleted user with sessions and accounts"
    );

    Ok(())
}

//! Integration tests for the memory-backed identity provider.

use tapster_core::identity::{
    Claims, IdentityError, IdentityProvider, NewIdentity,
};
use tapster_core::models::user::Role;
use tapster_identity::InMemoryIdentityProvider;

fn new_identity(email: &str) -> NewIdentity {
    NewIdentity {
        email: email.into(),
        password: "correct-horse-battery".into(),
        display_name: "Test User".into(),
    }
}

#[tokio::test]
async fn create_and_find_by_email() {
    let provider = InMemoryIdentityProvider::new();

    let record = provider
        .create_user(new_identity("alice@example.com"))
        .await
        .unwrap();
    assert_eq!(record.email, "alice@example.com");
    assert_eq!(record.display_name.as_deref(), Some("Test User"));

    let found = provider.find_by_email("alice@example.com").await.unwrap();
    assert_eq!(found.id, record.id);

    let missing = provider.find_by_email("nobody@example.com").await;
    assert!(matches!(missing, Err(IdentityError::NotFound(_))));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let provider = InMemoryIdentityProvider::new();
    provider
        .create_user(new_identity("alice@example.com"))
        .await
        .unwrap();

    let err = provider
        .create_user(new_identity("alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::EmailTaken(_)));
}

#[tokio::test]
async fn passwords_are_stored_hashed_and_verifiable() {
    let provider = InMemoryIdentityProvider::new();
    provider
        .create_user(new_identity("alice@example.com"))
        .await
        .unwrap();

    assert!(
        provider
            .verify_password("alice@example.com", "correct-horse-battery")
            .unwrap()
    );
    assert!(
        !provider
            .verify_password("alice@example.com", "wrong")
            .unwrap()
    );
}

#[tokio::test]
async fn claims_default_empty_and_update_in_place() {
    let provider = InMemoryIdentityProvider::new();
    let record = provider
        .create_user(new_identity("owner@example.com"))
        .await
        .unwrap();

    assert_eq!(provider.claims(record.id), Some(Claims::default()));

    provider
        .set_claims(record.id, Claims::for_role(Role::Owner))
        .await
        .unwrap();
    let claims = provider.claims(record.id).unwrap();
    assert!(claims.store_owner && !claims.admin && !claims.store_manager);

    let err = provider
        .set_claims(uuid::Uuid::new_v4(), Claims::for_role(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::NotFound(_)));
}

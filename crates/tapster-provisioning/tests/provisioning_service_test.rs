//! Integration tests for the provisioning service: in-memory SurrealDB
//! repositories plus the memory-backed identity provider.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use tapster_core::error::TapsterError;
use tapster_core::hooks::CaseFoldSync;
use tapster_core::identity::{IdentityError, IdentityProvider, NewIdentity};
use tapster_core::models::store::{GeoPoint, NewStore, RatingSummary};
use tapster_core::models::user::{NewUser, Role};
use tapster_core::repository::{
    AdminLogRepository, Pagination, StoreRepository, UserRepository,
};
use tapster_db::repository::{
    SurrealAdminLogRepository, SurrealStoreRepository, SurrealUserRepository,
};
use tapster_identity::InMemoryIdentityProvider;
use tapster_provisioning::{Caller, CreateAccountInput, ProvisioningConfig, ProvisioningService};

type Db = surrealdb::engine::local::Db;
type Service = ProvisioningService<
    Arc<InMemoryIdentityProvider>,
    SurrealUserRepository<Db>,
    SurrealStoreRepository<Db>,
    SurrealAdminLogRepository<Db>,
>;

struct Harness {
    service: Service,
    identity: Arc<InMemoryIdentityProvider>,
    users: SurrealUserRepository<Db>,
    stores: SurrealStoreRepository<Db>,
    logs: SurrealAdminLogRepository<Db>,
    admin_id: Uuid,
}

fn bare_store(id: &str, name: &str) -> NewStore {
    NewStore {
        id: id.into(),
        name: name.into(),
        name_lower: name.to_lowercase(),
        category: vec![],
        cuisine_types: vec![],
        contact_number: String::new(),
        location: GeoPoint::default(),
        ratings: RatingSummary::default(),
        menus: vec![],
        business_hours: vec![],
        happy_hours: vec![],
        is_24_hours: false,
        owner_id: None,
        menu_categories: vec![],
    }
}

/// Spin up an in-memory deployment: migrations, seeded stores s1/s2/s3,
/// and a pre-existing admin account to act as the first caller.
async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tapster_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let stores = SurrealStoreRepository::with_hooks(db.clone(), vec![Box::new(CaseFoldSync)]);
    let logs = SurrealAdminLogRepository::new(db.clone());
    let identity = Arc::new(InMemoryIdentityProvider::new());

    stores
        .create_all(vec![
            bare_store("s1", "Cafe ABC"),
            bare_store("s2", "Taproom"),
            bare_store("s3", "Third Place"),
        ])
        .await
        .unwrap();

    let admin_id = Uuid::new_v4();
    users
        .create(NewUser {
            id: admin_id,
            email: "root-admin@example.com".into(),
            display_name: "Root Admin".into(),
            role: Role::Admin,
            managed_stores: vec![],
            owned_stores: vec![],
            created_by: admin_id,
        })
        .await
        .unwrap();

    let service = ProvisioningService::new(
        identity.clone(),
        users.clone(),
        stores.clone(),
        logs.clone(),
        ProvisioningConfig::default(),
    );

    Harness {
        service,
        identity,
        users,
        stores,
        logs,
        admin_id,
    }
}

fn account_input(email: &str, store_ids: Option<&[&str]>) -> CreateAccountInput {
    CreateAccountInput {
        email: email.into(),
        password: "super-secret-pass".into(),
        display_name: "New Operator".into(),
        store_ids: store_ids.map(|ids| ids.iter().map(|s| s.to_string()).collect()),
    }
}

#[tokio::test]
async fn unauthenticated_caller_is_rejected_with_no_side_effects() {
    let h = setup().await;

    let err = h
        .service
        .create_admin(&Caller::anonymous(), account_input("new@example.com", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unauthenticated");

    let lookup = h.identity.find_by_email("new@example.com").await;
    assert!(matches!(lookup, Err(IdentityError::NotFound(_))));
}

#[tokio::test]
async fn caller_without_operator_record_is_denied() {
    let h = setup().await;

    let err = h
        .service
        .create_admin(
            &Caller::authenticated(Uuid::new_v4()),
            account_input("new@example.com", None),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "permission-denied");
}

#[tokio::test]
async fn admin_creates_admin_with_claims_and_audit_trail() {
    let h = setup().await;
    let caller = Caller::authenticated(h.admin_id);

    let account = h
        .service
        .create_admin(&caller, account_input("second-admin@example.com", None))
        .await
        .unwrap();
    assert_eq!(account.role, Role::Admin);
    assert!(account.owned_stores.is_empty() && account.managed_stores.is_empty());

    // Identity exists and carries exactly the admin claim.
    let identity = h
        .identity
        .find_by_email("second-admin@example.com")
        .await
        .unwrap();
    assert_eq!(identity.id, account.id);
    let claims = h.identity.claims(account.id).unwrap();
    assert!(claims.admin && !claims.store_owner && !claims.store_manager);

    // User document persisted with creator id.
    let user = h.users.get_by_id(account.id).await.unwrap();
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.created_by, Some(h.admin_id));

    // One admin-log entry for the action.
    let page = h.logs.list_recent(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].action, "create_admin_account");
    assert_eq!(page.items[0].target_id, account.id);
    assert_eq!(page.items[0].actor_id, h.admin_id);
}

#[tokio::test]
async fn non_admin_cannot_create_admin_or_owner_and_nothing_is_written() {
    let h = setup().await;
    let admin = Caller::authenticated(h.admin_id);

    let owner = h
        .service
        .create_store_owner(&admin, account_input("owner@example.com", Some(&["s1"])))
        .await
        .unwrap();
    let owner_caller = Caller::authenticated(owner.id);

    for result in [
        h.service
            .create_admin(&owner_caller, account_input("evil@example.com", None))
            .await,
        h.service
            .create_store_owner(
                &owner_caller,
                account_input("evil@example.com", Some(&["s2"])),
            )
            .await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.code(), "permission-denied");
    }

    // The rejected email never reached the identity provider, and s2
    // was never touched.
    assert!(h.identity.find_by_email("evil@example.com").await.is_err());
    let s2 = h.stores.get_by_id(&"s2".to_string()).await.unwrap();
    assert!(s2.owner_id.is_none());
}

#[tokio::test]
async fn owner_creation_synchronizes_store_back_references() {
    let h = setup().await;
    let caller = Caller::authenticated(h.admin_id);

    let account = h
        .service
        .create_store_owner(&caller, account_input("owner@example.com", Some(&["s1", "s2"])))
        .await
        .unwrap();

    assert_eq!(account.role, Role::Owner);
    assert_eq!(account.owned_stores, vec!["s1".to_string(), "s2".to_string()]);

    let user = h.users.get_by_id(account.id).await.unwrap();
    assert_eq!(user.owned_stores, vec!["s1".to_string(), "s2".to_string()]);
    assert!(user.managed_stores.is_empty());

    for store_id in ["s1", "s2"] {
        let store = h.stores.get_by_id(&store_id.to_string()).await.unwrap();
        assert_eq!(store.owner_id, Some(account.id));
    }

    let claims = h.identity.claims(account.id).unwrap();
    assert!(claims.store_owner && !claims.admin);
}

#[tokio::test]
async fn owner_creation_without_store_ids_is_invalid_argument() {
    let h = setup().await;
    let caller = Caller::authenticated(h.admin_id);

    let err = h
        .service
        .create_store_owner(&caller, account_input("owner@example.com", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid-argument");
    assert!(h.identity.find_by_email("owner@example.com").await.is_err());
}

#[tokio::test]
async fn owner_delegates_manager_within_owned_stores() {
    let h = setup().await;
    let admin = Caller::authenticated(h.admin_id);

    let owner = h
        .service
        .create_store_owner(&admin, account_input("owner@example.com", Some(&["s1", "s2"])))
        .await
        .unwrap();

    let manager = h
        .service
        .create_store_manager(
            &Caller::authenticated(owner.id),
            account_input("manager@example.com", Some(&["s1"])),
        )
        .await
        .unwrap();

    assert_eq!(manager.role, Role::Manager);
    assert_eq!(manager.managed_stores, vec!["s1".to_string()]);

    let s1 = h.stores.get_by_id(&"s1".to_string()).await.unwrap();
    assert!(s1.managers.contains(&manager.id));

    let claims = h.identity.claims(manager.id).unwrap();
    assert!(claims.store_manager && !claims.admin && !claims.store_owner);
}

#[tokio::test]
async fn owner_delegation_outside_owned_stores_rejects_whole_request() {
    let h = setup().await;
    let admin = Caller::authenticated(h.admin_id);

    let owner = h
        .service
        .create_store_owner(&admin, account_input("owner@example.com", Some(&["s1", "s2"])))
        .await
        .unwrap();

    // s3 is not owned by the caller: the whole request is rejected, not
    // filtered down to s1.
    let err = h
        .service
        .create_store_manager(
            &Caller::authenticated(owner.id),
            account_input("manager@example.com", Some(&["s1", "s3"])),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "permission-denied");

    let s1 = h.stores.get_by_id(&"s1".to_string()).await.unwrap();
    assert!(s1.managers.is_empty());
    assert!(h.identity.find_by_email("manager@example.com").await.is_err());
}

#[tokio::test]
async fn manager_creation_without_store_ids_is_invalid_argument() {
    let h = setup().await;
    let caller = Caller::authenticated(h.admin_id);

    let err = h
        .service
        .create_store_manager(&caller, account_input("manager@example.com", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid-argument");
}

#[tokio::test]
async fn failed_store_update_does_not_fail_owner_creation() {
    let h = setup().await;
    let caller = Caller::authenticated(h.admin_id);

    // "ghost" does not exist; the cross-reference update is logged and
    // skipped while the account creation still succeeds.
    let account = h
        .service
        .create_store_owner(
            &caller,
            account_input("owner@example.com", Some(&["s1", "ghost"])),
        )
        .await
        .unwrap();

    let s1 = h.stores.get_by_id(&"s1".to_string()).await.unwrap();
    assert_eq!(s1.owner_id, Some(account.id));

    let user = h.users.get_by_id(account.id).await.unwrap();
    assert_eq!(
        user.owned_stores,
        vec!["s1".to_string(), "ghost".to_string()]
    );
}

#[tokio::test]
async fn set_initial_admin_grants_claim_and_merges_document() {
    let h = setup().await;

    // The initial admin identity exists at the provider but has no
    // operator record yet.
    let record = h
        .identity
        .create_user(NewIdentity {
            email: ProvisioningConfig::default().initial_admin_email,
            password: "bootstrap-password".into(),
            display_name: "Bootstrap Admin".into(),
        })
        .await
        .unwrap();

    let user = h.service.set_initial_admin().await.unwrap();
    assert_eq!(user.id, record.id);
    assert_eq!(user.role, Role::Admin);

    let claims = h.identity.claims(record.id).unwrap();
    assert!(claims.admin);

    // Running it again is harmless: same document, same claim.
    let again = h.service.set_initial_admin().await.unwrap();
    assert_eq!(again.id, record.id);
    assert_eq!(again.role, Role::Admin);
}

#[tokio::test]
async fn set_initial_admin_fails_when_identity_is_missing() {
    let h = setup().await;
    let err = h.service.set_initial_admin().await.unwrap_err();
    assert_eq!(err.code(), "internal");
}

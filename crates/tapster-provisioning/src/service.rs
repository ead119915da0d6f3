//! Account provisioning service — orchestrates guard checks, identity
//! creation, and document writes for the three account tiers.
//!
//! Step ordering is load-bearing: the identity is created before any
//! document write, so a user document can never reference a nonexistent
//! identity. Failures after identity creation surface as internal-kind
//! errors and leave the created identity in place. There is no
//! compensating rollback; the condition is logged for manual
//! remediation.

use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use tapster_core::error::{TapsterError, TapsterResult};
use tapster_core::identity::{Claims, IdentityProvider, NewIdentity};
use tapster_core::models::admin_log::NewAdminLogEntry;
use tapster_core::models::store::StoreId;
use tapster_core::models::user::{NewUser, Role, User};
use tapster_core::repository::{AdminLogRepository, StoreRepository, UserRepository};

use crate::config::ProvisioningConfig;
use crate::guard::{self, ProvisioningAction};

/// The identity on whose behalf an operation runs. `user_id` is `None`
/// for unauthenticated callers.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Option<Uuid>,
}

impl Caller {
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

/// Input for the three account-creation operations. `store_ids` is
/// required for owner and manager accounts and ignored for admins.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub email: String,
    /// Raw password, forwarded to the identity provider; never stored
    /// by this system.
    pub password: String,
    pub display_name: String,
    pub store_ids: Option<Vec<StoreId>>,
}

/// Summary of a freshly provisioned account.
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub owned_stores: Vec<StoreId>,
    pub managed_stores: Vec<StoreId>,
}

impl From<User> for ProvisionedAccount {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name.unwrap_or_default(),
            role: user.role,
            owned_stores: user.owned_stores,
            managed_stores: user.managed_stores,
        }
    }
}

/// Account provisioning service.
///
/// Generic over the identity provider and repository implementations so
/// the orchestration layer has no dependency on the database crate.
pub struct ProvisioningService<I, U, S, L>
where
    I: IdentityProvider,
    U: UserRepository,
    S: StoreRepository,
    L: AdminLogRepository,
{
    identity: I,
    users: U,
    stores: S,
    logs: L,
    config: ProvisioningConfig,
}

impl<I, U, S, L> ProvisioningService<I, U, S, L>
where
    I: IdentityProvider,
    U: UserRepository,
    S: StoreRepository,
    L: AdminLogRepository,
{
    pub fn new(identity: I, users: U, stores: S, logs: L, config: ProvisioningConfig) -> Self {
        Self {
            identity,
            users,
            stores,
            logs,
            config,
        }
    }

    /// Authenticate the caller and load their operator record. A caller
    /// with no user document has no role and is denied.
    async fn load_actor(&self, caller: &Caller) -> TapsterResult<User> {
        let actor_id = caller.user_id.ok_or(TapsterError::Unauthenticated)?;
        self.users.get_by_id(actor_id).await.map_err(|e| match e {
            TapsterError::NotFound { .. } => TapsterError::PermissionDenied {
                reason: "caller has no operator record".into(),
            },
            other => other,
        })
    }

    /// Create an administrator account.
    pub async fn create_admin(
        &self,
        caller: &Caller,
        input: CreateAccountInput,
    ) -> TapsterResult<ProvisionedAccount> {
        // 1. Authenticate and authorize before any external call.
        let actor = self.load_actor(caller).await?;
        guard::authorize(&actor, &ProvisioningAction::CreateAdmin)?;

        // 2. Create the identity first; a document must never
        //    reference a nonexistent identity.
        let identity = self
            .identity
            .create_user(NewIdentity {
                email: input.email.clone(),
                password: input.password,
                display_name: input.display_name.clone(),
            })
            .await?;

        // 3. Attach the admin claim.
        self.identity
            .set_claims(identity.id, Claims::for_role(Role::Admin))
            .await?;

        // 4. Persist the user document.
        let user = self
            .users
            .create(NewUser {
                id: identity.id,
                email: input.email,
                display_name: input.display_name,
                role: Role::Admin,
                managed_stores: vec![],
                owned_stores: vec![],
                created_by: actor.id,
            })
            .await?;

        // 5. Record the action in the admin log.
        self.logs
            .append(NewAdminLogEntry {
                action: "create_admin_account".into(),
                target_id: user.id,
                actor_id: actor.id,
                details: json!({
                    "email": user.email,
                    "display_name": user.display_name,
                }),
            })
            .await?;

        Ok(user.into())
    }

    /// Create a store owner account and point each target store's owner
    /// back-reference at the new user.
    pub async fn create_store_owner(
        &self,
        caller: &Caller,
        input: CreateAccountInput,
    ) -> TapsterResult<ProvisionedAccount> {
        // 1. Authenticate and authorize before any external call.
        let actor = self.load_actor(caller).await?;
        guard::authorize(&actor, &ProvisioningAction::CreateOwner)?;

        let store_ids = input.store_ids.ok_or_else(|| TapsterError::InvalidArgument {
            message: "a list of store ids is required".into(),
        })?;

        // 2. Identity, then claim, then document, in the same order
        //    as admin creation.
        let identity = self
            .identity
            .create_user(NewIdentity {
                email: input.email.clone(),
                password: input.password,
                display_name: input.display_name.clone(),
            })
            .await?;

        self.identity
            .set_claims(identity.id, Claims::for_role(Role::Owner))
            .await?;

        let user = self
            .users
            .create(NewUser {
                id: identity.id,
                email: input.email,
                display_name: input.display_name,
                role: Role::Owner,
                managed_stores: vec![],
                owned_stores: store_ids.clone(),
                created_by: actor.id,
            })
            .await?;

        // 3. Store cross-references. Sequential and non-atomic with the
        //    user document; a store that fails to update is logged and
        //    skipped, the account itself is already provisioned.
        for store_id in &store_ids {
            if let Err(err) = self.stores.set_owner(store_id, user.id).await {
                warn!(
                    store_id = %store_id,
                    user_id = %user.id,
                    error = %err,
                    "failed to update store owner back-reference"
                );
            }
        }

        Ok(user.into())
    }

    /// Create a store manager account and add the new user to each
    /// target store's manager set.
    pub async fn create_store_manager(
        &self,
        caller: &Caller,
        input: CreateAccountInput,
    ) -> TapsterResult<ProvisionedAccount> {
        // 1. Authenticate and authorize before any external call. The
        //    guard sees the target stores so owner callers are held to
        //    their own stores; a missing list is vacuously in scope and
        //    rejected as invalid-argument right after.
        let actor = self.load_actor(caller).await?;
        guard::authorize(
            &actor,
            &ProvisioningAction::CreateManager {
                store_ids: input.store_ids.as_deref().unwrap_or(&[]),
            },
        )?;

        let store_ids = input.store_ids.ok_or_else(|| TapsterError::InvalidArgument {
            message: "a list of store ids is required".into(),
        })?;

        // 2. Identity, then claim, then document.
        let identity = self
            .identity
            .create_user(NewIdentity {
                email: input.email.clone(),
                password: input.password,
                display_name: input.display_name.clone(),
            })
            .await?;

        self.identity
            .set_claims(identity.id, Claims::for_role(Role::Manager))
            .await?;

        let user = self
            .users
            .create(NewUser {
                id: identity.id,
                email: input.email,
                display_name: input.display_name,
                role: Role::Manager,
                managed_stores: store_ids.clone(),
                owned_stores: vec![],
                created_by: actor.id,
            })
            .await?;

        // 3. Manager-set cross-references; set-union per store, so
        //    concurrent provisioning against the same store commutes.
        for store_id in &store_ids {
            if let Err(err) = self.stores.add_manager(store_id, user.id).await {
                warn!(
                    store_id = %store_id,
                    user_id = %user.id,
                    error = %err,
                    "failed to add manager to store"
                );
            }
        }

        Ok(user.into())
    }

    /// Bootstrap path: grant the configured initial-admin email the
    /// admin claim and merge-upsert its user document. Trusted
    /// operational tool with no caller authorization; exposure is gated
    /// at deployment time by the server binary.
    pub async fn set_initial_admin(&self) -> TapsterResult<User> {
        let email = self.config.initial_admin_email.clone();

        let record = self.identity.find_by_email(&email).await.map_err(|e| {
            error!(email = %email, error = %e, "initial admin identity lookup failed");
            TapsterError::from(e)
        })?;

        self.identity
            .set_claims(record.id, Claims::for_role(Role::Admin))
            .await?;

        self.users.upsert_admin(record.id, &record.email).await
    }
}

//! Role authorization guard.
//!
//! Pure function of the caller's stored state and the requested action;
//! performs no I/O and has no side effects. Every provisioning
//! operation consults the guard before any external call is made.

use tapster_core::error::{TapsterError, TapsterResult};
use tapster_core::models::store::StoreId;
use tapster_core::models::user::{Role, User};

/// A provisioning action to be authorized.
#[derive(Debug, Clone)]
pub enum ProvisioningAction<'a> {
    CreateAdmin,
    CreateOwner,
    /// Manager creation names its target stores so owner callers can be
    /// restricted to stores they hold.
    CreateManager { store_ids: &'a [StoreId] },
}

fn deny(reason: &str) -> TapsterError {
    TapsterError::PermissionDenied {
        reason: reason.into(),
    }
}

/// Decide whether `caller` may perform `action`.
///
/// Rules are evaluated in order; the owned-store check for
/// owner-initiated manager creation is all-or-nothing: one foreign
/// store id rejects the whole request.
pub fn authorize(caller: &User, action: &ProvisioningAction<'_>) -> TapsterResult<()> {
    match action {
        ProvisioningAction::CreateAdmin => match caller.role {
            Role::Admin => Ok(()),
            _ => Err(deny("only administrators may create admin accounts")),
        },
        ProvisioningAction::CreateOwner => match caller.role {
            Role::Admin => Ok(()),
            _ => Err(deny("only administrators may create store owner accounts")),
        },
        ProvisioningAction::CreateManager { store_ids } => match caller.role {
            Role::Admin => Ok(()),
            Role::Owner => {
                if store_ids.iter().all(|id| caller.owned_stores.contains(id)) {
                    Ok(())
                } else {
                    Err(deny(
                        "store owners may only create managers for stores they own",
                    ))
                }
            }
            Role::Manager => Err(deny(
                "only administrators or store owners may create manager accounts",
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn caller(role: Role, owned: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            email: "caller@example.com".into(),
            display_name: Some("Caller".into()),
            role,
            managed_stores: vec![],
            owned_stores: owned.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    fn ids(raw: &[&str]) -> Vec<StoreId> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_admins_create_admins_and_owners() {
        let admin = caller(Role::Admin, &[]);
        let owner = caller(Role::Owner, &["s1"]);
        let manager = caller(Role::Manager, &[]);

        assert!(authorize(&admin, &ProvisioningAction::CreateAdmin).is_ok());
        assert!(authorize(&admin, &ProvisioningAction::CreateOwner).is_ok());

        for other in [&owner, &manager] {
            for action in [ProvisioningAction::CreateAdmin, ProvisioningAction::CreateOwner] {
                let err = authorize(other, &action).unwrap_err();
                assert!(matches!(err, TapsterError::PermissionDenied { .. }));
            }
        }
    }

    #[test]
    fn admins_create_managers_for_any_store() {
        let admin = caller(Role::Admin, &[]);
        let store_ids = ids(&["s1", "s9"]);
        assert!(
            authorize(
                &admin,
                &ProvisioningAction::CreateManager {
                    store_ids: &store_ids
                }
            )
            .is_ok()
        );
    }

    #[test]
    fn owners_are_limited_to_their_own_stores() {
        let owner = caller(Role::Owner, &["s1", "s2"]);

        let owned = ids(&["s1", "s2"]);
        assert!(
            authorize(&owner, &ProvisioningAction::CreateManager { store_ids: &owned }).is_ok()
        );

        // One foreign id rejects the whole request.
        let mixed = ids(&["s1", "s3"]);
        let err =
            authorize(&owner, &ProvisioningAction::CreateManager { store_ids: &mixed }).unwrap_err();
        assert!(matches!(err, TapsterError::PermissionDenied { .. }));
    }

    #[test]
    fn managers_create_nothing() {
        let manager = caller(Role::Manager, &[]);
        let store_ids = ids(&["s1"]);
        let err = authorize(
            &manager,
            &ProvisioningAction::CreateManager {
                store_ids: &store_ids,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TapsterError::PermissionDenied { .. }));
    }
}

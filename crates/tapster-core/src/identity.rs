//! Identity provider trait seam.
//!
//! Credentials and authentication tokens live with an external identity
//! provider; this system only ever creates identities, attaches claims,
//! and resolves an identity by email. The trait is the whole gateway:
//! implementations add no logic beyond parameter passing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::TapsterError;
use crate::models::user::Role;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity not found for {0}")]
    NotFound(String),

    #[error("an identity already exists for {0}")]
    EmailTaken(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl From<IdentityError> for TapsterError {
    fn from(err: IdentityError) -> Self {
        TapsterError::Identity(err.to_string())
    }
}

/// Claims attached to an identity-provider record. Consulted by
/// downstream authorization checks outside this system; exactly the flag
/// matching the provisioned role is set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub admin: bool,
    pub store_owner: bool,
    pub store_manager: bool,
}

impl Claims {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Claims {
                admin: true,
                ..Default::default()
            },
            Role::Owner => Claims {
                store_owner: true,
                ..Default::default()
            },
            Role::Manager => Claims {
                store_manager: true,
                ..Default::default()
            },
        }
    }
}

/// Request to mint a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    /// Raw password; the provider owns hashing and storage.
    pub password: String,
    pub display_name: String,
}

/// An identity-provider record as visible to this system.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

pub trait IdentityProvider: Send + Sync {
    fn create_user(
        &self,
        input: NewIdentity,
    ) -> impl Future<Output = Result<IdentityRecord, IdentityError>> + Send;

    fn set_claims(
        &self,
        id: Uuid,
        claims: Claims,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<IdentityRecord, IdentityError>> + Send;
}

impl<P: IdentityProvider> IdentityProvider for std::sync::Arc<P> {
    async fn create_user(&self, input: NewIdentity) -> Result<IdentityRecord, IdentityError> {
        (**self).create_user(input).await
    }

    async fn set_claims(&self, id: Uuid, claims: Claims) -> Result<(), IdentityError> {
        (**self).set_claims(id, claims).await
    }

    async fn find_by_email(&self, email: &str) -> Result<IdentityRecord, IdentityError> {
        (**self).find_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_set_exactly_one_flag_per_role() {
        let admin = Claims::for_role(Role::Admin);
        assert!(admin.admin && !admin.store_owner && !admin.store_manager);

        let owner = Claims::for_role(Role::Owner);
        assert!(!owner.admin && owner.store_owner && !owner.store_manager);

        let manager = Claims::for_role(Role::Manager);
        assert!(!manager.admin && !manager.store_owner && manager.store_manager);
    }
}

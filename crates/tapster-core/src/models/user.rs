//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::store::StoreId;

/// Operator role. Admins manage the platform, owners hold stores,
/// managers run day-to-day operations of delegated stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the identity provider, not generated locally.
    pub id: Uuid,
    pub email: String,
    /// Absent for accounts upserted through the bootstrap path.
    pub display_name: Option<String>,
    pub role: Role,
    /// Stores delegated to this user. Non-empty only for managers.
    pub managed_stores: Vec<StoreId>,
    /// Stores held by this user. Non-empty only for owners.
    pub owned_stores: Vec<StoreId>,
    pub created_at: DateTime<Utc>,
    /// The provisioning caller, if the account was created through the
    /// provisioning service rather than the bootstrap path.
    pub created_by: Option<Uuid>,
}

/// Input shape for persisting a freshly provisioned user document.
/// The identity must already exist; `id` is the provider-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub managed_stores: Vec<StoreId>,
    pub owned_stores: Vec<StoreId>,
    pub created_by: Uuid,
}

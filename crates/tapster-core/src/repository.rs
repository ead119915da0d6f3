//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations sit on a
//! transactional document store; multi-document atomicity is an
//! implementation concern surfaced through `create_all`.

use uuid::Uuid;

use crate::error::TapsterResult;
use crate::models::{
    admin_log::{AdminLogEntry, NewAdminLogEntry},
    store::{NewStore, Store, StoreId},
    user::{NewUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    /// Persist a freshly provisioned user document under its
    /// provider-assigned id.
    fn create(&self, input: NewUser) -> impl Future<Output = TapsterResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TapsterResult<User>> + Send;

    /// Bootstrap merge-upsert: grant the admin role to an existing or new
    /// user document. Email, role, and creation timestamp are overwritten;
    /// any other fields already on the document are preserved.
    fn upsert_admin(
        &self,
        id: Uuid,
        email: &str,
    ) -> impl Future<Output = TapsterResult<User>> + Send;
}

pub trait StoreRepository: Send + Sync {
    /// Persist a batch of normalized store documents as one atomic unit:
    /// either every document commits or none become visible.
    fn create_all(&self, stores: Vec<NewStore>) -> impl Future<Output = TapsterResult<()>> + Send;

    fn get_by_id(&self, id: &StoreId) -> impl Future<Output = TapsterResult<Store>> + Send;

    /// Point the store's owner back-reference at a user.
    fn set_owner(
        &self,
        id: &StoreId,
        owner_id: Uuid,
    ) -> impl Future<Output = TapsterResult<()>> + Send;

    /// Add a user to the store's manager set. Set-union semantics:
    /// idempotent and order-independent, safe under concurrent
    /// provisioning calls against the same store.
    fn add_manager(
        &self,
        id: &StoreId,
        manager_id: Uuid,
    ) -> impl Future<Output = TapsterResult<()>> + Send;

    /// Case-insensitive prefix lookup over the maintained search key.
    fn find_by_name_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = TapsterResult<Vec<Store>>> + Send;

    /// Recompute the search key for every store whose key is stale.
    /// Returns the number of stores updated; a second pass over an
    /// unchanged registry updates nothing.
    fn sync_search_keys(&self) -> impl Future<Output = TapsterResult<u64>> + Send;
}

/// Append-only admin action log.
pub trait AdminLogRepository: Send + Sync {
    /// Append a new entry. No update or delete operations exist.
    fn append(
        &self,
        input: NewAdminLogEntry,
    ) -> impl Future<Output = TapsterResult<AdminLogEntry>> + Send;

    /// Most recent entries first.
    fn list_recent(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TapsterResult<PaginatedResult<AdminLogEntry>>> + Send;
}

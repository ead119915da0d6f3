//! SurrealDB implementation of [`StoreRepository`].
//!
//! Store documents carry the import-allocated base-36 id as their
//! record id. Nested payloads (location, ratings, menus, hours windows)
//! are stored as FLEXIBLE objects and round-tripped through JSON.
//!
//! Post-write hooks: every mutating operation ends by re-reading the
//! affected document and evaluating the registered
//! [`StoreWriteHook`]s; returned mutations are applied directly,
//! without re-entering the hook dispatch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use tapster_core::error::TapsterResult;
use tapster_core::hooks::{StoreMutation, StoreWriteHook};
use tapster_core::models::store::{
    BusinessWindow, Category, GeoPoint, HappyHourWindow, MenuItem, NewStore, RatingSummary, Store,
    StoreId, search_key,
};
use tapster_core::repository::StoreRepository;

use crate::batch::WriteBatch;
use crate::error::DbError;

/// DB-side row struct for queries where the record id is already known.
#[derive(Debug, SurrealValue)]
struct StoreRow {
    name: String,
    name_lower: String,
    category: Vec<String>,
    cuisine_types: Vec<String>,
    contact_number: String,
    location: serde_json::Value,
    ratings: serde_json::Value,
    menus: serde_json::Value,
    business_hours: serde_json::Value,
    happy_hours: serde_json::Value,
    is_24_hours: bool,
    owner_id: Option<String>,
    managers: Vec<String>,
    menu_categories: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct StoreRowWithId {
    record_id: String,
    name: String,
    name_lower: String,
    category: Vec<String>,
    cuisine_types: Vec<String>,
    contact_number: String,
    location: serde_json::Value,
    ratings: serde_json::Value,
    menus: serde_json::Value,
    business_hours: serde_json::Value,
    happy_hours: serde_json::Value,
    is_24_hours: bool,
    owner_id: Option<String>,
    managers: Vec<String>,
    menu_categories: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Slim row for the search-key backfill scan.
#[derive(Debug, SurrealValue)]
struct SearchKeyRow {
    record_id: String,
    name: String,
    name_lower: String,
}

fn parse_categories(tags: Vec<String>) -> Result<Vec<Category>, DbError> {
    tags.into_iter()
        .map(|tag| {
            Category::parse(&tag).ok_or_else(|| DbError::Corrupt(format!("unknown category: {tag}")))
        })
        .collect()
}

fn parse_manager_ids(ids: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    ids.into_iter()
        .map(|s| {
            Uuid::parse_str(&s).map_err(|e| DbError::Corrupt(format!("invalid manager UUID: {e}")))
        })
        .collect()
}

fn from_json<T: serde::de::DeserializeOwned>(
    field: &'static str,
    value: serde_json::Value,
) -> Result<T, DbError> {
    serde_json::from_value(value).map_err(|e| DbError::Corrupt(format!("bad {field} payload: {e}")))
}

impl StoreRow {
    fn into_store(self, id: StoreId) -> Result<Store, DbError> {
        let owner_id = self
            .owner_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| DbError::Corrupt(format!("invalid owner UUID: {e}")))?;
        Ok(Store {
            id,
            name: self.name,
            name_lower: self.name_lower,
            category: parse_categories(self.category)?,
            cuisine_types: self.cuisine_types,
            contact_number: self.contact_number,
            location: from_json::<GeoPoint>("location", self.location)?,
            ratings: from_json::<RatingSummary>("ratings", self.ratings)?,
            menus: from_json::<Vec<MenuItem>>("menus", self.menus)?,
            business_hours: from_json::<Vec<BusinessWindow>>("business_hours", self.business_hours)?,
            happy_hours: from_json::<Vec<HappyHourWindow>>("happy_hours", self.happy_hours)?,
            is_24_hours: self.is_24_hours,
            owner_id,
            managers: parse_manager_ids(self.managers)?,
            menu_categories: self.menu_categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StoreRowWithId {
    fn try_into_store(self) -> Result<Store, DbError> {
        let id = self.record_id.clone();
        let row = StoreRow {
            name: self.name,
            name_lower: self.name_lower,
            category: self.category,
            cuisine_types: self.cuisine_types,
            contact_number: self.contact_number,
            location: self.location,
            ratings: self.ratings,
            menus: self.menus,
            business_hours: self.business_hours,
            happy_hours: self.happy_hours,
            is_24_hours: self.is_24_hours,
            owner_id: self.owner_id,
            managers: self.managers,
            menu_categories: self.menu_categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_store(id)
    }
}

/// Document content for a normalized store, as queued into a write
/// batch. Timestamps are left to the schema's `time::now()` defaults.
fn store_content(store: &NewStore) -> serde_json::Value {
    json!({
        "name": store.name,
        "name_lower": store.name_lower,
        "category": store.category.iter().map(Category::as_str).collect::<Vec<_>>(),
        "cuisine_types": store.cuisine_types,
        "contact_number": store.contact_number,
        "location": store.location,
        "ratings": store.ratings,
        "menus": store.menus,
        "business_hours": store.business_hours,
        "happy_hours": store.happy_hours,
        "is_24_hours": store.is_24_hours,
        "owner_id": store.owner_id.map(|u| u.to_string()),
        "managers": Vec::<String>::new(),
        "menu_categories": store.menu_categories,
    })
}

/// SurrealDB implementation of the Store repository.
#[derive(Clone)]
pub struct SurrealStoreRepository<C: Connection> {
    db: Surreal<C>,
    hooks: Arc<Vec<Box<dyn StoreWriteHook>>>,
}

impl<C: Connection> SurrealStoreRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            hooks: Arc::new(Vec::new()),
        }
    }

    /// Register post-write hooks; evaluated after every store write.
    pub fn with_hooks(db: Surreal<C>, hooks: Vec<Box<dyn StoreWriteHook>>) -> Self {
        Self {
            db,
            hooks: Arc::new(hooks),
        }
    }

    /// Evaluate registered hooks against the current state of a store
    /// and apply any mutations they produce. Mutations are written
    /// plainly; hooks are idempotent, so there is nothing to re-run.
    async fn run_hooks(&self, id: &StoreId) -> TapsterResult<()> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let store = self.get_by_id(id).await?;
        for hook in self.hooks.iter() {
            if let Some(mutation) = hook.after_write(&store) {
                debug!(store_id = %id, hook = hook.name(), "applying post-write mutation");
                match mutation {
                    StoreMutation::SetSearchKey(key) => {
                        self.db
                            .query(
                                "UPDATE type::record('store', $id) SET \
                                 name_lower = $name_lower RETURN NONE",
                            )
                            .bind(("id", id.clone()))
                            .bind(("name_lower", key))
                            .await
                            .map_err(DbError::from)?
                            .check()
                            .map_err(|e| DbError::Transaction(e.to_string()))?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<C: Connection> StoreRepository for SurrealStoreRepository<C> {
    async fn create_all(&self, stores: Vec<NewStore>) -> TapsterResult<()> {
        if stores.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for store in &stores {
            batch.create("store", &store.id, store_content(store));
        }
        batch.commit(&self.db).await?;

        for store in &stores {
            self.run_hooks(&store.id).await?;
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &StoreId) -> TapsterResult<Store> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('store', $id)")
            .bind(("id", id.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "store".into(),
            id: id.clone(),
        })?;

        Ok(row.into_store(id.clone())?)
    }

    async fn set_owner(&self, id: &StoreId, owner_id: Uuid) -> TapsterResult<()> {
        let result = self
            .db
            .query("UPDATE type::record('store', $id) SET owner_id = $owner_id")
            .bind(("id", id.clone()))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "store".into(),
                id: id.clone(),
            }
            .into());
        }

        self.run_hooks(id).await
    }

    async fn add_manager(&self, id: &StoreId, manager_id: Uuid) -> TapsterResult<()> {
        // array::union keeps the managers field a set: re-adding an
        // existing manager is a no-op, and concurrent additions commute.
        let result = self
            .db
            .query(
                "UPDATE type::record('store', $id) SET \
                 managers = array::union(managers, [$manager_id])",
            )
            .bind(("id", id.clone()))
            .bind(("manager_id", manager_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "store".into(),
                id: id.clone(),
            }
            .into());
        }

        self.run_hooks(id).await
    }

    async fn find_by_name_prefix(&self, prefix: &str) -> TapsterResult<Vec<Store>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM store \
                 WHERE string::starts_with(name_lower, $prefix) \
                 ORDER BY name_lower ASC",
            )
            .bind(("prefix", search_key(prefix)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StoreRowWithId> = result.take(0).map_err(DbError::from)?;
        let stores = rows
            .into_iter()
            .map(|row| row.try_into_store())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(stores)
    }

    async fn sync_search_keys(&self) -> TapsterResult<u64> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, name, name_lower FROM store")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SearchKeyRow> = result.take(0).map_err(DbError::from)?;

        let mut batch = WriteBatch::new();
        for row in &rows {
            let key = search_key(&row.name);
            if row.name_lower != key {
                batch.update_merge("store", &row.record_id, json!({ "name_lower": key }));
            }
        }

        let updated = batch.len() as u64;
        batch.commit(&self.db).await?;
        Ok(updated)
    }
}

//! SurrealDB implementation of [`AdminLogRepository`]. Append-only.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use tapster_core::error::TapsterResult;
use tapster_core::models::admin_log::{AdminLogEntry, NewAdminLogEntry};
use tapster_core::repository::{AdminLogRepository, PaginatedResult, Pagination};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AdminLogRow {
    action: String,
    target_id: String,
    actor_id: String,
    details: serde_json::Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AdminLogRowWithId {
    record_id: String,
    action: String,
    target_id: String,
    actor_id: String,
    details: serde_json::Value,
    timestamp: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(label: &'static str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid {label} UUID: {e}")))
}

impl AdminLogRow {
    fn into_entry(self, id: Uuid) -> Result<AdminLogEntry, DbError> {
        Ok(AdminLogEntry {
            id,
            action: self.action,
            target_id: parse_uuid("target", &self.target_id)?,
            actor_id: parse_uuid("actor", &self.actor_id)?,
            details: self.details,
            timestamp: self.timestamp,
        })
    }
}

impl AdminLogRowWithId {
    fn try_into_entry(self) -> Result<AdminLogEntry, DbError> {
        let id = parse_uuid("entry", &self.record_id)?;
        Ok(AdminLogEntry {
            id,
            action: self.action,
            target_id: parse_uuid("target", &self.target_id)?,
            actor_id: parse_uuid("actor", &self.actor_id)?,
            details: self.details,
            timestamp: self.timestamp,
        })
    }
}

/// SurrealDB implementation of the admin log repository.
#[derive(Clone)]
pub struct SurrealAdminLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdminLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AdminLogRepository for SurrealAdminLogRepository<C> {
    async fn append(&self, input: NewAdminLogEntry) -> TapsterResult<AdminLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('admin_log', $id) SET \
                 action = $action, \
                 target_id = $target_id, \
                 actor_id = $actor_id, \
                 details = $details",
            )
            .bind(("id", id_str.clone()))
            .bind(("action", input.action))
            .bind(("target_id", input.target_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("details", input.details))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let rows: Vec<AdminLogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "admin_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list_recent(
        &self,
        pagination: Pagination,
    ) -> TapsterResult<PaginatedResult<AdminLogEntry>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM admin_log GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin_log \
                 ORDER BY timestamp DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminLogRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

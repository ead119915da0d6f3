//! SurrealDB implementation of [`UserRepository`].
//!
//! User documents are keyed by the identity-provider uid, so every
//! operation addresses a known record id; there is no locally
//! generated key.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use tapster_core::error::TapsterResult;
use tapster_core::models::user::{NewUser, Role, User};
use tapster_core::repository::UserRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    display_name: Option<String>,
    role: String,
    managed_stores: Vec<String>,
    owned_stores: Vec<String>,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "admin" => Ok(Role::Admin),
        "owner" => Ok(Role::Owner),
        "manager" => Ok(Role::Manager),
        other => Err(DbError::Corrupt(format!("unknown user role: {other}"))),
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let created_by = self
            .created_by
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| DbError::Corrupt(format!("invalid creator UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            display_name: self.display_name,
            role: parse_role(&self.role)?,
            managed_stores: self.managed_stores,
            owned_stores: self.owned_stores,
            created_at: self.created_at,
            created_by,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: NewUser) -> TapsterResult<User> {
        let id = input.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 display_name = $display_name, \
                 role = $role, \
                 managed_stores = $managed_stores, \
                 owned_stores = $owned_stores, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("managed_stores", input.managed_stores))
            .bind(("owned_stores", input.owned_stores))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TapsterResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn upsert_admin(&self, id: Uuid, email: &str) -> TapsterResult<User> {
        let id_str = id.to_string();

        // Merge semantics: delegated-store fields and display name on an
        // existing document survive; email, role, and the creation
        // timestamp are overwritten.
        let result = self
            .db
            .query(
                "UPSERT type::record('user', $id) MERGE { \
                 email: $email, \
                 role: 'admin', \
                 created_at: time::now() }",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }
}

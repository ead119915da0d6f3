//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Nested store payloads (ratings,
//! menus, hours windows) are FLEXIBLE; their shape is owned by the
//! import normalizer, not the database.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (operator accounts; record id = identity-provider uid)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'owner', 'manager'];
DEFINE FIELD managed_stores ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD owned_stores ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE user TYPE option<string>;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Stores (record id = base-36 import id)
-- =======================================================================
DEFINE TABLE store SCHEMAFULL;
DEFINE FIELD name ON TABLE store TYPE string;
DEFINE FIELD name_lower ON TABLE store TYPE string;
DEFINE FIELD category ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD cuisine_types ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD contact_number ON TABLE store TYPE string DEFAULT '';
DEFINE FIELD location ON TABLE store TYPE object FLEXIBLE;
DEFINE FIELD ratings ON TABLE store TYPE object FLEXIBLE;
DEFINE FIELD menus ON TABLE store TYPE array<object> FLEXIBLE DEFAULT [];
DEFINE FIELD business_hours ON TABLE store TYPE array<object> FLEXIBLE DEFAULT [];
DEFINE FIELD happy_hours ON TABLE store TYPE array<object> FLEXIBLE DEFAULT [];
DEFINE FIELD is_24_hours ON TABLE store TYPE bool DEFAULT false;
DEFINE FIELD owner_id ON TABLE store TYPE option<string>;
DEFINE FIELD managers ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD menu_categories ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE store TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE store TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_store_name_lower ON TABLE store COLUMNS name_lower;

-- =======================================================================
-- Admin action log (append-only)
-- =======================================================================
DEFINE TABLE admin_log SCHEMAFULL;
DEFINE FIELD action ON TABLE admin_log TYPE string;
DEFINE FIELD target_id ON TABLE admin_log TYPE string;
DEFINE FIELD actor_id ON TABLE admin_log TYPE string;
DEFINE FIELD details ON TABLE admin_log TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD timestamp ON TABLE admin_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_log_target ON TABLE admin_log COLUMNS target_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn schema_defines_all_collections() {
        for table in ["user", "store", "admin_log"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table definition for {table}"
            );
        }
    }
}

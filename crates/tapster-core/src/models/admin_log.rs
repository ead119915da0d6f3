//! Admin action log domain model. Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLogEntry {
    pub id: Uuid,
    /// Action tag, e.g. `create_admin_account`.
    pub action: String,
    /// The account the action was performed on.
    pub target_id: Uuid,
    /// The caller who performed the action.
    pub actor_id: Uuid,
    /// Free-form detail payload.
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAdminLogEntry {
    pub action: String,
    pub target_id: Uuid,
    pub actor_id: Uuid,
    pub details: serde_json::Value,
}

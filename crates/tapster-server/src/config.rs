//! Server configuration from environment variables.

use tapster_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    /// Email granted admin through the bootstrap path.
    pub initial_admin_email: String,
    /// Bootstrap operations (initial admin, store import, search-key
    /// backfill) run only when `TAPSTER_BOOTSTRAP=1` is set. They are
    /// trusted operational tools and must never be publicly reachable.
    pub bootstrap_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            db: DbConfig::from_env(),
            initial_admin_email: std::env::var("TAPSTER_INITIAL_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@tapster.local".into()),
            bootstrap_enabled: std::env::var("TAPSTER_BOOTSTRAP").is_ok_and(|v| v == "1"),
        }
    }
}

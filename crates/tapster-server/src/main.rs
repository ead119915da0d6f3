//! Tapster Server — application entry point.
//!
//! Connects to SurrealDB, runs migrations, and dispatches the trusted
//! operational tools. The remote transport that exposes the
//! provisioning operations to callers is deployed separately; this
//! binary only hosts the bootstrap path, and refuses it unless
//! `TAPSTER_BOOTSTRAP=1` is set.

mod config;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tapster_core::error::{TapsterError, TapsterResult};
use tapster_core::hooks::CaseFoldSync;
use tapster_core::repository::StoreRepository;
use tapster_db::repository::{
    SurrealAdminLogRepository, SurrealStoreRepository, SurrealUserRepository,
};
use tapster_db::{DbManager, run_migrations};
use tapster_identity::InMemoryIdentityProvider;
use tapster_import::{StoreImporter, bundled_dataset};
use tapster_provisioning::{ProvisioningConfig, ProvisioningService};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tapster=info".parse().unwrap()),
        )
        .json()
        .init();

    if let Err(err) = run().await {
        error!(error = %err, code = err.code(), "tapster server failed");
        std::process::exit(1);
    }
}

async fn run() -> TapsterResult<()> {
    let config = ServerConfig::from_env();

    info!("Starting Tapster server...");

    let manager = DbManager::connect(&config.db)
        .await
        .map_err(|e| TapsterError::Database(e.to_string()))?;
    let db = manager.client().clone();
    run_migrations(&db).await.map_err(TapsterError::from)?;

    let stores = SurrealStoreRepository::with_hooks(db.clone(), vec![Box::new(CaseFoldSync)]);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            info!(
                "No command given. Available bootstrap commands: \
                 set-initial-admin, import-stores [path], sync-search-keys"
            );
            Ok(())
        }
        Some("set-initial-admin") => {
            require_bootstrap(&config)?;

            let service = ProvisioningService::new(
                InMemoryIdentityProvider::new(),
                SurrealUserRepository::new(db.clone()),
                stores,
                SurrealAdminLogRepository::new(db),
                ProvisioningConfig {
                    initial_admin_email: config.initial_admin_email.clone(),
                },
            );

            let user = service.set_initial_admin().await?;
            info!(user_id = %user.id, email = %user.email, "initial admin set");
            Ok(())
        }
        Some("import-stores") => {
            require_bootstrap(&config)?;

            let dataset = match args.get(1) {
                Some(path) => {
                    std::fs::read_to_string(path).map_err(|e| TapsterError::InvalidArgument {
                        message: format!("cannot read dataset {path}: {e}"),
                    })?
                }
                None => bundled_dataset().to_string(),
            };

            let importer = StoreImporter::new(stores);
            let count = importer.import_json(&dataset).await?;
            info!(count, "stores imported");
            Ok(())
        }
        Some("sync-search-keys") => {
            require_bootstrap(&config)?;

            let updated = stores.sync_search_keys().await?;
            info!(updated, "store search keys synchronized");
            Ok(())
        }
        Some(other) => Err(TapsterError::InvalidArgument {
            message: format!("unknown command: {other}"),
        }),
    }
}

fn require_bootstrap(config: &ServerConfig) -> TapsterResult<()> {
    if config.bootstrap_enabled {
        Ok(())
    } else {
        Err(TapsterError::PermissionDenied {
            reason: "bootstrap operations are disabled; set TAPSTER_BOOTSTRAP=1".into(),
        })
    }
}

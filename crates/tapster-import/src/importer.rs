//! Batch store importer.

use tracing::info;

use tapster_core::error::{TapsterError, TapsterResult};
use tapster_core::models::store::NewStore;
use tapster_core::repository::StoreRepository;

use crate::normalize::Normalizer;
use crate::raw::{RawDataset, RawStoreRecord};

/// The dataset shipped with the binary, used when no path is given to
/// the import tool.
pub fn bundled_dataset() -> &'static str {
    include_str!("../data/stores.json")
}

/// Imports raw store records as one atomic batch.
pub struct StoreImporter<S: StoreRepository> {
    stores: S,
}

impl<S: StoreRepository> StoreImporter<S> {
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    /// Parse a `{ "stores": [ … ] }` dataset and import it.
    pub async fn import_json(&self, json: &str) -> TapsterResult<usize> {
        let dataset: RawDataset =
            serde_json::from_str(json).map_err(|e| TapsterError::InvalidArgument {
                message: format!("malformed store dataset: {e}"),
            })?;
        self.import(dataset.stores).await
    }

    /// Normalize every record with one shared used-id set, then commit
    /// all documents in a single transaction: the whole import becomes
    /// visible, or none of it does.
    pub async fn import(&self, records: Vec<RawStoreRecord>) -> TapsterResult<usize> {
        // Scoped so the normalizer's thread-local rng is gone before the
        // commit is awaited.
        let stores: Vec<NewStore> = {
            let mut normalizer = Normalizer::new();
            records
                .into_iter()
                .map(|record| normalizer.normalize(record))
                .collect()
        };

        let count = stores.len();
        self.stores.create_all(stores).await?;

        info!(count, "store import committed");
        Ok(count)
    }
}

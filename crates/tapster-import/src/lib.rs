//! Tapster Import — normalization of heterogeneous raw store records
//! into canonical store documents, and the batch importer that persists
//! them atomically.

pub mod importer;
pub mod normalize;
pub mod raw;

pub use importer::{StoreImporter, bundled_dataset};
pub use normalize::Normalizer;
pub use raw::{RawDataset, RawStoreRecord};

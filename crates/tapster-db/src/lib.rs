//! Tapster Database — SurrealDB connection management, schema
//! migrations, atomic write batches, and repository implementations for
//! the `tapster-core` traits.

mod batch;
mod connection;
mod error;
mod schema;

pub mod repository;

pub use batch::WriteBatch;
pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};

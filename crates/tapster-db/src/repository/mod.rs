//! SurrealDB repository implementations.

mod admin_log;
mod store;
mod user;

pub use admin_log::SurrealAdminLogRepository;
pub use store::SurrealStoreRepository;
pub use user::SurrealUserRepository;

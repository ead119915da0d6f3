//! Tapster Identity — implementations of the [`IdentityProvider`] seam.
//!
//! Production deployments plug a managed identity service into the seam;
//! this crate ships the memory-backed provider used by the server binary
//! in local mode and by the test suites.
//!
//! [`IdentityProvider`]: tapster_core::identity::IdentityProvider

pub mod memory;
pub mod password;

pub use memory::InMemoryIdentityProvider;

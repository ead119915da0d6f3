//! Tapster Core — domain models, error taxonomy, and the trait seams
//! (repositories, identity provider, store write hooks) shared across
//! all crates.

pub mod error;
pub mod hooks;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{TapsterError, TapsterResult};

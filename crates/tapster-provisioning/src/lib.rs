//! Tapster Provisioning — account creation for the three operator
//! tiers, role authorization, and synchronization of the role/ownership
//! graph with the store registry.

pub mod config;
pub mod guard;
pub mod service;

pub use config::ProvisioningConfig;
pub use guard::ProvisioningAction;
pub use service::{Caller, CreateAccountInput, ProvisionedAccount, ProvisioningService};

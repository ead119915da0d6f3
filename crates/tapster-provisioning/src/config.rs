//! Provisioning configuration.

/// Configuration for the provisioning service.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    /// Email of the identity granted admin through the bootstrap path.
    /// Deployment configuration, not a compiled-in constant.
    pub initial_admin_email: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            initial_admin_email: "admin@tapster.local".into(),
        }
    }
}

//! Memory-backed identity provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use tapster_core::identity::{
    Claims, IdentityError, IdentityProvider, IdentityRecord, NewIdentity,
};

use crate::password;

#[derive(Debug)]
struct StoredIdentity {
    email: String,
    display_name: Option<String>,
    password_hash: String,
    claims: Claims,
}

/// In-process identity provider. Identities live in a mutex-guarded map;
/// passwords are stored as Argon2id hashes, never in the clear.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    identities: Mutex<HashMap<Uuid, StoredIdentity>>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pepper(pepper: String) -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
            pepper: Some(pepper),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, StoredIdentity>>, IdentityError> {
        self.identities
            .lock()
            .map_err(|_| IdentityError::Provider("identity store poisoned".into()))
    }

    /// Check a credential pair. Development/test convenience; a managed
    /// provider performs this check on its own side of the seam.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool, IdentityError> {
        let identities = self.lock()?;
        let stored = identities
            .values()
            .find(|s| s.email == email)
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))?;
        password::verify_password(password, &stored.password_hash, self.pepper.as_deref())
    }

    /// Claims currently attached to an identity.
    pub fn claims(&self, id: Uuid) -> Option<Claims> {
        self.lock().ok()?.get(&id).map(|s| s.claims)
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, input: NewIdentity) -> Result<IdentityRecord, IdentityError> {
        let password_hash = password::hash_password(&input.password, self.pepper.as_deref())?;

        let mut identities = self.lock()?;
        if identities.values().any(|s| s.email == input.email) {
            return Err(IdentityError::EmailTaken(input.email));
        }

        let id = Uuid::new_v4();
        identities.insert(
            id,
            StoredIdentity {
                email: input.email.clone(),
                display_name: Some(input.display_name.clone()),
                password_hash,
                claims: Claims::default(),
            },
        );

        Ok(IdentityRecord {
            id,
            email: input.email,
            display_name: Some(input.display_name),
        })
    }

    async fn set_claims(&self, id: Uuid, claims: Claims) -> Result<(), IdentityError> {
        let mut identities = self.lock()?;
        let stored = identities
            .get_mut(&id)
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))?;
        stored.claims = claims;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<IdentityRecord, IdentityError> {
        let identities = self.lock()?;
        identities
            .iter()
            .find(|(_, s)| s.email == email)
            .map(|(id, s)| IdentityRecord {
                id: *id,
                email: s.email.clone(),
                display_name: s.display_name.clone(),
            })
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))
    }
}

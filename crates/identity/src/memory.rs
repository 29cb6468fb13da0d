//! In-memory identity provider for tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    ExternalIdentity, IdentityError, IdentityMetadata, IdentityProvider, IdentityResult,
    NewIdentity,
};

#[derive(Clone)]
struct StoredIdentity {
    identity: ExternalIdentity,
    password: String,
}

/// Keeps identities in a map keyed by id. Clones share state.
///
/// Failures can be injected per email (`fail_create_for`) or globally for
/// deletes (`fail_deletes`) and credential updates (`fail_updates`,
/// `fail_password_updates`) to exercise partial-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    identities: Arc<RwLock<HashMap<String, StoredIdentity>>>,
    failing_creates: Arc<RwLock<HashSet<String>>>,
    fail_deletes: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
    fail_password_updates: Arc<AtomicBool>,
    create_calls: Arc<AtomicUsize>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity directly, bypassing failure injection.
    pub async fn insert(&self, email: &str, password: &str) -> ExternalIdentity {
        let identity = ExternalIdentity {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            email_confirmed: true,
            created_at: Some(Utc::now()),
            metadata: IdentityMetadata::default(),
        };
        self.identities.write().await.insert(
            identity.id.clone(),
            StoredIdentity {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        identity
    }

    /// Make every subsequent `create` for this email fail with a 500.
    pub async fn fail_create_for(&self, email: &str) {
        self.failing_creates
            .write()
            .await
            .insert(email.to_ascii_lowercase());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make `set_password` and `set_email` fail with a 500.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Make only `set_password` fail.
    pub fn fail_password_updates(&self, fail: bool) {
        self.fail_password_updates.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<ExternalIdentity> {
        self.identities
            .read()
            .await
            .get(id)
            .map(|stored| stored.identity.clone())
    }

    fn check_update(&self, fail: bool) -> IdentityResult<()> {
        if fail || self.fail_updates.load(Ordering::SeqCst) {
            return Err(IdentityError::Rejected {
                status: 500,
                message: "injected update failure".to_string(),
            });
        }
        Ok(())
    }

    async fn find_stored(&self, email: &str) -> Option<StoredIdentity> {
        self.identities
            .read()
            .await
            .values()
            .find(|stored| stored.identity.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn find_by_email(&self, email: &str) -> IdentityResult<Option<ExternalIdentity>> {
        Ok(self.find_stored(email).await.map(|stored| stored.identity))
    }

    async fn create(&self, identity: &NewIdentity) -> IdentityResult<ExternalIdentity> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_creates
            .read()
            .await
            .contains(&identity.email.to_ascii_lowercase())
        {
            return Err(IdentityError::Rejected {
                status: 500,
                message: "injected create failure".to_string(),
            });
        }

        let mut identities = self.identities.write().await;
        if identities
            .values()
            .any(|stored| stored.identity.email.eq_ignore_ascii_case(&identity.email))
        {
            return Err(IdentityError::AlreadyRegistered);
        }

        let created = ExternalIdentity {
            id: Uuid::new_v4().to_string(),
            email: identity.email.clone(),
            email_confirmed: identity.email_confirm,
            created_at: Some(Utc::now()),
            metadata: identity.metadata.clone(),
        };
        identities.insert(
            created.id.clone(),
            StoredIdentity {
                identity: created.clone(),
                password: identity.password.clone(),
            },
        );
        Ok(created)
    }

    async fn delete(&self, id: &str) -> IdentityResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(IdentityError::Rejected {
                status: 500,
                message: "injected delete failure".to_string(),
            });
        }

        self.identities
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(IdentityError::NotFound)
    }

    async fn verify_password(&self, email: &str, password: &str) -> IdentityResult<bool> {
        Ok(self
            .find_stored(email)
            .await
            .is_some_and(|stored| stored.password == password))
    }

    async fn set_password(&self, id: &str, password: &str) -> IdentityResult<()> {
        self.check_update(self.fail_password_updates.load(Ordering::SeqCst))?;
        let mut identities = self.identities.write().await;
        let stored = identities.get_mut(id).ok_or(IdentityError::NotFound)?;
        stored.password = password.to_string();
        Ok(())
    }

    async fn set_email(&self, id: &str, email: &str) -> IdentityResult<()> {
        self.check_update(false)?;
        let mut identities = self.identities.write().await;
        if identities
            .iter()
            .any(|(other, stored)| other != id && stored.identity.email.eq_ignore_ascii_case(email))
        {
            return Err(IdentityError::AlreadyRegistered);
        }
        let stored = identities.get_mut(id).ok_or(IdentityError::NotFound)?;
        stored.identity.email = email.to_string();
        stored.identity.email_confirmed = true;
        Ok(())
    }

    async fn set_metadata(&self, id: &str, metadata: &IdentityMetadata) -> IdentityResult<()> {
        self.check_update(false)?;
        let mut identities = self.identities.write().await;
        let stored = identities.get_mut(id).ok_or(IdentityError::NotFound)?;
        stored.identity.metadata = metadata.clone();
        Ok(())
    }
}

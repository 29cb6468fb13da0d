//! Managed identity service integration.
//!
//! Members can be linked to an account in an external authentication
//! service. This crate defines the [`IdentityProvider`] seam the domain
//! services talk to, an HTTP implementation against the service's admin API
//! ([`AdminApiClient`]) and an in-memory implementation
//! ([`InMemoryIdentityProvider`]) for tests and local development.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod admin_api;
pub mod memory;

pub use admin_api::AdminApiClient;
pub use memory::InMemoryIdentityProvider;

/// An account in the managed identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: IdentityMetadata,
}

/// Member attributes copied onto the identity when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

/// Parameters for creating an identity with a password credential.
#[derive(Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    /// Mark the email as already confirmed so no confirmation mail is sent.
    pub email_confirm: bool,
    pub metadata: IdentityMetadata,
}

impl fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewIdentity")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("email_confirm", &self.email_confirm)
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("an identity with this email is already registered")]
    AlreadyRegistered,
    #[error("identity not found")]
    NotFound,
    #[error("identity service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected identity service response: {0}")]
    InvalidResponse(String),
    #[error("identity service is not configured: {0}")]
    NotConfigured(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Operations the domain needs from the managed identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Direct lookup by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> IdentityResult<Option<ExternalIdentity>>;

    async fn create(&self, identity: &NewIdentity) -> IdentityResult<ExternalIdentity>;

    async fn delete(&self, id: &str) -> IdentityResult<()>;

    /// `Ok(false)` means the service answered and the credentials were wrong.
    async fn verify_password(&self, email: &str, password: &str) -> IdentityResult<bool>;

    async fn set_password(&self, id: &str, password: &str) -> IdentityResult<()>;

    /// Move the identity to a new, already confirmed email address.
    /// `AlreadyRegistered` when another identity holds the address.
    async fn set_email(&self, id: &str, email: &str) -> IdentityResult<()>;

    /// Replace the member attributes stored on the identity.
    async fn set_metadata(&self, id: &str, metadata: &IdentityMetadata) -> IdentityResult<()>;
}

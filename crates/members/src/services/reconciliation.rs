//! Links members to managed identities, creating identities when absent.

use std::sync::Arc;

use membercard_database::{Member, MemberLookup, UpdateMemberRequest};
use membercard_identity::{IdentityMetadata, IdentityProvider, NewIdentity};
use tracing::{error, info, warn};

use crate::repositories::MemberStore;
use crate::types::{MemberError, MemberResult, ReconcileOutcome, ValidationErrors};
use crate::utils::validation::{validate_email, validate_password};

#[derive(Clone)]
pub struct ReconciliationService {
    members: Arc<dyn MemberStore>,
    identity: Arc<dyn IdentityProvider>,
    password_min_length: usize,
}

impl ReconciliationService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        identity: Arc<dyn IdentityProvider>,
        password_min_length: usize,
    ) -> Self {
        Self {
            members,
            identity,
            password_min_length,
        }
    }

    /// Validate a password used to seed new identities.
    pub fn check_password(&self, password: &str) -> MemberResult<()> {
        let mut errors = ValidationErrors::new();
        errors.check("password", validate_password(password, self.password_min_length));
        errors.into_result()
    }

    /// Ensure `member` is linked to a managed identity.
    ///
    /// An existing identity for the email is reused (and the member's
    /// reference repaired if it differs) without touching its credential.
    /// Otherwise a pre-confirmed identity is created with `password`.
    /// Failing to write the link back onto the member is logged but does
    /// not fail the call: the identity exists and a re-run repairs the link.
    pub async fn reconcile(&self, member: &Member, password: &str) -> MemberResult<ReconcileOutcome> {
        let mut errors = ValidationErrors::new();
        errors.check("email", validate_email(&member.email));
        errors.into_result()?;

        if let Some(existing) = self.identity.find_by_email(&member.email).await? {
            if member.external_identity_id.as_deref() != Some(existing.id.as_str()) {
                self.write_link(member, &existing.id).await;
            }
            info!(member_id = %member.id, identity_id = %existing.id, "identity already exists");
            return Ok(ReconcileOutcome::AlreadyExists {
                identity_id: existing.id,
            });
        }

        let created = self
            .identity
            .create(&NewIdentity {
                email: member.email.clone(),
                password: password.to_string(),
                email_confirm: true,
                metadata: IdentityMetadata {
                    name: Some(member.name.clone()),
                    member_number: Some(member.member_number.clone()),
                    member_id: Some(member.id.clone()),
                },
            })
            .await
            .map_err(|e| {
                error!(member_id = %member.id, email = %member.email, error = %e, "identity creation failed");
                MemberError::Identity(e)
            })?;

        self.write_link(member, &created.id).await;
        info!(member_id = %member.id, identity_id = %created.id, "identity created for member");

        Ok(ReconcileOutcome::Created {
            identity_id: created.id,
        })
    }

    /// Reconcile the single active member holding `email`.
    pub async fn reconcile_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> MemberResult<(Member, ReconcileOutcome)> {
        let mut errors = ValidationErrors::new();
        errors.check("email", validate_email(email));
        errors.check("password", validate_password(password, self.password_min_length));
        errors.into_result()?;

        let mut matches = self.members.find_active(MemberLookup::Email(email)).await?;
        let member = match matches.len() {
            0 => return Err(MemberError::NotFound),
            1 => matches.remove(0),
            count => {
                error!(email, count, "data integrity error: email matches several active members");
                return Err(MemberError::NotFound);
            }
        };

        let outcome = self.reconcile(&member, password).await?;
        Ok((member, outcome))
    }

    async fn write_link(&self, member: &Member, identity_id: &str) {
        let update = UpdateMemberRequest {
            external_identity_id: Some(identity_id.to_string()),
            ..Default::default()
        };

        if let Err(error) = self.members.update(&member.id, &update).await {
            warn!(
                member_id = %member.id,
                identity_id,
                error = %error,
                "failed to store identity link on member"
            );
        }
    }
}

//! Self-service registration backed by a managed identity.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use membercard_database::{
    CreateMemberRequest, CredentialSource, Member, MemberLookup, MemberStatus,
};
use membercard_identity::{IdentityError, IdentityMetadata, IdentityProvider, NewIdentity};
use tracing::{error, info, warn};

use crate::repositories::MemberStore;
use crate::types::{
    MemberError, MemberResult, MembershipPolicy, PublicMember, RegisterRequest, ValidationErrors,
};
use crate::utils::validation::{validate_email, validate_name, validate_password};
use crate::utils::{expiration_after, format_member_number};

#[derive(Clone)]
pub struct RegistrationService {
    members: Arc<dyn MemberStore>,
    identity: Arc<dyn IdentityProvider>,
    policy: MembershipPolicy,
}

impl RegistrationService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        identity: Arc<dyn IdentityProvider>,
        policy: MembershipPolicy,
    ) -> Self {
        Self {
            members,
            identity,
            policy,
        }
    }

    /// Create an identity and then the member row that references it.
    ///
    /// The member number is allocated first so the identity carries it from
    /// the start; a number whose registration fails is not reused. If
    /// anything fails after the identity exists, the identity is deleted
    /// again. A failed delete is logged and the original error is returned.
    pub async fn register(&self, request: RegisterRequest) -> MemberResult<PublicMember> {
        let name = request.name.trim().to_string();
        let email = request.email.trim().to_string();

        let mut errors = ValidationErrors::new();
        errors.check("name", validate_name(&name));
        errors.check("email", validate_email(&email));
        errors.check(
            "password",
            validate_password(&request.password, self.policy.password_min_length),
        );
        errors.into_result()?;

        if !self.members.find_active(MemberLookup::Email(&email)).await?.is_empty() {
            return Err(MemberError::EmailAlreadyExists);
        }

        let today = Utc::now().date_naive();
        let sequence = self.members.next_member_sequence(today.year()).await?;
        let member_number =
            format_member_number(&self.policy.member_number_prefix, today.year(), sequence);

        let identity = self
            .identity
            .create(&NewIdentity {
                email: email.clone(),
                password: request.password.clone(),
                email_confirm: true,
                metadata: IdentityMetadata {
                    name: Some(name.clone()),
                    member_number: Some(member_number.clone()),
                    member_id: None,
                },
            })
            .await
            .map_err(|e| match e {
                IdentityError::AlreadyRegistered => MemberError::EmailAlreadyExists,
                other => MemberError::Identity(other),
            })?;

        let new_member = CreateMemberRequest {
            name,
            email,
            member_number,
            credential: CredentialSource::Managed,
            status: request.status.unwrap_or(MemberStatus::Bronze),
            expiration_date: expiration_after(today, self.policy.term_months),
            external_identity_id: Some(identity.id.clone()),
        };
        match self.members.create(&new_member).await {
            Ok(member) => {
                self.attach_member_id(&identity.id, &member).await;
                info!(
                    member_id = %member.id,
                    member_number = %member.member_number,
                    identity_id = %identity.id,
                    "member registered"
                );
                Ok(PublicMember::from(member))
            }
            Err(e) => {
                let e = MemberError::from(e);
                warn!(email = %new_member.email, identity_id = %identity.id, error = %e, "registration failed after identity creation");
                if let Err(delete_error) = self.identity.delete(&identity.id).await {
                    error!(
                        identity_id = %identity.id,
                        error = %delete_error,
                        "failed to delete identity after registration failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// The member id only exists once the row is in; a failure here leaves
    /// the identity without it and is not fatal.
    async fn attach_member_id(&self, identity_id: &str, member: &Member) {
        let metadata = IdentityMetadata {
            name: Some(member.name.clone()),
            member_number: Some(member.member_number.clone()),
            member_id: Some(member.id.clone()),
        };
        if let Err(error) = self.identity.set_metadata(identity_id, &metadata).await {
            warn!(
                member_id = %member.id,
                identity_id,
                error = %error,
                "failed to record member id on identity"
            );
        }
    }
}

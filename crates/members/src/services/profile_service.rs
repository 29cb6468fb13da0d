//! Member-initiated profile reads and updates.

use std::sync::Arc;

use membercard_database::{CredentialSource, Member, MemberLookup, UpdateMemberRequest};
use membercard_identity::IdentityProvider;
use tracing::{info, warn};

use crate::repositories::MemberStore;
use crate::services::identity_sync::{self, IdentityChange};
use crate::types::{
    MemberError, MemberResult, ProfileUpdate, PublicMember, ValidationCode, ValidationErrors,
};
use crate::utils::validation::{validate_email, validate_name, validate_password};
use crate::utils::{hash_password, verify_password};

#[derive(Clone)]
pub struct ProfileService {
    members: Arc<dyn MemberStore>,
    identity: Arc<dyn IdentityProvider>,
    password_min_length: usize,
}

struct PasswordChange<'a> {
    current: &'a str,
    new: &'a str,
    confirm: &'a str,
}

impl ProfileService {
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

    pub async fn get(&self, member_id: &str) -> MemberResult<PublicMember> {
        self.active_member(member_id).await.map(PublicMember::from)
    }

    /// Apply a profile change for an active member.
    ///
    /// A password change requires the current password to verify and the
    /// new password to match its confirmation. Nothing is written unless
    /// every check passes. Email and password changes of a linked member
    /// are carried over to its identity.
    pub async fn update(&self, member_id: &str, update: &ProfileUpdate) -> MemberResult<PublicMember> {
        let name = update.name.as_deref().map(str::trim);
        let email = update.email.as_deref().map(str::trim);

        let mut errors = ValidationErrors::new();
        if let Some(name) = name {
            errors.check("name", validate_name(name));
        }
        if let Some(email) = email {
            errors.check("email", validate_email(email));
        }
        let change = password_change(update, &mut errors);
        errors.into_result()?;

        let member = self.active_member(member_id).await?;
        let mut patch = UpdateMemberRequest {
            name: name.filter(|n| *n != member.name).map(str::to_string),
            email: email.filter(|e| *e != member.email).map(str::to_string),
            ..Default::default()
        };

        if let Some(change) = &change {
            if !self.current_password_matches(&member, change.current).await? {
                return Err(MemberError::InvalidCurrentPassword);
            }
            if change.new != change.confirm {
                return Err(MemberError::PasswordMismatch);
            }
            validate_password(change.new, self.password_min_length)
                .map_err(|code| MemberError::validation("new_password", code))?;
        }

        if let Some(email) = &patch.email {
            let holders = self.members.find_active(MemberLookup::Email(email)).await?;
            if holders.iter().any(|holder| holder.id != member.id) {
                return Err(MemberError::EmailAlreadyExists);
            }
        }

        let mut identity_password = None;
        if let Some(change) = &change {
            match &member.credential {
                CredentialSource::Legacy { .. } => {
                    patch.password_hash = Some(hash_password(change.new)?);
                }
                CredentialSource::Managed => identity_password = Some(change.new),
            }
        }

        if patch.is_empty() && identity_password.is_none() {
            return Ok(PublicMember::from(member));
        }

        let identity_change = IdentityChange {
            email: patch.email.as_deref(),
            password: identity_password,
        };
        let updated = identity_sync::apply(
            self.members.as_ref(),
            self.identity.as_ref(),
            &member,
            &patch,
            identity_change,
        )
        .await?;
        info!(
            member_id = %updated.id,
            password_changed = change.is_some(),
            "profile updated"
        );
        Ok(PublicMember::from(updated))
    }

    async fn active_member(&self, member_id: &str) -> MemberResult<Member> {
        match self.members.find_by_id(member_id).await? {
            Some(member) if member.is_active => Ok(member),
            _ => Err(MemberError::NotFound),
        }
    }

    async fn current_password_matches(&self, member: &Member, password: &str) -> MemberResult<bool> {
        match &member.credential {
            CredentialSource::Legacy { password_hash } => {
                Ok(verify_password(password, password_hash).unwrap_or_else(|error| {
                    warn!(member_id = %member.id, error = %error, "stored password hash is unusable");
                    false
                }))
            }
            CredentialSource::Managed => Ok(self
                .identity
                .verify_password(&member.email, password)
                .await?),
        }
    }
}

/// All three password fields together, or none of them.
fn password_change<'a>(
    update: &'a ProfileUpdate,
    errors: &mut ValidationErrors,
) -> Option<PasswordChange<'a>> {
    if !update.wants_password_change() {
        return None;
    }

    let present = |value: &'a Option<String>| value.as_deref().filter(|v| !v.is_empty());
    match (
        present(&update.current_password),
        present(&update.new_password),
        present(&update.confirm_password),
    ) {
        (Some(current), Some(new), Some(confirm)) => Some(PasswordChange {
            current,
            new,
            confirm,
        }),
        _ => {
            errors.add("password", ValidationCode::PasswordChangeIncomplete);
            None
        }
    }
}

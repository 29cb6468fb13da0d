//! Member row writes that carry over to the linked identity.
//!
//! The row is written first. Email and password changes are then pushed to
//! the identity service; when that fails the row is put back, so a rejected
//! update leaves both sides as they were.

use membercard_database::{CredentialSource, Member, UpdateMemberRequest};
use membercard_identity::{IdentityError, IdentityProvider};
use tracing::{error, info, warn};

use crate::repositories::MemberStore;
use crate::types::{MemberError, MemberResult};

/// Login credentials to move on the identity side.
#[derive(Default)]
pub(crate) struct IdentityChange<'a> {
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl IdentityChange<'_> {
    fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

pub(crate) async fn apply(
    members: &dyn MemberStore,
    identity: &dyn IdentityProvider,
    member: &Member,
    patch: &UpdateMemberRequest,
    change: IdentityChange<'_>,
) -> MemberResult<Member> {
    let identity_id = linked_identity(member, &change)?;

    let updated = if patch.is_empty() {
        member.clone()
    } else {
        members.update(&member.id, patch).await?
    };

    let Some(identity_id) = identity_id else {
        return Ok(updated);
    };

    if let Err(error) = push(identity, identity_id, member, &change).await {
        if !patch.is_empty() {
            if let Err(restore_error) = members.update(&member.id, &revert_patch(member, patch)).await
            {
                error!(
                    member_id = %member.id,
                    error = %restore_error,
                    "failed to restore member after identity update failure"
                );
            }
        }
        return Err(error);
    }

    Ok(updated)
}

/// The identity to update, if any. Managed members cannot change login
/// credentials without one.
fn linked_identity<'m>(member: &'m Member, change: &IdentityChange<'_>) -> MemberResult<Option<&'m str>> {
    if change.is_empty() {
        return Ok(None);
    }

    match (member.external_identity_id.as_deref(), &member.credential) {
        (Some(id), _) => Ok(Some(id)),
        (None, CredentialSource::Managed) => {
            warn!(member_id = %member.id, "managed member has no linked identity");
            Err(MemberError::Identity(IdentityError::NotFound))
        }
        (None, CredentialSource::Legacy { .. }) => Ok(None),
    }
}

async fn push(
    identity: &dyn IdentityProvider,
    identity_id: &str,
    member: &Member,
    change: &IdentityChange<'_>,
) -> MemberResult<()> {
    if let Some(email) = change.email {
        identity
            .set_email(identity_id, email)
            .await
            .map_err(|error| match error {
                IdentityError::AlreadyRegistered => MemberError::EmailAlreadyExists,
                other => MemberError::Identity(other),
            })?;
        info!(member_id = %member.id, identity_id, "identity email moved");
    }

    if let Some(password) = change.password {
        if let Err(error) = identity.set_password(identity_id, password).await {
            if change.email.is_some() {
                if let Err(restore_error) = identity.set_email(identity_id, &member.email).await {
                    error!(
                        member_id = %member.id,
                        identity_id,
                        error = %restore_error,
                        "failed to restore identity email"
                    );
                }
            }
            return Err(error.into());
        }
    }

    Ok(())
}

/// The fields `patch` touches, set back to their values on `member`.
fn revert_patch(member: &Member, patch: &UpdateMemberRequest) -> UpdateMemberRequest {
    UpdateMemberRequest {
        name: patch.name.as_ref().map(|_| member.name.clone()),
        email: patch.email.as_ref().map(|_| member.email.clone()),
        status: patch.status.map(|_| member.status),
        expiration_date: patch.expiration_date.map(|_| member.expiration_date),
        is_active: patch.is_active.map(|_| member.is_active),
        password_hash: patch
            .password_hash
            .as_ref()
            .and(member.credential.password_hash().map(str::to_string)),
        external_identity_id: patch
            .external_identity_id
            .as_ref()
            .and(member.external_identity_id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_repositories::sample_member;
    use membercard_database::MemberStatus;

    #[test]
    fn revert_touches_only_patched_fields() {
        let member = sample_member("member-1", "a@x.com", "M-1");
        let patch = UpdateMemberRequest {
            email: Some("b@x.com".to_string()),
            status: Some(MemberStatus::Gold),
            ..Default::default()
        };

        let revert = revert_patch(&member, &patch);
        assert_eq!(revert.email.as_deref(), Some("a@x.com"));
        assert_eq!(revert.status, Some(MemberStatus::Bronze));
        assert!(revert.name.is_none());
        assert!(revert.is_active.is_none());
        assert!(revert.password_hash.is_none());
    }

    #[test]
    fn managed_member_without_identity_cannot_move_credentials() {
        let member = sample_member("member-1", "a@x.com", "M-1");
        let change = IdentityChange {
            email: Some("b@x.com"),
            ..Default::default()
        };

        assert!(matches!(
            linked_identity(&member, &change),
            Err(MemberError::Identity(IdentityError::NotFound))
        ));
        assert!(matches!(
            linked_identity(&member, &IdentityChange::default()),
            Ok(None)
        ));
    }
}

//! Login resolution: identifier + password to exactly one member.

use std::sync::Arc;

use membercard_database::{CreateLoginLogRequest, CredentialSource, Member, MemberLookup};
use membercard_identity::IdentityProvider;
use tracing::{debug, error, info, warn};

use crate::repositories::{LoginLogStore, MemberStore};
use crate::types::errors::LoginFailure;
use crate::types::{
    LoginAttempt, MemberError, MemberResult, PublicMember, ValidationErrors,
};
use crate::utils::validation::{validate_identifier, validate_password};
use crate::utils::verify_password;

#[derive(Clone)]
pub struct LoginService {
    members: Arc<dyn MemberStore>,
    identity: Arc<dyn IdentityProvider>,
    login_logs: Arc<dyn LoginLogStore>,
    password_min_length: usize,
}

impl LoginService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        identity: Arc<dyn IdentityProvider>,
        login_logs: Arc<dyn LoginLogStore>,
        password_min_length: usize,
    ) -> Self {
        Self {
            members,
            identity,
            login_logs,
            password_min_length,
        }
    }

    /// Resolve and verify, then append a login log entry on success.
    ///
    /// The log append is best-effort: a failure is logged and the login
    /// still succeeds.
    pub async fn login(&self, attempt: &LoginAttempt) -> MemberResult<PublicMember> {
        let member = self.resolve(&attempt.identifier, &attempt.password).await?;

        let entry = CreateLoginLogRequest {
            member_id: member.id.clone(),
            login_type: attempt.channel,
            ip_address: attempt.ip_address.clone(),
            user_agent: attempt.user_agent.clone(),
        };
        if let Err(error) = self.login_logs.append(&entry).await {
            warn!(member_id = %member.id, error = %error, "failed to record login log");
        }

        info!(member_id = %member.id, channel = %attempt.channel, "member logged in");
        Ok(member)
    }

    /// Resolve `identifier` to a single active member and verify `password`.
    ///
    /// Identifiers containing `@` are treated as email addresses, anything
    /// else as a member number. Every resolution failure surfaces as
    /// [`MemberError::InvalidCredentials`].
    pub async fn resolve(&self, identifier: &str, password: &str) -> MemberResult<PublicMember> {
        let mut errors = ValidationErrors::new();
        errors.check("identifier", validate_identifier(identifier));
        errors.check("password", validate_password(password, self.password_min_length));
        errors.into_result()?;

        let identifier = identifier.trim();
        let lookup = if identifier.contains('@') {
            MemberLookup::Email(identifier)
        } else {
            MemberLookup::MemberNumber(identifier)
        };

        let mut matches = self.members.find_active(lookup).await?;
        let member = match matches.len() {
            1 => matches.remove(0),
            0 => return Err(refuse(identifier, LoginFailure::NotFound)),
            count => {
                error!(
                    identifier,
                    count, "data integrity error: identifier matches several active members"
                );
                return Err(refuse(identifier, LoginFailure::Ambiguous(count)));
            }
        };

        if !self.password_matches(&member, password.trim()).await? {
            return Err(refuse(identifier, LoginFailure::PasswordMismatch));
        }

        Ok(PublicMember::from(member))
    }

    async fn password_matches(&self, member: &Member, password: &str) -> MemberResult<bool> {
        match &member.credential {
            CredentialSource::Legacy { password_hash } => {
                match verify_password(password, password_hash) {
                    Ok(matched) => Ok(matched),
                    Err(error) => {
                        warn!(member_id = %member.id, error = %error, "stored password hash is unusable");
                        Ok(false)
                    }
                }
            }
            CredentialSource::Managed => Ok(self
                .identity
                .verify_password(&member.email, password)
                .await?),
        }
    }
}

fn refuse(identifier: &str, reason: LoginFailure) -> MemberError {
    debug!(identifier, reason = reason.as_str(), "login refused");
    MemberError::InvalidCredentials
}

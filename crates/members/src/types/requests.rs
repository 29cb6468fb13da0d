//! Inputs accepted by the member services.

use std::fmt;

use chrono::NaiveDate;
use membercard_database::{LoginChannel, MemberStatus};

/// A login attempt plus the request metadata recorded in the audit log.
#[derive(Clone, Default)]
pub struct LoginAttempt {
    /// Email address or member number.
    pub identifier: String,
    pub password: String,
    pub channel: LoginChannel,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("identifier", &self.identifier)
            .field("channel", &self.channel)
            .field("ip_address", &self.ip_address)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to bronze.
    pub status: Option<MemberStatus>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Member-initiated profile change. Absent fields are left untouched.
#[derive(Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileUpdate {
    pub(crate) fn wants_password_change(&self) -> bool {
        [
            &self.current_password,
            &self.new_password,
            &self.confirm_password,
        ]
        .iter()
        .any(|value| value.as_deref().is_some_and(|v| !v.is_empty()))
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_change", &self.wants_password_change())
            .finish()
    }
}

/// Administrative change to a member record.
#[derive(Debug, Clone, Default)]
pub struct AdminMemberUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<MemberStatus>,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct MemberListQuery {
    pub query: Option<String>,
    pub status: Option<MemberStatus>,
    pub is_active: Option<bool>,
    /// 1-based, defaults to 1.
    pub page: Option<u32>,
    /// 1..=100, defaults to 20.
    pub limit: Option<u32>,
}

/// Settings the services read from configuration.
#[derive(Debug, Clone)]
pub struct MembershipPolicy {
    pub password_min_length: usize,
    pub member_number_prefix: String,
    pub term_months: u32,
}

impl Default for MembershipPolicy {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            member_number_prefix: "M".to_string(),
            term_months: 12,
        }
    }
}

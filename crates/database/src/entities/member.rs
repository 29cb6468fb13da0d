//! Member entity definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A membership record.
///
/// Members are never hard-deleted; `is_active = false` is the soft delete.
/// The type deliberately does not implement `Serialize` so credential
/// material cannot leak into responses by accident.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub member_number: String,
    pub credential: CredentialSource,
    pub status: MemberStatus,
    pub expiration_date: NaiveDate,
    pub is_active: bool,
    pub external_identity_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which authority verifies a member's password.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Imported member with a locally stored library hash.
    Legacy { password_hash: String },
    /// Password lives in the managed identity service.
    Managed,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Legacy { .. } => "legacy",
            CredentialSource::Managed => "managed",
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match self {
            CredentialSource::Legacy { password_hash } => Some(password_hash),
            CredentialSource::Managed => None,
        }
    }

    pub fn is_managed(&self) -> bool {
        matches!(self, CredentialSource::Managed)
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Legacy { .. } => f
                .debug_struct("Legacy")
                .field("password_hash", &"<redacted>")
                .finish(),
            CredentialSource::Managed => f.write_str("Managed"),
        }
    }
}

/// Membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Bronze,
        MemberStatus::Silver,
        MemberStatus::Gold,
        MemberStatus::Diamond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Bronze => "bronze",
            MemberStatus::Silver => "silver",
            MemberStatus::Gold => "gold",
            MemberStatus::Diamond => "diamond",
        }
    }

    /// Display label shown on the membership card.
    pub fn label(&self) -> &'static str {
        match self {
            MemberStatus::Bronze => "ブロンズ",
            MemberStatus::Silver => "シルバー",
            MemberStatus::Gold => "ゴールド",
            MemberStatus::Diamond => "ダイヤモンド",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMemberStatus(pub String);

impl fmt::Display for UnknownMemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown member status '{}'", self.0)
    }
}

impl std::error::Error for UnknownMemberStatus {}

impl FromStr for MemberStatus {
    type Err = UnknownMemberStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(MemberStatus::Bronze),
            "silver" => Ok(MemberStatus::Silver),
            "gold" => Ok(MemberStatus::Gold),
            "diamond" => Ok(MemberStatus::Diamond),
            other => Err(UnknownMemberStatus(other.to_string())),
        }
    }
}

/// Exact-match lookup keys. Lookups through these only see active rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLookup<'a> {
    Email(&'a str),
    MemberNumber(&'a str),
}

/// Request for inserting a new member
#[derive(Debug, Clone)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub member_number: String,
    pub credential: CredentialSource,
    pub status: MemberStatus,
    pub expiration_date: NaiveDate,
    pub external_identity_id: Option<String>,
}

/// Partial member update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<MemberStatus>,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    /// Replaces the stored hash of a legacy member.
    pub password_hash: Option<String>,
    pub external_identity_id: Option<String>,
}

impl UpdateMemberRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.expiration_date.is_none()
            && self.is_active.is_none()
            && self.password_hash.is_none()
            && self.external_identity_id.is_none()
    }
}

/// Admin search over all members.
#[derive(Debug, Clone, Default)]
pub struct MemberSearch {
    /// Substring matched against name, email and member number.
    pub query: Option<String>,
    pub status: Option<MemberStatus>,
    pub is_active: Option<bool>,
    pub limit: u32,
    pub offset: u32,
}

//! Outputs of the member services.

use chrono::{DateTime, NaiveDate, Utc};
use membercard_database::{Benefit, Member, MemberStatus};
use serde::Serialize;

/// A member without any credential material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub member_number: String,
    pub status: MemberStatus,
    pub expiration_date: NaiveDate,
    pub is_active: bool,
    pub credential_source: &'static str,
    pub external_identity_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Member> for PublicMember {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            member_number: member.member_number.clone(),
            status: member.status,
            expiration_date: member.expiration_date,
            is_active: member.is_active,
            credential_source: member.credential.as_str(),
            external_identity_id: member.external_identity_id.clone(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl From<Member> for PublicMember {
    fn from(member: Member) -> Self {
        PublicMember::from(&member)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberPage {
    pub items: Vec<PublicMember>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Created { identity_id: String },
    AlreadyExists { identity_id: String },
}

impl ReconcileOutcome {
    pub fn identity_id(&self) -> &str {
        match self {
            ReconcileOutcome::Created { identity_id }
            | ReconcileOutcome::AlreadyExists { identity_id } => identity_id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Created { .. } => "created",
            ReconcileOutcome::AlreadyExists { .. } => "already_exists",
        }
    }
}

/// Summary of a bulk backfill run.
///
/// `total == created + already_exists + errors` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub created: usize,
    pub already_exists: usize,
    pub errors: usize,
    pub details: Vec<BackfillDetail>,
    pub failures: Vec<BackfillFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillDetail {
    pub email: String,
    pub member_id: String,
    pub outcome: &'static str,
    pub identity_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillFailure {
    pub email: String,
    pub member_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipCard {
    pub member: PublicMember,
    pub status_label: &'static str,
    pub benefits: Vec<Benefit>,
    pub expired: bool,
}

//! Wire types shared by the route handlers.

use chrono::{DateTime, NaiveDate, Utc};
use membercard_database::{Benefit, MemberStatus};
use membercard_members::{
    BackfillDetail, BackfillFailure, BackfillReport, MemberPage, MembershipCard, PublicMember,
    ValidationCode,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub member_number: String,
    /// bronze, silver, gold or diamond.
    pub status: String,
    pub status_label: String,
    pub expiration_date: NaiveDate,
    pub is_active: bool,
    /// legacy or managed.
    pub credential_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_identity_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PublicMember> for MemberResponse {
    fn from(member: PublicMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email,
            member_number: member.member_number,
            status: member.status.as_str().to_string(),
            status_label: member.status.label().to_string(),
            expiration_date: member.expiration_date,
            is_active: member.is_active,
            credential_source: member.credential_source.to_string(),
            external_identity_id: member.external_identity_id,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BenefitResponse {
    pub id: String,
    pub status: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Benefit> for BenefitResponse {
    fn from(benefit: Benefit) -> Self {
        Self {
            id: benefit.id,
            status: benefit.status.as_str().to_string(),
            title: benefit.title,
            description: benefit.description,
            discount_rate: benefit.discount_rate,
            created_at: benefit.created_at,
        }
    }
}

/// A message plus the affected member.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub member: MemberResponse,
}

impl MemberEnvelope {
    pub fn new(member: PublicMember) -> Self {
        Self {
            message: None,
            member: member.into(),
        }
    }

    pub fn with_message(message: &str, member: PublicMember) -> Self {
        Self {
            message: Some(message.to_string()),
            member: member.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or member number.
    pub identifier: String,
    pub password: String,
    /// web (default) or mobile.
    #[serde(default)]
    pub login_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequestBody {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to bronze.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberIdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BenefitsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BenefitsResponse {
    pub benefits: Vec<BenefitResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardResponse {
    pub member: MemberResponse,
    pub status_label: String,
    pub benefits: Vec<BenefitResponse>,
    pub expired: bool,
}

impl From<MembershipCard> for CardResponse {
    fn from(card: MembershipCard) -> Self {
        Self {
            member: card.member.into(),
            status_label: card.status_label.to_string(),
            benefits: card.benefits.into_iter().map(BenefitResponse::from).collect(),
            expired: card.expired,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkIdentityRequest {
    pub email: String,
    /// Credential for the identity when one has to be created.
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkIdentityResponse {
    pub message: String,
    /// created or already_exists.
    pub outcome: String,
    pub identity_id: String,
    pub member: MemberResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BackfillRequest {
    pub default_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackfillDetailResponse {
    pub email: String,
    pub member_id: String,
    pub outcome: String,
    pub identity_id: String,
}

impl From<BackfillDetail> for BackfillDetailResponse {
    fn from(detail: BackfillDetail) -> Self {
        Self {
            email: detail.email,
            member_id: detail.member_id,
            outcome: detail.outcome.to_string(),
            identity_id: detail.identity_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackfillFailureResponse {
    pub email: String,
    pub member_id: String,
    pub error: String,
}

impl From<BackfillFailure> for BackfillFailureResponse {
    fn from(failure: BackfillFailure) -> Self {
        Self {
            email: failure.email,
            member_id: failure.member_id,
            error: failure.message,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackfillResponse {
    pub message: String,
    pub total: usize,
    pub created: usize,
    pub already_exists: usize,
    pub errors: usize,
    pub details: Vec<BackfillDetailResponse>,
    pub failures: Vec<BackfillFailureResponse>,
}

impl BackfillResponse {
    pub fn new(message: &str, report: BackfillReport) -> Self {
        Self {
            message: message.to_string(),
            total: report.total,
            created: report.created,
            already_exists: report.already_exists,
            errors: report.errors,
            details: report.details.into_iter().map(Into::into).collect(),
            failures: report.failures.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberListParams {
    /// Matches name, email or member number.
    pub q: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberListResponse {
    pub members: Vec<MemberResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<MemberPage> for MemberListResponse {
    fn from(page: MemberPage) -> Self {
        Self {
            members: page.items.into_iter().map(MemberResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Parse a tier name, reporting `field` on failure.
pub fn parse_status(field: &'static str, value: &str) -> Result<MemberStatus, ApiError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| ApiError::invalid_field(field, ValidationCode::InvalidValue))
}

pub fn parse_optional_status(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<MemberStatus>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_status(field, v))
        .transpose()
}

/// A required query parameter that may be absent or blank.
pub fn required_param(field: &'static str, value: Option<String>) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::invalid_field(field, ValidationCode::Required))
}

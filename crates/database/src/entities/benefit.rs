//! Benefit entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub id: String,
    pub status: MemberStatus,
    pub title: String,
    pub description: String,
    /// Percentage in 0..=100.
    pub discount_rate: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBenefitRequest {
    pub status: MemberStatus,
    pub title: String,
    pub description: String,
    pub discount_rate: Option<i64>,
    pub is_active: bool,
}

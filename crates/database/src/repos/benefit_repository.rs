//! Benefit catalogue repository.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::entities::{Benefit, CreateBenefitRequest, MemberStatus};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct BenefitRepository {
    pool: SqlitePool,
}

impl BenefitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active benefits of a tier, oldest first.
    pub async fn list_active_by_status(&self, status: MemberStatus) -> DatabaseResult<Vec<Benefit>> {
        let rows = sqlx::query(
            "SELECT id, status, title, description, discount_rate, is_active, created_at, updated_at \
             FROM member_benefits WHERE status = ? AND is_active = 1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(benefit_from_row).collect()
    }

    pub async fn create(&self, request: &CreateBenefitRequest) -> DatabaseResult<Benefit> {
        if let Some(rate) = request.discount_rate {
            if !(0..=100).contains(&rate) {
                return Err(DatabaseError::InternalError(format!(
                    "discount rate {rate} outside 0..=100"
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO member_benefits (id, status, title, description, discount_rate, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(request.status.as_str())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.discount_rate)
        .bind(request.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        Ok(Benefit {
            id,
            status: request.status,
            title: request.title.clone(),
            description: request.description.clone(),
            discount_rate: request.discount_rate,
            is_active: request.is_active,
            created_at: now,
            updated_at: now,
        })
    }
}

fn benefit_from_row(row: &SqliteRow) -> DatabaseResult<Benefit> {
    let status: String = row.try_get("status")?;
    Ok(Benefit {
        id: row.try_get("id")?,
        status: status
            .parse()
            .map_err(|e| DatabaseError::InternalError(format!("benefit row: {e}")))?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        discount_rate: row.try_get("discount_rate")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

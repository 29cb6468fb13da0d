//! Append-only login audit log.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::entities::{CreateLoginLogRequest, LoginLog};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct LoginLogRepository {
    pool: SqlitePool,
}

impl LoginLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateLoginLogRequest) -> DatabaseResult<LoginLog> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO login_logs (id, member_id, login_type, ip_address, user_agent, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.member_id)
        .bind(request.login_type.as_str())
        .bind(&request.ip_address)
        .bind(&request.user_agent)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        Ok(LoginLog {
            id,
            member_id: request.member_id.clone(),
            login_type: request.login_type,
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
            created_at: now,
        })
    }

    /// Most recent entries first.
    pub async fn find_by_member(&self, member_id: &str, limit: u32) -> DatabaseResult<Vec<LoginLog>> {
        let rows = sqlx::query(
            "SELECT id, member_id, login_type, ip_address, user_agent, created_at \
             FROM login_logs WHERE member_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(member_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> DatabaseResult<LoginLog> {
                let login_type: String = row.try_get("login_type")?;
                Ok(LoginLog {
                    id: row.try_get("id")?,
                    member_id: row.try_get("member_id")?,
                    login_type: login_type.parse().map_err(DatabaseError::InternalError)?,
                    ip_address: row.try_get("ip_address")?,
                    user_agent: row.try_get("user_agent")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}

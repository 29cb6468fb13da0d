//! Repository for member data access operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{
    CreateMemberRequest, CredentialSource, Member, MemberLookup, MemberSearch, MemberStatus,
    UpdateMemberRequest,
};
use crate::types::{DatabaseError, DatabaseResult};

const MEMBER_COLUMNS: &str = "id, name, email, member_number, credential_source, password_hash, \
     status, expiration_date, is_active, external_identity_id, created_at, updated_at";

/// Repository for member database operations
#[derive(Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Exact-match lookup over active members.
    ///
    /// Returns every match so callers can detect ambiguous identifiers.
    pub async fn find_active(&self, lookup: MemberLookup<'_>) -> DatabaseResult<Vec<Member>> {
        let (column, value) = match lookup {
            MemberLookup::Email(email) => ("email", email),
            MemberLookup::MemberNumber(number) => ("member_number", number),
        };

        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {column} = ? AND is_active = 1 \
             ORDER BY created_at ASC"
        );

        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(member_from_row).collect()
    }

    /// Find a member by id regardless of activation state.
    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?");

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    /// All active members in creation order.
    pub async fn list_active(&self) -> DatabaseResult<Vec<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE is_active = 1 \
             ORDER BY created_at ASC, member_number ASC"
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(member_from_row).collect()
    }

    /// Filtered page of members plus the total number of matches.
    pub async fn search(&self, search: &MemberSearch) -> DatabaseResult<(Vec<Member>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM members");
        push_search_filters(&mut count_query, search);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let mut page_query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {MEMBER_COLUMNS} FROM members"));
        push_search_filters(&mut page_query, search);
        page_query
            .push(" ORDER BY created_at DESC, member_number DESC LIMIT ")
            .push_bind(i64::from(search.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(search.offset));

        let rows = page_query.build().fetch_all(&self.pool).await?;
        let members = rows
            .iter()
            .map(member_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok((members, u64::try_from(total).unwrap_or_default()))
    }

    /// Insert a new active member.
    pub async fn create(&self, request: &CreateMemberRequest) -> DatabaseResult<Member> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO members (id, name, email, member_number, credential_source, password_hash, \
             status, expiration_date, is_active, external_identity_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.member_number)
        .bind(request.credential.as_str())
        .bind(request.credential.password_hash())
        .bind(request.status.as_str())
        .bind(request.expiration_date)
        .bind(&request.external_identity_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        debug!(member_id = %id, member_number = %request.member_number, "member row inserted");

        self.find_by_id(&id).await?.ok_or_else(|| {
            DatabaseError::InternalError("failed to retrieve created member".to_string())
        })
    }

    /// Apply a partial update and bump `updated_at`.
    pub async fn update(&self, id: &str, request: &UpdateMemberRequest) -> DatabaseResult<Member> {
        if request.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("member {id}")));
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE members SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(name) = &request.name {
                assignments.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(email) = &request.email {
                assignments.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(status) = request.status {
                assignments
                    .push("status = ")
                    .push_bind_unseparated(status.as_str());
            }
            if let Some(expiration_date) = request.expiration_date {
                assignments
                    .push("expiration_date = ")
                    .push_bind_unseparated(expiration_date);
            }
            if let Some(is_active) = request.is_active {
                assignments
                    .push("is_active = ")
                    .push_bind_unseparated(is_active);
            }
            if let Some(password_hash) = &request.password_hash {
                assignments
                    .push("password_hash = ")
                    .push_bind_unseparated(password_hash.clone());
            }
            if let Some(identity_id) = &request.external_identity_id {
                assignments
                    .push("external_identity_id = ")
                    .push_bind_unseparated(identity_id.clone());
            }
            assignments
                .push("updated_at = ")
                .push_bind_unseparated(Utc::now());
        }
        query.push(" WHERE id = ").push_bind(id.to_string());

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("member {id}")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("member {id}")))
    }

    /// Next value of the per-year member number counter, starting at 1.
    pub async fn next_member_sequence(&self, year: i32) -> DatabaseResult<u32> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO member_number_sequences (year, last_value) VALUES (?, 1) \
             ON CONFLICT(year) DO UPDATE SET last_value = last_value + 1 \
             RETURNING last_value",
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(value).map_err(|_| {
            DatabaseError::InternalError(format!("member sequence overflow for {year}"))
        })
    }
}

fn push_search_filters(query: &mut QueryBuilder<'_, Sqlite>, search: &MemberSearch) {
    query.push(" WHERE 1 = 1");

    if let Some(term) = search
        .query
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        let pattern = format!("%{term}%");
        query
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR email LIKE ")
            .push_bind(pattern.clone())
            .push(" OR member_number LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(status) = search.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(is_active) = search.is_active {
        query.push(" AND is_active = ").push_bind(is_active);
    }
}

fn member_from_row(row: &SqliteRow) -> DatabaseResult<Member> {
    let id: String = row.try_get("id")?;

    let status_raw: String = row.try_get("status")?;
    let status = status_raw
        .parse::<MemberStatus>()
        .map_err(|e| DatabaseError::InternalError(format!("member {id}: {e}")))?;

    let source: String = row.try_get("credential_source")?;
    let password_hash: Option<String> = row.try_get("password_hash")?;
    let credential = match (source.as_str(), password_hash) {
        ("managed", _) => CredentialSource::Managed,
        ("legacy", Some(password_hash)) => CredentialSource::Legacy { password_hash },
        ("legacy", None) => {
            return Err(DatabaseError::InternalError(format!(
                "member {id} has a legacy credential without a password hash"
            )))
        }
        (other, _) => {
            return Err(DatabaseError::InternalError(format!(
                "member {id} has unknown credential source '{other}'"
            )))
        }
    };

    Ok(Member {
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        member_number: row.try_get("member_number")?,
        credential,
        status,
        expiration_date: row.try_get("expiration_date")?,
        is_active: row.try_get("is_active")?,
        external_identity_id: row.try_get("external_identity_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        id,
    })
}

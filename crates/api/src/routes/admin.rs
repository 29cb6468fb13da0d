use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use membercard_members::{AdminMemberUpdate, MemberListQuery};

use crate::{
    messages,
    routes::models::{
        parse_optional_status, AdminUpdateMemberRequest, BackfillRequest, BackfillResponse,
        LinkIdentityRequest, LinkIdentityResponse, MemberEnvelope, MemberListParams,
        MemberListResponse,
    },
    util::require_admin,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/identities/link",
    tag = "Admin",
    security(("bearerAuth" = [])),
    request_body = LinkIdentityRequest,
    responses(
        (status = 200, description = "Member linked to an identity", body = LinkIdentityResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 404, description = "No active member with this email", body = crate::error::ErrorResponse),
        (status = 502, description = "Identity service error", body = crate::error::ErrorResponse),
        (status = 503, description = "Admin routes disabled", body = crate::error::ErrorResponse)
    )
)]
pub async fn link_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LinkIdentityRequest>,
) -> Result<Json<LinkIdentityResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let (member, outcome) = state
        .services()
        .admin
        .link_by_email(&payload.email, &payload.password)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(LinkIdentityResponse {
        message: messages::IDENTITY_LINKED.to_string(),
        outcome: outcome.as_str().to_string(),
        identity_id: outcome.identity_id().to_string(),
        member: member.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/identities/backfill",
    tag = "Admin",
    security(("bearerAuth" = [])),
    request_body = BackfillRequest,
    responses(
        (status = 200, description = "Backfill report", body = BackfillResponse),
        (status = 400, description = "Invalid default password", body = crate::error::ErrorResponse),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 500, description = "Members could not be loaded", body = crate::error::ErrorResponse),
        (status = 503, description = "Admin routes disabled", body = crate::error::ErrorResponse)
    )
)]
pub async fn backfill_identities(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BackfillRequest>,
) -> Result<Json<BackfillResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let report = state
        .services()
        .backfill
        .run(&payload.default_password)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(BackfillResponse::new(
        messages::BACKFILL_FINISHED,
        report,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/members",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(MemberListParams),
    responses(
        (status = 200, description = "Page of members", body = MemberListResponse),
        (status = 400, description = "Invalid filter or paging", body = crate::error::ErrorResponse),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 503, description = "Admin routes disabled", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<MemberListParams>,
) -> Result<Json<MemberListResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let query = MemberListQuery {
        query: params.q,
        status: parse_optional_status("status", params.status.as_deref())?,
        is_active: params.is_active,
        page: params.page,
        limit: params.limit,
    };

    let page = state
        .services()
        .admin
        .list(&query)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/members/{member_id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("member_id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member, active or not", body = MemberEnvelope),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    require_admin(&state, &headers)?;

    let member = state
        .services()
        .admin
        .get(&member_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::new(member)))
}

#[utoipa::path(
    put,
    path = "/api/admin/members/{member_id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("member_id" = String, Path, description = "Member id")),
    request_body = AdminUpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberEnvelope),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
    Json(payload): Json<AdminUpdateMemberRequest>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    require_admin(&state, &headers)?;

    let update = AdminMemberUpdate {
        name: payload.name,
        email: payload.email,
        status: parse_optional_status("status", payload.status.as_deref())?,
        expiration_date: payload.expiration_date,
        is_active: payload.is_active,
    };

    let member = state
        .services()
        .admin
        .update(&member_id, &update)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::with_message(
        messages::MEMBER_UPDATED,
        member,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/members/{member_id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("member_id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member deactivated", body = MemberEnvelope),
        (status = 401, description = "Admin token required", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn deactivate_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    require_admin(&state, &headers)?;

    let member = state
        .services()
        .admin
        .deactivate(&member_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::with_message(
        messages::MEMBER_DELETED,
        member,
    )))
}

use axum::{
    extract::{Query, State},
    Json,
};
use membercard_members::ProfileUpdate;

use crate::{
    messages,
    routes::models::{required_param, MemberEnvelope, MemberIdQuery, UpdateProfileRequest},
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    params(MemberIdQuery),
    responses(
        (status = 200, description = "Member profile", body = MemberEnvelope),
        (status = 400, description = "Missing member id", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Query(params): Query<MemberIdQuery>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    let member_id = required_param("id", params.id)?;

    let member = state
        .services()
        .profiles
        .get(&member_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::new(member)))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MemberEnvelope),
        (status = 400, description = "Invalid profile payload or current password", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    let member_id = required_param("id", Some(payload.id))?;
    let update = ProfileUpdate {
        name: payload.name,
        email: payload.email,
        current_password: payload.current_password,
        new_password: payload.new_password,
        confirm_password: payload.confirm_password,
    };

    let member = state
        .services()
        .profiles
        .update(&member_id, &update)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::with_message(
        messages::PROFILE_UPDATED,
        member,
    )))
}

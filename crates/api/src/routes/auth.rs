use axum::{extract::State, http::HeaderMap, Json};
use membercard_database::LoginChannel;
use membercard_members::{LoginAttempt, RegisterRequest, ValidationCode};

use crate::{
    messages,
    routes::models::{parse_optional_status, LoginRequest, MemberEnvelope, RegisterRequestBody},
    util::{client_ip, user_agent},
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = MemberEnvelope),
        (status = 400, description = "Invalid login payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 502, description = "Identity service unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    let channel = match payload.login_type.as_deref().map(str::trim) {
        None | Some("") => LoginChannel::Web,
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::invalid_field("login_type", ValidationCode::InvalidValue))?,
    };

    let attempt = LoginAttempt {
        identifier: payload.identifier,
        password: payload.password,
        channel,
        ip_address: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    let member = state
        .services()
        .login
        .login(&attempt)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::with_message(messages::LOGIN_SUCCESS, member)))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequestBody,
    responses(
        (status = 200, description = "Member registered", body = MemberEnvelope),
        (status = 400, description = "Invalid registration payload", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 502, description = "Identity service unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequestBody>,
) -> Result<Json<MemberEnvelope>, ApiError> {
    let status = parse_optional_status("status", payload.status.as_deref())?;

    let member = state
        .services()
        .registration
        .register(RegisterRequest {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            status,
        })
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(MemberEnvelope::with_message(
        messages::REGISTER_SUCCESS,
        member,
    )))
}

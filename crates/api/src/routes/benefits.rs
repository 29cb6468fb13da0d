use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    routes::models::{
        parse_status, required_param, BenefitResponse, BenefitsQuery, BenefitsResponse,
        CardResponse, MemberIdQuery,
    },
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/benefits",
    tag = "Benefits",
    params(BenefitsQuery),
    responses(
        (status = 200, description = "Active benefits for the tier", body = BenefitsResponse),
        (status = 400, description = "Missing or unknown tier", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_benefits(
    State(state): State<AppState>,
    Query(params): Query<BenefitsQuery>,
) -> Result<Json<BenefitsResponse>, ApiError> {
    let status = parse_status("status", &required_param("status", params.status)?)?;

    let benefits = state
        .services()
        .benefits
        .benefits_for(status)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(BenefitsResponse {
        benefits: benefits.into_iter().map(BenefitResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/card",
    tag = "Benefits",
    params(MemberIdQuery),
    responses(
        (status = 200, description = "Digital membership card", body = CardResponse),
        (status = 400, description = "Missing member id", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn membership_card(
    State(state): State<AppState>,
    Query(params): Query<MemberIdQuery>,
) -> Result<Json<CardResponse>, ApiError> {
    let member_id = required_param("id", params.id)?;

    let card = state
        .services()
        .benefits
        .card(&member_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(card.into()))
}

//! HTTP surface of the membership card portal.

mod docs;
mod error;
mod messages;
mod state;
mod util;

pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse, FieldErrorResponse};
pub use state::{ApiServices, ApiSettings, AppState};

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_document))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/register", post(routes::auth::register))
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route("/api/benefits", get(routes::benefits::list_benefits))
        .route("/api/card", get(routes::benefits::membership_card))
        // Admin routes
        .route(
            "/api/admin/identities/link",
            post(routes::admin::link_identity),
        )
        .route(
            "/api/admin/identities/backfill",
            post(routes::admin::backfill_identities),
        )
        .route("/api/admin/members", get(routes::admin::list_members))
        .route(
            "/api/admin/members/:member_id",
            get(routes::admin::get_member)
                .put(routes::admin::update_member)
                .delete(routes::admin::deactivate_member),
        )
        .with_state(state)
        .layer(cors_layer())
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

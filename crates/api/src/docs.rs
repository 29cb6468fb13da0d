use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::register,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::benefits::list_benefits,
        crate::routes::benefits::membership_card,
        crate::routes::admin::link_identity,
        crate::routes::admin::backfill_identities,
        crate::routes::admin::list_members,
        crate::routes::admin::get_member,
        crate::routes::admin::update_member,
        crate::routes::admin::deactivate_member
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::FieldErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::MemberResponse,
            crate::routes::models::MemberEnvelope,
            crate::routes::models::BenefitResponse,
            crate::routes::models::BenefitsResponse,
            crate::routes::models::CardResponse,
            crate::routes::models::LoginRequest,
            crate::routes::models::RegisterRequestBody,
            crate::routes::models::UpdateProfileRequest,
            crate::routes::models::LinkIdentityRequest,
            crate::routes::models::LinkIdentityResponse,
            crate::routes::models::BackfillRequest,
            crate::routes::models::BackfillResponse,
            crate::routes::models::BackfillDetailResponse,
            crate::routes::models::BackfillFailureResponse,
            crate::routes::models::MemberListResponse,
            crate::routes::models::AdminUpdateMemberRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Member login and registration"),
        (name = "Profile", description = "Member profile management"),
        (name = "Benefits", description = "Tier benefits and the membership card"),
        (name = "Admin", description = "Member administration and identity linking")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/auth/register",
            "/api/profile",
            "/api/benefits",
            "/api/card",
            "/api/admin/identities/link",
            "/api/admin/identities/backfill",
            "/api/admin/members",
            "/api/admin/members/{member_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

use std::sync::Arc;

use membercard_members::{
    AdminService, BackfillService, BenefitService, LoginService, MemberError, ProfileService,
    RegistrationService,
};

use crate::ApiError;

/// The member services the handlers call into.
#[derive(Clone)]
pub struct ApiServices {
    pub login: LoginService,
    pub registration: RegistrationService,
    pub profiles: ProfileService,
    pub benefits: BenefitService,
    pub admin: AdminService,
    pub backfill: BackfillService,
}

#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    /// Bearer token for `/api/admin`; admin routes answer 503 without one.
    pub admin_token: Option<String>,
    /// Attach upstream error detail to responses.
    pub expose_error_details: bool,
}

#[derive(Clone)]
pub struct AppState {
    services: Arc<ApiServices>,
    settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(services: ApiServices, settings: ApiSettings) -> Self {
        Self {
            services: Arc::new(services),
            settings: Arc::new(settings),
        }
    }

    pub fn services(&self) -> &ApiServices {
        &self.services
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.settings.admin_token.as_deref()
    }

    /// Convert a service error, dropping upstream detail outside development.
    pub fn reject(&self, error: MemberError) -> ApiError {
        let api_error = ApiError::from(error);
        if self.settings.expose_error_details {
            api_error
        } else {
            api_error.without_details()
        }
    }
}

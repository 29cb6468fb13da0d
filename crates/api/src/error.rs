use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use membercard_members::{MemberError, ValidationCode, ValidationErrors};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::messages;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Localized message safe to show to end users.
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorResponse>,
    /// Upstream detail, development only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: Vec::new(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", messages::UNAUTHORIZED)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", messages::FORBIDDEN)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// A single-field validation failure raised at the HTTP boundary.
    pub fn invalid_field(field: &'static str, code: ValidationCode) -> Self {
        Self::validation(&ValidationErrors::single(field, code))
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut api_error = Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            messages::VALIDATION_ERROR,
        );
        api_error.fields = errors
            .fields()
            .iter()
            .map(|field| FieldErrorResponse {
                field: field.field.to_string(),
                code: validation_code(field.code).to_string(),
                message: messages::validation_message(field.field, field.code).to_string(),
            })
            .collect();
        api_error
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn without_details(mut self) -> Self {
        self.details = None;
        self
    }
}

fn validation_code(code: ValidationCode) -> &'static str {
    match code {
        ValidationCode::Required => "REQUIRED",
        ValidationCode::TooLong => "TOO_LONG",
        ValidationCode::InvalidEmail => "INVALID_EMAIL",
        ValidationCode::PasswordTooShort => "PASSWORD_TOO_SHORT",
        ValidationCode::PasswordChangeIncomplete => "PASSWORD_CHANGE_INCOMPLETE",
        ValidationCode::OutOfRange => "OUT_OF_RANGE",
        ValidationCode::InvalidValue => "INVALID_VALUE",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            fields: self.fields,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<MemberError> for ApiError {
    fn from(error: MemberError) -> Self {
        match error {
            MemberError::Validation(errors) => Self::validation(&errors),
            MemberError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                messages::INVALID_CREDENTIALS,
            ),
            MemberError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_FOUND",
                messages::MEMBER_NOT_FOUND,
            ),
            MemberError::EmailAlreadyExists => Self::new(
                StatusCode::CONFLICT,
                "EMAIL_ALREADY_EXISTS",
                messages::EMAIL_ALREADY_EXISTS,
            ),
            MemberError::MemberNumberAlreadyExists => Self::new(
                StatusCode::CONFLICT,
                "MEMBER_NUMBER_ALREADY_EXISTS",
                messages::MEMBER_NUMBER_ALREADY_EXISTS,
            ),
            MemberError::InvalidCurrentPassword => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CURRENT_PASSWORD",
                messages::INVALID_CURRENT_PASSWORD,
            ),
            MemberError::PasswordMismatch => Self::new(
                StatusCode::BAD_REQUEST,
                "PASSWORD_MISMATCH",
                messages::PASSWORD_MISMATCH,
            ),
            MemberError::Identity(ref source) => {
                warn!(error = %source, "identity service error");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "IDENTITY_SERVICE_ERROR",
                    messages::IDENTITY_ERROR,
                )
                .with_details(error.to_string())
            }
            MemberError::Store(_) | MemberError::PasswordHash(_) => {
                error!(error = %error, "internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    messages::SERVER_ERROR,
                )
                .with_details(error.to_string())
            }
        }
    }
}

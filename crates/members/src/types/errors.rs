//! Error types for the member services.

use std::fmt;

use membercard_database::DatabaseError;
use membercard_identity::IdentityError;
use serde::Serialize;
use thiserror::Error;

/// Why a single input field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    Required,
    TooLong,
    InvalidEmail,
    PasswordTooShort,
    /// A password change needs current, new and confirmation together.
    PasswordChangeIncomplete,
    OutOfRange,
    /// Not one of the accepted values, e.g. an unknown tier.
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: ValidationCode,
}

/// Field-scoped validation failures, collected before any backend call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, code: ValidationCode) -> Self {
        let mut errors = Self::new();
        errors.add(field, code);
        errors
    }

    pub fn add(&mut self, field: &'static str, code: ValidationCode) {
        self.0.push(FieldError { field, code });
    }

    /// Record the outcome of a field check.
    pub fn check(&mut self, field: &'static str, result: Result<(), ValidationCode>) {
        if let Err(code) = result {
            self.add(field, code);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has(&self, field: &str, code: ValidationCode) -> bool {
        self.0.iter().any(|error| error.field == field && error.code == code)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> MemberResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MemberError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {:?}", error.field, error.code))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Errors surfaced by the member services.
#[derive(Debug, Error)]
pub enum MemberError {
    #[error("validation failed ({0})")]
    Validation(ValidationErrors),

    /// Generic login failure; the precise cause is only logged.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("member not found")]
    NotFound,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("member number already exists")]
    MemberNumberAlreadyExists,

    #[error("current password is incorrect")]
    InvalidCurrentPassword,

    #[error("new password and confirmation do not match")]
    PasswordMismatch,

    #[error("identity service error: {0}")]
    Identity(#[from] IdentityError),

    #[error("member store error: {0}")]
    Store(DatabaseError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl MemberError {
    pub fn validation(field: &'static str, code: ValidationCode) -> Self {
        MemberError::Validation(ValidationErrors::single(field, code))
    }
}

impl From<DatabaseError> for MemberError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Duplicate(ref column) if column == "email" => {
                MemberError::EmailAlreadyExists
            }
            DatabaseError::Duplicate(ref column) if column == "member_number" => {
                MemberError::MemberNumberAlreadyExists
            }
            DatabaseError::NotFound(_) => MemberError::NotFound,
            other => MemberError::Store(other),
        }
    }
}

pub type MemberResult<T> = Result<T, MemberError>;

/// Internal reason a login attempt was refused. Never leaves the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginFailure {
    NotFound,
    Ambiguous(usize),
    PasswordMismatch,
}

impl LoginFailure {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            LoginFailure::NotFound => "not_found",
            LoginFailure::Ambiguous(_) => "ambiguous",
            LoginFailure::PasswordMismatch => "password_mismatch",
        }
    }
}

//! Shared request, response and error types.

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{FieldError, MemberError, MemberResult, ValidationCode, ValidationErrors};
pub use requests::{
    AdminMemberUpdate, LoginAttempt, MemberListQuery, MembershipPolicy, ProfileUpdate,
    RegisterRequest,
};
pub use responses::{
    BackfillDetail, BackfillFailure, BackfillReport, MemberPage, MembershipCard, PublicMember,
    ReconcileOutcome,
};

//! # Membercard Members Crate
//!
//! Member-facing and administrative business logic for the membership card
//! portal: login resolution, identity reconciliation and backfill,
//! registration, profile updates, benefits and the membership card.
//!
//! ## Architecture
//!
//! - **Repositories**: storage traits implemented by the SQLite repositories
//! - **Services**: business rules, one service per use case
//! - **Types**: requests, responses and [`MemberError`]
//! - **Utils**: validation, password hashing, member numbers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use membercard_members::{LoginAttempt, LoginService};
//!
//! let service = LoginService::new(members, identity, login_logs, 8);
//! let member = service.login(&attempt).await?;
//! ```

pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use membercard_database::{
    Benefit, CredentialSource, LoginChannel, Member, MemberStatus, SqlitePool,
};

pub use repositories::{BenefitStore, LoginLogStore, MemberStore};
pub use services::{
    AdminService, BackfillService, BenefitService, LoginService, ProfileService,
    ReconciliationService, RegistrationService,
};
pub use types::{
    AdminMemberUpdate, BackfillDetail, BackfillFailure, BackfillReport, FieldError, LoginAttempt,
    MemberError, MemberListQuery, MemberPage, MemberResult, MembershipCard, MembershipPolicy,
    ProfileUpdate, PublicMember, ReconcileOutcome, RegisterRequest, ValidationCode,
    ValidationErrors,
};

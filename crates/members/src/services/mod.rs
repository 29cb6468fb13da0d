//! Business logic services for member accounts.
//!
//! Each service holds its stores as `Arc<dyn ...>` and is cheap to clone.

pub mod admin_service;
pub mod backfill;
pub mod benefit_service;
mod identity_sync;
pub mod login_service;
pub mod profile_service;
pub mod reconciliation;
pub mod registration;
#[cfg(test)]
mod mock_repositories;

pub use admin_service::AdminService;
pub use backfill::BackfillService;
pub use benefit_service::BenefitService;
pub use login_service::LoginService;
pub use profile_service::ProfileService;
pub use reconciliation::ReconciliationService;
pub use registration::RegistrationService;

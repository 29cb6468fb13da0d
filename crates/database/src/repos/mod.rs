//! Database repository implementations

pub mod benefit_repository;
pub mod login_log_repository;
pub mod member_repository;

pub use benefit_repository::*;
pub use login_log_repository::*;
pub use member_repository::*;

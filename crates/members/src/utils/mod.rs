//! Internal helpers shared by the services.

pub mod member_number;
pub mod password;
pub mod validation;

pub use member_number::{expiration_after, format_member_number};
pub use password::{generate_random_password, hash_password, verify_password};

//! Domain entities for the database layer

pub mod benefit;
pub mod login_log;
pub mod member;

pub use benefit::{Benefit, CreateBenefitRequest};
pub use login_log::{CreateLoginLogRequest, LoginChannel, LoginLog};
pub use member::{
    CreateMemberRequest, CredentialSource, Member, MemberLookup, MemberSearch, MemberStatus,
    UnknownMemberStatus, UpdateMemberRequest,
};

//! Storage seams used by the services.
//!
//! Services hold these as `Arc<dyn ...>` so the SQLite repositories and the
//! in-memory mocks are interchangeable.

use async_trait::async_trait;
use membercard_database::{
    Benefit, BenefitRepository, CreateLoginLogRequest, CreateMemberRequest, DatabaseResult,
    LoginLogRepository, Member, MemberLookup, MemberRepository, MemberSearch, MemberStatus,
    UpdateMemberRequest,
};

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Exact match over active members; may return more than one row.
    async fn find_active(&self, lookup: MemberLookup<'_>) -> DatabaseResult<Vec<Member>>;
    async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Member>>;
    async fn list_active(&self) -> DatabaseResult<Vec<Member>>;
    async fn search(&self, search: &MemberSearch) -> DatabaseResult<(Vec<Member>, u64)>;
    async fn create(&self, request: &CreateMemberRequest) -> DatabaseResult<Member>;
    async fn update(&self, id: &str, request: &UpdateMemberRequest) -> DatabaseResult<Member>;
    async fn next_member_sequence(&self, year: i32) -> DatabaseResult<u32>;
}

#[async_trait]
pub trait BenefitStore: Send + Sync {
    async fn list_active_by_status(&self, status: MemberStatus) -> DatabaseResult<Vec<Benefit>>;
}

#[async_trait]
pub trait LoginLogStore: Send + Sync {
    async fn append(&self, request: &CreateLoginLogRequest) -> DatabaseResult<()>;
}

#[async_trait]
impl MemberStore for MemberRepository {
    async fn find_active(&self, lookup: MemberLookup<'_>) -> DatabaseResult<Vec<Member>> {
        MemberRepository::find_active(self, lookup).await
    }

    async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Member>> {
        MemberRepository::find_by_id(self, id).await
    }

    async fn list_active(&self) -> DatabaseResult<Vec<Member>> {
        MemberRepository::list_active(self).await
    }

    async fn search(&self, search: &MemberSearch) -> DatabaseResult<(Vec<Member>, u64)> {
        MemberRepository::search(self, search).await
    }

    async fn create(&self, request: &CreateMemberRequest) -> DatabaseResult<Member> {
        MemberRepository::create(self, request).await
    }

    async fn update(&self, id: &str, request: &UpdateMemberRequest) -> DatabaseResult<Member> {
        MemberRepository::update(self, id, request).await
    }

    async fn next_member_sequence(&self, year: i32) -> DatabaseResult<u32> {
        MemberRepository::next_member_sequence(self, year).await
    }
}

#[async_trait]
impl BenefitStore for BenefitRepository {
    async fn list_active_by_status(&self, status: MemberStatus) -> DatabaseResult<Vec<Benefit>> {
        BenefitRepository::list_active_by_status(self, status).await
    }
}

#[async_trait]
impl LoginLogStore for LoginLogRepository {
    async fn append(&self, request: &CreateLoginLogRequest) -> DatabaseResult<()> {
        self.create(request).await.map(|_| ())
    }
}

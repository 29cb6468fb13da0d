//! Back-office member management.

use std::sync::Arc;

use membercard_database::{Member, MemberSearch, UpdateMemberRequest};
use membercard_identity::IdentityProvider;
use tracing::info;

use crate::repositories::MemberStore;
use crate::services::identity_sync::{self, IdentityChange};
use crate::services::reconciliation::ReconciliationService;
use crate::types::{
    AdminMemberUpdate, MemberError, MemberListQuery, MemberPage, MemberResult, PublicMember,
    ReconcileOutcome, ValidationCode, ValidationErrors,
};
use crate::utils::validation::{validate_email, validate_name};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct AdminService {
    members: Arc<dyn MemberStore>,
    identity: Arc<dyn IdentityProvider>,
    reconciliation: ReconciliationService,
}

impl AdminService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        identity: Arc<dyn IdentityProvider>,
        reconciliation: ReconciliationService,
    ) -> Self {
        Self {
            members,
            identity,
            reconciliation,
        }
    }

    pub async fn list(&self, query: &MemberListQuery) -> MemberResult<MemberPage> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        let mut errors = ValidationErrors::new();
        if page == 0 {
            errors.add("page", ValidationCode::OutOfRange);
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            errors.add("limit", ValidationCode::OutOfRange);
        }
        errors.into_result()?;

        let search = MemberSearch {
            query: query
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            status: query.status,
            is_active: query.is_active,
            limit,
            offset: (page - 1).saturating_mul(limit),
        };
        let (members, total) = self.members.search(&search).await?;

        Ok(MemberPage {
            items: members.into_iter().map(PublicMember::from).collect(),
            total,
            page,
            limit,
        })
    }

    /// Any member, active or not.
    pub async fn get(&self, member_id: &str) -> MemberResult<PublicMember> {
        self.member(member_id).await.map(PublicMember::from)
    }

    /// An email change of a linked member also moves its identity.
    pub async fn update(
        &self,
        member_id: &str,
        update: &AdminMemberUpdate,
    ) -> MemberResult<PublicMember> {
        let name = update.name.as_deref().map(str::trim);
        let email = update.email.as_deref().map(str::trim);

        let mut errors = ValidationErrors::new();
        if let Some(name) = name {
            errors.check("name", validate_name(name));
        }
        if let Some(email) = email {
            errors.check("email", validate_email(email));
        }
        errors.into_result()?;

        let member = self.member(member_id).await?;
        let patch = UpdateMemberRequest {
            name: name.map(str::to_string),
            email: email.filter(|e| *e != member.email).map(str::to_string),
            status: update.status,
            expiration_date: update.expiration_date,
            is_active: update.is_active,
            ..Default::default()
        };

        let identity_change = IdentityChange {
            email: patch.email.as_deref(),
            ..Default::default()
        };
        let updated = identity_sync::apply(
            self.members.as_ref(),
            self.identity.as_ref(),
            &member,
            &patch,
            identity_change,
        )
        .await?;
        info!(member_id = %updated.id, "member updated by administrator");
        Ok(PublicMember::from(updated))
    }

    /// Soft delete. The row and its number stay; the email is freed.
    pub async fn deactivate(&self, member_id: &str) -> MemberResult<PublicMember> {
        let patch = UpdateMemberRequest {
            is_active: Some(false),
            ..Default::default()
        };
        let updated = self.members.update(member_id, &patch).await?;
        info!(member_id = %updated.id, "member deactivated");
        Ok(PublicMember::from(updated))
    }

    pub async fn link_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> MemberResult<(PublicMember, ReconcileOutcome)> {
        let (member, outcome) = self
            .reconciliation
            .reconcile_by_email(email.trim(), password)
            .await?;
        Ok((PublicMember::from(member), outcome))
    }

    async fn member(&self, member_id: &str) -> MemberResult<Member> {
        self.members
            .find_by_id(member_id)
            .await?
            .ok_or(MemberError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_repositories::MockMemberRepository;
    use membercard_database::MemberStatus;
    use membercard_identity::InMemoryIdentityProvider;

    fn service(members: &MockMemberRepository) -> AdminService {
        service_with(members, &InMemoryIdentityProvider::new())
    }

    fn service_with(
        members: &MockMemberRepository,
        identity: &InMemoryIdentityProvider,
    ) -> AdminService {
        let reconciliation = ReconciliationService::new(
            Arc::new(members.clone()),
            Arc::new(identity.clone()),
            8,
        );
        AdminService::new(
            Arc::new(members.clone()),
            Arc::new(identity.clone()),
            reconciliation,
        )
    }

    async fn seed(members: &MockMemberRepository, count: usize) {
        for i in 1..=count {
            members
                .insert_legacy(
                    &format!("会員{i}"),
                    &format!("member{i}@x.com"),
                    &format!("M-2024-{i:04}"),
                    "secret12",
                )
                .await;
        }
    }

    #[tokio::test]
    async fn list_pages_results() {
        let members = MockMemberRepository::new();
        seed(&members, 5).await;

        let page = service(&members)
            .list(&MemberListQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 2);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn list_applies_defaults_and_filters() {
        let members = MockMemberRepository::new();
        seed(&members, 3).await;

        let svc = service(&members);
        let all = svc.list(&MemberListQuery::default()).await.unwrap();
        assert_eq!(all.page, 1);
        assert_eq!(all.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(all.total, 3);

        let found = svc
            .list(&MemberListQuery {
                query: Some(" member2@ ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].email, "member2@x.com");

        let none = svc
            .list(&MemberListQuery {
                status: Some(MemberStatus::Diamond),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_paging() {
        let members = MockMemberRepository::new();
        let svc = service(&members);

        for query in [
            MemberListQuery {
                page: Some(0),
                ..Default::default()
            },
            MemberListQuery {
                limit: Some(0),
                ..Default::default()
            },
            MemberListQuery {
                limit: Some(MAX_PAGE_LIMIT + 1),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                svc.list(&query).await,
                Err(MemberError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn deactivated_members_remain_visible_to_admins() {
        let members = MockMemberRepository::new();
        let member = members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        let svc = service(&members);

        let deactivated = svc.deactivate(&member.id).await.unwrap();
        assert!(!deactivated.is_active);

        let fetched = svc.get(&member.id).await.unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn update_changes_tier_and_expiration() {
        let members = MockMemberRepository::new();
        let member = members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        let expiration = chrono::NaiveDate::from_ymd_opt(2030, 3, 31).unwrap();

        let updated = service(&members)
            .update(
                &member.id,
                &AdminMemberUpdate {
                    status: Some(MemberStatus::Diamond),
                    expiration_date: Some(expiration),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, MemberStatus::Diamond);
        assert_eq!(updated.expiration_date, expiration);
    }

    #[tokio::test]
    async fn update_validates_email_and_detects_conflicts() {
        let members = MockMemberRepository::new();
        let member = members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        members.insert_legacy("佐藤花子", "b@x.com", "M-2", "secret12").await;
        let svc = service(&members);

        let invalid = svc
            .update(
                &member.id,
                &AdminMemberUpdate {
                    email: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(invalid, Err(MemberError::Validation(_))));

        let conflict = svc
            .update(
                &member.id,
                &AdminMemberUpdate {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(conflict, Err(MemberError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let members = MockMemberRepository::new();
        let svc = service(&members);

        assert!(matches!(svc.get("missing").await, Err(MemberError::NotFound)));
        assert!(matches!(svc.deactivate("missing").await, Err(MemberError::NotFound)));
    }

    #[tokio::test]
    async fn link_by_email_requires_active_member() {
        let members = MockMemberRepository::new();
        let svc = service(&members);

        assert!(matches!(
            svc.link_by_email("ghost@x.com", "member123").await,
            Err(MemberError::NotFound)
        ));

        members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        let (member, outcome) = svc.link_by_email("a@x.com", "member123").await.unwrap();
        assert_eq!(member.email, "a@x.com");
        assert!(matches!(outcome, ReconcileOutcome::Created { .. }));
    }

    #[tokio::test]
    async fn email_change_follows_linked_identity() {
        let members = MockMemberRepository::new();
        let identity = InMemoryIdentityProvider::new();
        members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        let svc = service_with(&members, &identity);
        let (member, _) = svc.link_by_email("a@x.com", "member123").await.unwrap();

        svc.update(
            &member.id,
            &AdminMemberUpdate {
                email: Some("b@x.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (_, outcome) = svc.link_by_email("b@x.com", "member123").await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::AlreadyExists { .. }));
        assert_eq!(identity.len().await, 1);
    }

    #[tokio::test]
    async fn identity_rejection_leaves_member_unchanged() {
        let members = MockMemberRepository::new();
        let identity = InMemoryIdentityProvider::new();
        members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        let svc = service_with(&members, &identity);
        let (member, _) = svc.link_by_email("a@x.com", "member123").await.unwrap();
        identity.fail_updates(true);

        let result = svc
            .update(
                &member.id,
                &AdminMemberUpdate {
                    email: Some("b@x.com".to_string()),
                    status: Some(MemberStatus::Diamond),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(MemberError::Identity(_))));
        let stored = members.get(&member.id).await.unwrap();
        assert_eq!(stored.email, "a@x.com");
        assert_eq!(stored.status, member.status);
    }
}

use std::sync::Arc;

use chrono::Utc;
use membercard_database::{Benefit, MemberStatus};

use crate::repositories::{BenefitStore, MemberStore};
use crate::types::{MemberError, MemberResult, MembershipCard, PublicMember};

/// Tier benefits and the digital membership card.
#[derive(Clone)]
pub struct BenefitService {
    members: Arc<dyn MemberStore>,
    benefits: Arc<dyn BenefitStore>,
}

impl BenefitService {
    pub fn new(members: Arc<dyn MemberStore>, benefits: Arc<dyn BenefitStore>) -> Self {
        Self { members, benefits }
    }

    /// Active benefits for a tier, oldest first.
    pub async fn benefits_for(&self, status: MemberStatus) -> MemberResult<Vec<Benefit>> {
        Ok(self.benefits.list_active_by_status(status).await?)
    }

    pub async fn card(&self, member_id: &str) -> MemberResult<MembershipCard> {
        let member = match self.members.find_by_id(member_id).await? {
            Some(member) if member.is_active => member,
            _ => return Err(MemberError::NotFound),
        };

        let benefits = self.benefits_for(member.status).await?;
        let expired = member.expiration_date < Utc::now().date_naive();

        Ok(MembershipCard {
            status_label: member.status.label(),
            benefits,
            expired,
            member: PublicMember::from(member),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_repositories::{MockBenefitRepository, MockMemberRepository};
    use chrono::Duration;
    use membercard_database::UpdateMemberRequest;

    #[tokio::test]
    async fn benefits_are_filtered_by_tier_and_activity() {
        let members = MockMemberRepository::new();
        let benefits = MockBenefitRepository::new();
        benefits.add(MemberStatus::Gold, "ラウンジ", true).await;
        benefits.add(MemberStatus::Gold, "終了した特典", false).await;
        benefits.add(MemberStatus::Gold, "駐車場", true).await;
        benefits.add(MemberStatus::Silver, "シルバー特典", true).await;

        let service = BenefitService::new(Arc::new(members), Arc::new(benefits));
        let gold = service.benefits_for(MemberStatus::Gold).await.unwrap();

        let titles: Vec<_> = gold.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["ラウンジ", "駐車場"]);
        assert!(service
            .benefits_for(MemberStatus::Diamond)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn card_combines_member_label_and_benefits() {
        let members = MockMemberRepository::new();
        let benefits = MockBenefitRepository::new();
        benefits.add(MemberStatus::Gold, "ゴールド特典", true).await;
        let member = members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;

        let card = BenefitService::new(Arc::new(members), Arc::new(benefits))
            .card(&member.id)
            .await
            .unwrap();

        assert_eq!(card.member.id, member.id);
        assert_eq!(card.status_label, "ゴールド");
        assert_eq!(card.benefits.len(), 1);
        assert!(!card.expired);
    }

    #[tokio::test]
    async fn card_flags_lapsed_membership() {
        let members = MockMemberRepository::new();
        let benefits = MockBenefitRepository::new();
        let member = members.insert_legacy("山田太郎", "a@x.com", "M-1", "secret12").await;
        members
            .update(
                &member.id,
                &UpdateMemberRequest {
                    expiration_date: Some(Utc::now().date_naive() - Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let card = BenefitService::new(Arc::new(members), Arc::new(benefits))
            .card(&member.id)
            .await
            .unwrap();
        assert!(card.expired);
    }

    #[tokio::test]
    async fn card_requires_active_member() {
        let members = MockMemberRepository::new();
        let benefits = MockBenefitRepository::new();

        let service = BenefitService::new(Arc::new(members), Arc::new(benefits));
        assert!(matches!(service.card("missing").await, Err(MemberError::NotFound)));
    }
}

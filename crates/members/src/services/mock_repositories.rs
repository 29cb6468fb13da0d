//! In-memory store implementations for testing the services

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use membercard_database::{
    Benefit, CreateLoginLogRequest, CreateMemberRequest, CredentialSource, DatabaseError,
    DatabaseResult, Member, MemberLookup, MemberSearch, MemberStatus, UpdateMemberRequest,
};
use tokio::sync::RwLock;

use crate::repositories::{BenefitStore, LoginLogStore, MemberStore};
use crate::utils::hash_password;

/// Mock member store enforcing the same uniqueness rules as the database.
#[derive(Clone, Default)]
pub struct MockMemberRepository {
    members: Arc<RwLock<Vec<Member>>>,
    sequences: Arc<RwLock<HashMap<i32, u32>>>,
    next_id: Arc<RwLock<u64>>,
    fail_list: Arc<AtomicBool>,
    fail_create: Arc<AtomicBool>,
    failing_updates: Arc<RwLock<HashSet<String>>>,
}

impl MockMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an active legacy member whose hash matches `password`.
    pub async fn insert_legacy(
        &self,
        name: &str,
        email: &str,
        member_number: &str,
        password: &str,
    ) -> Member {
        let password_hash = hash_password(password).expect("hashing should succeed in tests");
        self.insert_with_credential(
            name,
            email,
            member_number,
            CredentialSource::Legacy { password_hash },
        )
        .await
    }

    pub async fn insert_with_credential(
        &self,
        name: &str,
        email: &str,
        member_number: &str,
        credential: CredentialSource,
    ) -> Member {
        let request = CreateMemberRequest {
            name: name.to_string(),
            email: email.to_string(),
            member_number: member_number.to_string(),
            credential,
            status: MemberStatus::Gold,
            expiration_date: Utc::now().date_naive() + Duration::days(365),
            external_identity_id: None,
        };
        self.create_unchecked(&request).await
    }

    /// Insert a row as-is, bypassing uniqueness checks (for corrupt-data tests).
    pub async fn seed(&self, member: Member) {
        self.members.write().await.push(member);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub async fn fail_updates_for(&self, member_id: &str) {
        self.failing_updates
            .write()
            .await
            .insert(member_id.to_string());
    }

    pub async fn get(&self, id: &str) -> Option<Member> {
        self.members
            .read()
            .await
            .iter()
            .find(|member| member.id == id)
            .cloned()
    }

    pub async fn all(&self) -> Vec<Member> {
        self.members.read().await.clone()
    }

    async fn create_unchecked(&self, request: &CreateMemberRequest) -> Member {
        let mut next_id = self.next_id.write().await;
        *next_id += 1;
        let now = Utc::now();

        let member = Member {
            id: format!("member-{:04}", *next_id),
            name: request.name.clone(),
            email: request.email.clone(),
            member_number: request.member_number.clone(),
            credential: request.credential.clone(),
            status: request.status,
            expiration_date: request.expiration_date,
            is_active: true,
            external_identity_id: request.external_identity_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.members.write().await.push(member.clone());
        member
    }
}

#[async_trait]
impl MemberStore for MockMemberRepository {
    async fn find_active(&self, lookup: MemberLookup<'_>) -> DatabaseResult<Vec<Member>> {
        let members = self.members.read().await;
        Ok(members
            .iter()
            .filter(|member| member.is_active)
            .filter(|member| match lookup {
                MemberLookup::Email(email) => member.email == email,
                MemberLookup::MemberNumber(number) => member.member_number == number,
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Member>> {
        Ok(self.get(id).await)
    }

    async fn list_active(&self) -> DatabaseResult<Vec<Member>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("injected list failure".to_string()));
        }
        Ok(self
            .members
            .read()
            .await
            .iter()
            .filter(|member| member.is_active)
            .cloned()
            .collect())
    }

    async fn search(&self, search: &MemberSearch) -> DatabaseResult<(Vec<Member>, u64)> {
        let members = self.members.read().await;
        let term = search.query.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let matching: Vec<Member> = members
            .iter()
            .rev()
            .filter(|member| {
                term.map_or(true, |term| {
                    member.name.contains(term)
                        || member.email.contains(term)
                        || member.member_number.contains(term)
                })
            })
            .filter(|member| search.status.map_or(true, |status| member.status == status))
            .filter(|member| search.is_active.map_or(true, |active| member.is_active == active))
            .cloned()
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(search.offset as usize)
            .take(search.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn create(&self, request: &CreateMemberRequest) -> DatabaseResult<Member> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("injected create failure".to_string()));
        }

        {
            let members = self.members.read().await;
            if members
                .iter()
                .any(|member| member.member_number == request.member_number)
            {
                return Err(DatabaseError::Duplicate("member_number".to_string()));
            }
            if members
                .iter()
                .any(|member| member.is_active && member.email == request.email)
            {
                return Err(DatabaseError::Duplicate("email".to_string()));
            }
        }

        Ok(self.create_unchecked(request).await)
    }

    async fn update(&self, id: &str, request: &UpdateMemberRequest) -> DatabaseResult<Member> {
        if self.failing_updates.read().await.contains(id) {
            return Err(DatabaseError::QueryError("injected update failure".to_string()));
        }

        let mut members = self.members.write().await;

        if let Some(email) = &request.email {
            let taken = members
                .iter()
                .any(|member| member.id != id && member.is_active && &member.email == email);
            if taken {
                return Err(DatabaseError::Duplicate("email".to_string()));
            }
        }

        let member = members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("member {id}")))?;

        if let Some(name) = &request.name {
            member.name = name.clone();
        }
        if let Some(email) = &request.email {
            member.email = email.clone();
        }
        if let Some(status) = request.status {
            member.status = status;
        }
        if let Some(expiration_date) = request.expiration_date {
            member.expiration_date = expiration_date;
        }
        if let Some(is_active) = request.is_active {
            member.is_active = is_active;
        }
        if let Some(password_hash) = &request.password_hash {
            if let CredentialSource::Legacy { .. } = member.credential {
                member.credential = CredentialSource::Legacy {
                    password_hash: password_hash.clone(),
                };
            }
        }
        if let Some(identity_id) = &request.external_identity_id {
            member.external_identity_id = Some(identity_id.clone());
        }
        member.updated_at = Utc::now();

        Ok(member.clone())
    }

    async fn next_member_sequence(&self, year: i32) -> DatabaseResult<u32> {
        let mut sequences = self.sequences.write().await;
        let value = sequences.entry(year).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

/// Mock benefit catalogue
#[derive(Clone, Default)]
pub struct MockBenefitRepository {
    benefits: Arc<RwLock<Vec<Benefit>>>,
}

impl MockBenefitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, status: MemberStatus, title: &str, is_active: bool) -> Benefit {
        let mut benefits = self.benefits.write().await;
        let created_at = Utc::now() + Duration::milliseconds(benefits.len() as i64);
        let benefit = Benefit {
            id: format!("benefit-{}", benefits.len() + 1),
            status,
            title: title.to_string(),
            description: format!("{title} description"),
            discount_rate: Some(10),
            is_active,
            created_at,
            updated_at: created_at,
        };
        benefits.push(benefit.clone());
        benefit
    }
}

#[async_trait]
impl BenefitStore for MockBenefitRepository {
    async fn list_active_by_status(&self, status: MemberStatus) -> DatabaseResult<Vec<Benefit>> {
        let mut benefits: Vec<Benefit> = self
            .benefits
            .read()
            .await
            .iter()
            .filter(|benefit| benefit.status == status && benefit.is_active)
            .cloned()
            .collect();
        benefits.sort_by_key(|benefit| benefit.created_at);
        Ok(benefits)
    }
}

/// Mock login log recording every append
#[derive(Clone, Default)]
pub struct MockLoginLogRepository {
    entries: Arc<RwLock<Vec<CreateLoginLogRequest>>>,
    fail: Arc<AtomicBool>,
}

impl MockLoginLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn entries(&self) -> Vec<CreateLoginLogRequest> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl LoginLogStore for MockLoginLogRepository {
    async fn append(&self, request: &CreateLoginLogRequest) -> DatabaseResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("injected login log failure".to_string()));
        }
        self.entries.write().await.push(request.clone());
        Ok(())
    }
}

/// A member value for tests that need one without a store.
pub fn sample_member(id: &str, email: &str, member_number: &str) -> Member {
    let now = Utc::now();
    Member {
        id: id.to_string(),
        name: "山田太郎".to_string(),
        email: email.to_string(),
        member_number: member_number.to_string(),
        credential: CredentialSource::Managed,
        status: MemberStatus::Bronze,
        expiration_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
        is_active: true,
        external_identity_id: None,
        created_at: now,
        updated_at: now,
    }
}

use chrono::NaiveDate;
use membercard_database::{
    run_migrations, BenefitRepository, CreateBenefitRequest, CreateLoginLogRequest,
    CreateMemberRequest, CredentialSource, DatabaseError, LoginChannel, LoginLogRepository,
    MemberLookup, MemberRepository, MemberSearch, MemberStatus, UpdateMemberRequest,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    _temp_dir: TempDir,
    pool: SqlitePool,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("repos.db"))
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        run_migrations(&pool).await.map_err(|e| e.to_string())?;

        Ok(Self {
            _temp_dir: temp_dir,
            pool,
        })
    }

    fn members(&self) -> MemberRepository {
        MemberRepository::new(self.pool.clone())
    }
}

fn legacy_member(email: &str, number: &str) -> CreateMemberRequest {
    CreateMemberRequest {
        name: "山田太郎".to_string(),
        email: email.to_string(),
        member_number: number.to_string(),
        credential: CredentialSource::Legacy {
            password_hash: "$2b$10$abcdefghijklmnopqrstuuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string(),
        },
        status: MemberStatus::Gold,
        expiration_date: NaiveDate::from_ymd_opt(2030, 3, 31).unwrap(),
        external_identity_id: None,
    }
}

#[tokio::test]
async fn create_and_lookup_by_email_and_member_number() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    let created = repo.create(&legacy_member("a@x.com", "M-2024-0001")).await?;
    assert!(created.is_active);
    assert_eq!(created.status, MemberStatus::Gold);
    assert!(matches!(created.credential, CredentialSource::Legacy { .. }));

    let by_email = repo.find_active(MemberLookup::Email("a@x.com")).await?;
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].id, created.id);

    let by_number = repo
        .find_active(MemberLookup::MemberNumber("M-2024-0001"))
        .await?;
    assert_eq!(by_number.len(), 1);

    // Exact match only.
    assert!(repo.find_active(MemberLookup::Email("A@X.COM")).await?.is_empty());
    assert!(repo
        .find_active(MemberLookup::MemberNumber("M-2024-000"))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn active_email_is_unique_but_deactivated_rows_release_it() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    let first = repo.create(&legacy_member("dup@x.com", "M-2024-0001")).await?;
    let duplicate = repo.create(&legacy_member("dup@x.com", "M-2024-0002")).await;
    assert!(matches!(duplicate, Err(ref e) if e.is_duplicate("email")));

    repo.update(
        &first.id,
        &UpdateMemberRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let replacement = repo.create(&legacy_member("dup@x.com", "M-2024-0002")).await?;
    let active = repo.find_active(MemberLookup::Email("dup@x.com")).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, replacement.id);

    // Inactive rows stay reachable by id.
    let archived = repo.find_by_id(&first.id).await?.ok_or("missing member")?;
    assert!(!archived.is_active);
    Ok(())
}

#[tokio::test]
async fn member_number_is_unique() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    repo.create(&legacy_member("one@x.com", "M-2024-0001")).await?;
    let result = repo.create(&legacy_member("two@x.com", "M-2024-0001")).await;
    assert!(matches!(result, Err(ref e) if e.is_duplicate("member_number")));
    Ok(())
}

#[tokio::test]
async fn update_applies_only_present_fields() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    let created = repo.create(&legacy_member("a@x.com", "M-2024-0001")).await?;
    let updated = repo
        .update(
            &created.id,
            &UpdateMemberRequest {
                name: Some("山田花子".to_string()),
                external_identity_id: Some("identity-1".to_string()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.name, "山田花子");
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.external_identity_id.as_deref(), Some("identity-1"));
    assert_eq!(updated.credential, created.credential);
    assert!(updated.updated_at >= created.updated_at);

    let missing = repo
        .update(
            "00000000-0000-0000-0000-000000000000",
            &UpdateMemberRequest {
                name: Some("nobody".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(missing, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn managed_members_store_no_hash() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    let mut request = legacy_member("managed@x.com", "M-2024-0003");
    request.credential = CredentialSource::Managed;
    request.external_identity_id = Some("identity-9".to_string());

    let created = repo.create(&request).await?;
    assert_eq!(created.credential, CredentialSource::Managed);

    let (hash,): (Option<String>,) =
        sqlx::query_as("SELECT password_hash FROM members WHERE id = ?")
            .bind(&created.id)
            .fetch_one(&ctx.pool)
            .await?;
    assert!(hash.is_none());
    Ok(())
}

#[tokio::test]
async fn search_filters_and_counts() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    repo.create(&legacy_member("yamada@example.com", "M-2024-0001")).await?;
    let mut silver = legacy_member("suzuki@example.com", "M-2024-0002");
    silver.status = MemberStatus::Silver;
    silver.name = "鈴木一郎".to_string();
    repo.create(&silver).await?;
    let inactive = repo.create(&legacy_member("old@example.com", "M-2023-0001")).await?;
    repo.update(
        &inactive.id,
        &UpdateMemberRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let (all, total) = repo
        .search(&MemberSearch {
            limit: 20,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 3);
    assert_eq!(all.len(), 3);

    let (by_query, total) = repo
        .search(&MemberSearch {
            query: Some("suzuki".to_string()),
            limit: 20,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 1);
    assert_eq!(by_query[0].status, MemberStatus::Silver);

    let (active_gold, total) = repo
        .search(&MemberSearch {
            status: Some(MemberStatus::Gold),
            is_active: Some(true),
            limit: 20,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 1);
    assert_eq!(active_gold[0].email, "yamada@example.com");

    let (page, total) = repo
        .search(&MemberSearch {
            limit: 2,
            offset: 2,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    Ok(())
}

#[tokio::test]
async fn list_active_skips_deactivated_members() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    let first = repo.create(&legacy_member("a@x.com", "M-2024-0001")).await?;
    repo.create(&legacy_member("b@x.com", "M-2024-0002")).await?;
    repo.update(
        &first.id,
        &UpdateMemberRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let active = repo.list_active().await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].email, "b@x.com");
    Ok(())
}

#[tokio::test]
async fn member_sequence_counts_per_year() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = ctx.members();

    assert_eq!(repo.next_member_sequence(2024).await?, 1);
    assert_eq!(repo.next_member_sequence(2024).await?, 2);
    assert_eq!(repo.next_member_sequence(2025).await?, 1);
    assert_eq!(repo.next_member_sequence(2024).await?, 3);
    Ok(())
}

#[tokio::test]
async fn benefits_are_listed_per_tier_in_creation_order() -> TestResult {
    let ctx = TestContext::new().await?;
    let repo = BenefitRepository::new(ctx.pool.clone());

    let seeded = repo.list_active_by_status(MemberStatus::Gold).await?;
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].discount_rate, Some(15));

    repo.create(&CreateBenefitRequest {
        status: MemberStatus::Gold,
        title: "ゴールド追加特典".to_string(),
        description: "ラウンジ利用".to_string(),
        discount_rate: None,
        is_active: true,
    })
    .await?;
    repo.create(&CreateBenefitRequest {
        status: MemberStatus::Gold,
        title: "終了した特典".to_string(),
        description: "非公開".to_string(),
        discount_rate: Some(50),
        is_active: false,
    })
    .await?;

    let gold = repo.list_active_by_status(MemberStatus::Gold).await?;
    assert_eq!(gold.len(), 2);
    assert_eq!(gold[0].title, "ゴールド特典");
    assert_eq!(gold[1].title, "ゴールド追加特典");

    let invalid = repo
        .create(&CreateBenefitRequest {
            status: MemberStatus::Bronze,
            title: "invalid".to_string(),
            description: "rate too high".to_string(),
            discount_rate: Some(150),
            is_active: true,
        })
        .await;
    assert!(invalid.is_err());
    Ok(())
}

#[tokio::test]
async fn login_logs_append_for_existing_members() -> TestResult {
    let ctx = TestContext::new().await?;
    let member = ctx
        .members()
        .create(&legacy_member("a@x.com", "M-2024-0001"))
        .await?;
    let logs = LoginLogRepository::new(ctx.pool.clone());

    logs.create(&CreateLoginLogRequest {
        member_id: member.id.clone(),
        login_type: LoginChannel::Mobile,
        ip_address: Some("203.0.113.7".to_string()),
        user_agent: Some("MembercardApp/1.0".to_string()),
    })
    .await?;

    let entries = logs.find_by_member(&member.id, 10).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].login_type, LoginChannel::Mobile);

    let orphan = logs
        .create(&CreateLoginLogRequest {
            member_id: "missing".to_string(),
            login_type: LoginChannel::Web,
            ip_address: None,
            user_agent: None,
        })
        .await;
    assert!(orphan.is_err());
    Ok(())
}

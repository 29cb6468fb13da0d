use std::sync::Arc;

use anyhow::{bail, Context, Result};
use membercard_config::AppConfig;
use membercard_database::{
    initialize_database, BenefitRepository, LoginLogRepository, MemberRepository, SqlitePool,
};
use membercard_identity::{AdminApiClient, IdentityProvider, InMemoryIdentityProvider};
use membercard_members::{
    AdminService, BackfillService, BenefitService, LoginService, MembershipPolicy, ProfileService,
    ReconciliationService, RegistrationService,
};
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// `RUST_LOG` overrides the default `info` filter.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub identity: Arc<dyn IdentityProvider>,
    pub login: LoginService,
    pub registration: RegistrationService,
    pub profiles: ProfileService,
    pub benefits: BenefitService,
    pub reconciliation: ReconciliationService,
    pub admin: AdminService,
    pub backfill: BackfillService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;
        let identity = identity_provider(config)?;

        let services = Self::assemble(db_pool, identity, config);
        info!(
            environment = ?config.environment,
            backfill_concurrency = config.backfill.concurrency,
            "backend services ready"
        );
        Ok(services)
    }

    /// Wire every service over one pool and one identity provider.
    pub fn assemble(
        db_pool: SqlitePool,
        identity: Arc<dyn IdentityProvider>,
        config: &AppConfig,
    ) -> Self {
        let policy = MembershipPolicy {
            password_min_length: config.auth.password_min_length,
            member_number_prefix: config.membership.member_number_prefix.clone(),
            term_months: config.membership.term_months,
        };
        let members = Arc::new(MemberRepository::new(db_pool.clone()));
        let benefit_store = Arc::new(BenefitRepository::new(db_pool.clone()));
        let login_logs = Arc::new(LoginLogRepository::new(db_pool.clone()));

        let reconciliation = ReconciliationService::new(
            members.clone(),
            identity.clone(),
            policy.password_min_length,
        );

        Self {
            login: LoginService::new(
                members.clone(),
                identity.clone(),
                login_logs,
                policy.password_min_length,
            ),
            registration: RegistrationService::new(
                members.clone(),
                identity.clone(),
                policy.clone(),
            ),
            profiles: ProfileService::new(
                members.clone(),
                identity.clone(),
                policy.password_min_length,
            ),
            benefits: BenefitService::new(members.clone(), benefit_store),
            admin: AdminService::new(members.clone(), identity.clone(), reconciliation.clone()),
            backfill: BackfillService::new(
                members,
                reconciliation.clone(),
                config.backfill.concurrency,
            ),
            reconciliation,
            identity,
            db_pool,
        }
    }
}

/// The identity admin client, or an in-process stand-in for development
/// setups without a service key.
pub fn identity_provider(config: &AppConfig) -> Result<Arc<dyn IdentityProvider>> {
    if config.identity.service_key.is_some() {
        let client = AdminApiClient::from_config(&config.identity)
            .context("failed to build identity service client")?;
        info!(base_url = %config.identity.base_url, "identity service client configured");
        return Ok(Arc::new(client));
    }

    if config.environment.is_development() {
        warn!("identity.service_key not set; using in-memory identity provider");
        return Ok(Arc::new(InMemoryIdentityProvider::new()));
    }

    bail!("identity.service_key must be configured outside development")
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

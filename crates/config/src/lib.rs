use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "membercard.toml",
    "config/membercard.toml",
    "crates/config/membercard.toml",
    "../membercard.toml",
    "../config/membercard.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: RuntimeEnvironment,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub auth: AuthConfig,
    pub membership: MembershipConfig,
    pub backfill: BackfillConfig,
}

/// Controls how much upstream detail error responses carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    #[default]
    Production,
}

impl RuntimeEnvironment {
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeEnvironment::Development)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://membercard.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Connection settings for the managed identity admin API.
///
/// ```
/// use membercard_config::IdentityConfig;
///
/// let identity = IdentityConfig::default();
/// assert_eq!(identity.request_timeout_seconds, 30);
/// assert!(identity.service_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub base_url: String,
    pub service_key: Option<String>,
    pub request_timeout_seconds: u64,
}

impl IdentityConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:9999".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            service_key: None,
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub password_min_length: usize,
    /// Bearer token required by the admin routes. Admin routes are disabled when unset.
    pub admin_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            admin_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    pub member_number_prefix: String,
    pub term_months: u32,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            member_number_prefix: "M".to_string(),
            term_months: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    pub concurrency: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use membercard_config::load;
///
/// std::env::remove_var("MEMBERCARD_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("identity.base_url", defaults.identity.base_url.clone())?
        .set_default(
            "identity.request_timeout_seconds",
            i64::try_from(defaults.identity.request_timeout_seconds).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("MEMBERCARD").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("MEMBERCARD_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via MEMBERCARD_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.backfill.concurrency == 0 {
        config.backfill.concurrency = 1;
    }

    if config.membership.term_months == 0 {
        anyhow::bail!("invalid configuration: membership.term_months must be at least 1");
    }

    // Only log whether secrets are present.
    debug!(
        environment = ?config.environment,
        http = ?config.http,
        database = ?config.database,
        identity_base_url = %config.identity.base_url,
        identity_key_configured = config.identity.service_key.is_some(),
        admin_routes_enabled = config.auth.admin_token.is_some(),
        "loaded backend configuration"
    );
    Ok(config)
}

//! Membercard Database Crate
//!
//! SQLite persistence for members, the benefit catalogue and the login audit
//! log: connection management, embedded migrations and repositories.

use membercard_config::DatabaseConfig;
pub use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{BenefitRepository, LoginLogRepository, MemberRepository};

pub use entities::{
    Benefit, CreateBenefitRequest, CreateLoginLogRequest, CreateMemberRequest, CredentialSource,
    LoginChannel, LoginLog, Member, MemberLookup, MemberSearch, MemberStatus, UnknownMemberStatus,
    UpdateMemberRequest,
};

pub use types::{DatabaseError, DatabaseResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use membercard_api::{build_router, ApiServices, ApiSettings, AppState};
use membercard_config::{load as load_config, AppConfig};
use membercard_members::utils::generate_random_password;
use membercard_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::{info, warn};

const GENERATED_PASSWORD_LENGTH: usize = 16;

#[derive(Parser)]
#[command(name = "membercard")]
#[command(about = "Membership card portal backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create or link identities for every active member
    Backfill {
        /// Password for newly created identities; random when omitted
        #[arg(long)]
        default_password: Option<String>,
    },
    /// Create or link the identity of a single member
    Reconcile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Backfill { default_password } => run_backfill(config, default_password).await,
        Commands::Reconcile { email, password } => run_reconcile(config, &email, &password).await,
    }
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting membercard backend");

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    if config.auth.admin_token.is_none() {
        warn!("auth.admin_token not set; admin routes are disabled");
    }

    let state = AppState::new(
        ApiServices {
            login: services.login,
            registration: services.registration,
            profiles: services.profiles,
            benefits: services.benefits,
            admin: services.admin,
            backfill: services.backfill,
        },
        ApiSettings {
            admin_token: config.auth.admin_token.clone(),
            expose_error_details: config.environment.is_development(),
        },
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(membercard_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn run_backfill(config: AppConfig, default_password: Option<String>) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let password = match default_password {
        Some(password) => password,
        None => {
            let generated = generate_random_password(GENERATED_PASSWORD_LENGTH);
            eprintln!("generated default password: {generated}");
            generated
        }
    };

    let report = services
        .backfill
        .run(&password)
        .await
        .context("identity backfill failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to render backfill report")?
    );
    Ok(())
}

async fn run_reconcile(config: AppConfig, email: &str, password: &str) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let (member, outcome) = services
        .reconciliation
        .reconcile_by_email(email, password)
        .await
        .with_context(|| format!("failed to reconcile {email}"))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "member_id": member.id,
            "member_number": member.member_number,
            "outcome": outcome,
        }))
        .context("failed to render reconcile result")?
    );
    Ok(())
}

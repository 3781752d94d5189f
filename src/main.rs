//! Rallypoint - Team provisioning and points ledger platform
//!
//! Serves the REST API and ships the small admin utilities needed to
//! bootstrap an installation (master account creation, session tokens).

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, Set};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rallypoint_api::{ApiServer, ApiServerConfig};
use rallypoint_auth::{hash_password, JwtClaims, JwtValidator, SESSION_TOKEN_TYPE};
use rallypoint_db::entities::user;
use rallypoint_engine::NullAssigner;

/// Rallypoint - Team provisioning and points ledger platform
#[derive(Parser, Debug)]
#[command(name = "rallypoint")]
#[command(about = "Rallypoint - Team provisioning and points ledger platform")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the API server
    #[command(long_about = r#"
Run the REST API server.

EXAMPLES:
  # Serve against a local SQLite file
  rallypoint serve --database-url "sqlite://rallypoint.db?mode=rwc" \
    --jwt-secret $JWT_SECRET \
    --super-admin-email root@rallypoint.dev

ENVIRONMENT VARIABLES:
  DATABASE_URL                  Database connection string
  RALLYPOINT_JWT_SECRET         Secret for signing session tokens
  RALLYPOINT_SUPER_ADMIN_EMAIL  Email allowed through the super-admin gate
  RALLYPOINT_BIND_ADDR          API bind address
    "#)]
    Serve {
        /// Database connection string (SQLite or Postgres)
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Secret for signing session tokens
        #[arg(long, env = "RALLYPOINT_JWT_SECRET")]
        jwt_secret: String,

        /// Email allowed through the super-admin gate (bulk import, export)
        #[arg(long, env = "RALLYPOINT_SUPER_ADMIN_EMAIL")]
        super_admin_email: String,

        /// Address to bind the API server
        #[arg(long, env = "RALLYPOINT_BIND_ADDR", default_value = "127.0.0.1:8080")]
        bind_addr: SocketAddr,

        /// Disable CORS (enabled by default for development)
        #[arg(long)]
        no_cors: bool,
    },

    /// Create a master account
    CreateMaster {
        /// Database connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long, env = "RALLYPOINT_MASTER_PASSWORD")]
        password: String,
    },

    /// Generate a session token for an existing user
    GenerateToken {
        /// Database connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Secret for signing session tokens
        #[arg(long, env = "RALLYPOINT_JWT_SECRET")]
        jwt_secret: String,

        /// Email of the user to issue the token for
        #[arg(long)]
        email: String,

        /// Token validity in hours
        #[arg(long, default_value = "24")]
        validity_hours: i64,
    },
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    info!(
        "rallypoint {} ({} built {})",
        env!("GIT_TAG"),
        env!("GIT_HASH"),
        env!("BUILD_TIME")
    );

    match cli.command {
        Commands::Serve {
            database_url,
            jwt_secret,
            super_admin_email,
            bind_addr,
            no_cors,
        } => {
            serve(
                database_url,
                jwt_secret,
                super_admin_email,
                bind_addr,
                !no_cors,
            )
            .await
        }
        Commands::CreateMaster {
            database_url,
            name,
            email,
            password,
        } => create_master(database_url, name, email, password).await,
        Commands::GenerateToken {
            database_url,
            jwt_secret,
            email,
            validity_hours,
        } => generate_token(database_url, jwt_secret, email, validity_hours).await,
    }
}

async fn serve(
    database_url: String,
    jwt_secret: String,
    super_admin_email: String,
    bind_addr: SocketAddr,
    enable_cors: bool,
) -> Result<()> {
    let db = rallypoint_db::connect(&database_url)
        .await
        .context("failed to connect to the database")?;

    rallypoint_db::migrate(&db)
        .await
        .context("failed to run migrations")?;

    let config = ApiServerConfig {
        bind_addr,
        enable_cors,
    };

    // No external assignment service wired in yet; teams stay unassigned
    // until a coordinator is set administratively.
    let server = ApiServer::new(
        config,
        db,
        jwt_secret,
        super_admin_email,
        Arc::new(NullAssigner),
    );

    server.start().await
}

async fn create_master(
    database_url: String,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let db = rallypoint_db::connect(&database_url)
        .await
        .context("failed to connect to the database")?;

    rallypoint_db::migrate(&db)
        .await
        .context("failed to run migrations")?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&db)
        .await?;

    if existing.is_some() {
        anyhow::bail!("a user with email {} already exists", email);
    }

    let created = user::ActiveModel {
        id: NotSet,
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        role: Set(user::UserRole::Master),
        phone: Set(None),
        academic_year: Set(None),
        department: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&db)
    .await?;

    info!(user_id = created.id, email = %created.email, "master account created");
    println!(
        "Created master account {} (id {})",
        created.email, created.id
    );

    Ok(())
}

async fn generate_token(
    database_url: String,
    jwt_secret: String,
    email: String,
    validity_hours: i64,
) -> Result<()> {
    let db = rallypoint_db::connect(&database_url)
        .await
        .context("failed to connect to the database")?;

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&db)
        .await?
        .with_context(|| format!("no user with email {}", email))?;

    let claims = JwtClaims::new(
        account.id,
        "rallypoint".to_string(),
        "rallypoint-web".to_string(),
        Duration::hours(validity_hours),
    )
    .with_role(account.role.as_str().to_string())
    .with_token_type(SESSION_TOKEN_TYPE.to_string());

    let token = JwtValidator::encode(jwt_secret.as_bytes(), &claims)?;

    println!("{}", token);

    Ok(())
}

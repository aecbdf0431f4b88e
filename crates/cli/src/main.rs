//! Freshwater Aquatics CLI - session migrations and catalogue tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! fw-cli migrate storefront
//!
//! # Create the admin session table
//! fw-cli migrate admin
//!
//! # Create both
//! fw-cli migrate all
//!
//! # Seed categories and products through the admin API
//! SEED_ADMIN_PASSWORD=... fw-cli seed --email admin@example.com
//!
//! # Check the backend answers
//! fw-cli health
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create session tables
//! - `seed` - Load a YAML catalogue into the backend
//! - `health` - Ping the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use freshwater_backend::{BackendClient, BackendConfig, DEFAULT_BASE_URL};
use secrecy::SecretString;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "fw-cli")]
#[command(author, version, about = "Freshwater Aquatics CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Create categories and products from a YAML file via the admin API
    Seed {
        /// Seed file
        #[arg(short, long, default_value = "crates/cli/seed/catalog.yaml")]
        file: PathBuf,

        /// Admin account to sign in with
        #[arg(short, long, env = "SEED_ADMIN_EMAIL")]
        email: String,

        /// Admin password (read from the environment only)
        #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Backend API base URL
        #[arg(long, env = "BACKEND_API_URL", default_value = DEFAULT_BASE_URL)]
        backend_url: String,

        /// Validate the file without contacting the backend
        #[arg(long)]
        check: bool,
    },
    /// Check that the backend API answers
    Health {
        /// Backend API base URL
        #[arg(long, env = "BACKEND_API_URL", default_value = DEFAULT_BASE_URL)]
        backend_url: String,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Storefront session table
    Storefront,
    /// Admin session table
    Admin,
    /// Both session tables
    All,
}

fn backend(base_url: String) -> Result<BackendClient, CommandError> {
    let config = BackendConfig {
        base_url,
        timeout: Duration::from_secs(30),
        user_agent: format!("freshwater-cli/{}", env!("CARGO_PKG_VERSION")),
    };
    Ok(BackendClient::new(&config)?)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Seed {
            file,
            email,
            password,
            backend_url,
            check,
        } => {
            let catalog = commands::seed::load(&file).await?;
            if check {
                tracing::info!("Seed file is valid");
                return Ok(());
            }

            let backend = backend(backend_url)?;
            let password = SecretString::from(password);
            let summary = commands::seed::run(&backend, &catalog, &email, &password).await?;

            tracing::info!("Seeding complete");
            tracing::info!(
                "  Categories: {} created, {} already present",
                summary.categories_created,
                summary.categories_skipped
            );
            tracing::info!(
                "  Products: {} created, {} already present",
                summary.products_created,
                summary.products_skipped
            );
            if !summary.errors.is_empty() {
                tracing::error!("  Refused: {}", summary.errors.len());
                for (entry, message) in &summary.errors {
                    tracing::error!("    - {entry}: {message}");
                }
            }
        }
        Commands::Health { backend_url } => {
            commands::health::check(&backend(backend_url)?).await?;
        }
    }
    Ok(())
}

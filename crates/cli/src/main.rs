//! Voltline CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! vl-cli migrate
//!
//! # Seed the catalog with demo products
//! vl-cli seed
//!
//! # Bootstrap the first admin account
//! vl-cli admin create -n "Admin Name" -e admin@example.com -p <password>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with demo products
//! - `admin create` - Create an admin account directly in the store

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vl-cli")]
#[command(author, version, about = "Voltline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo products
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (min 6 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), commands::CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vl_cli=info,voltline_api=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed => commands::seed::run().await,
        Commands::Admin {
            action: AdminAction::Create {
                name,
                email,
                password,
            },
        } => commands::admin::create(&name, &email, &password).await,
    }
}

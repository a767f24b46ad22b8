//! Kiosk CLI - operator diagnostics for tenant resolution and delivery.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a store slug to its tenant id
//! kiosk resolve acme
//!
//! # Show what every tenant source would contribute for a request
//! kiosk sources --path /manager/acme/products --token "$KIOSK_TOKEN"
//!
//! # Probe the upload locations for a theme's static export
//! kiosk probe electronics --store acme
//!
//! # Call a tenant-scoped platform endpoint through the gateway
//! kiosk call get /store/products --param page=1 --store t_123
//! ```
//!
//! Every command talks to the platform API at `--api-url`, falling back to
//! the `KIOSK_API_URL` environment variable (`.env` is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(author, version, about = "Kiosk operator CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a store slug to its tenant id
    Resolve {
        /// Store slug to look up
        slug: String,

        /// Platform API base URL (default: KIOSK_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Show what every tenant resolution source would contribute
    Sources(commands::sources::SourcesArgs),
    /// Probe the upload locations for a theme's static export
    Probe {
        /// Theme slug to probe
        theme: String,

        /// Store slug stamped into the embed URL
        #[arg(long)]
        store: String,

        /// Platform API base URL (default: KIOSK_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Call a tenant-scoped platform endpoint through the gateway
    Call(commands::call::CallArgs),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Resolve { slug, api_url } => commands::resolve::run(&slug, api_url).await?,
        Commands::Sources(args) => commands::sources::run(args).await?,
        Commands::Probe {
            theme,
            store,
            api_url,
        } => commands::probe::run(&theme, &store, api_url).await?,
        Commands::Call(args) => commands::call::run(args).await?,
    }
    Ok(())
}

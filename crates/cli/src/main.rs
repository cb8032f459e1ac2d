//! Curator CLI - token management and rail maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Store the catalog access token
//! curator token set <TOKEN>
//!
//! # Show the ranked view of a rail
//! curator products list --tab latest --exclude-other
//!
//! # Find products to add
//! curator products search "linen" --tab top_selling
//!
//! # Persist an explicit order
//! curator products order --tab latest 42 17 8
//!
//! # Clear a rail (destructive)
//! curator products reset --tab latest --yes
//! ```
//!
//! # Commands
//!
//! - `token` - Manage the stored access token
//! - `products` - Inspect and maintain product rails

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use curator_core::Tab;

mod commands;

#[derive(Parser)]
#[command(name = "curator")]
#[command(author, version, about = "Curator CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored catalog access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Inspect and maintain product rails
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Save a token to the token file
    Set {
        /// Access token issued by the catalog backend
        token: String,
    },
    /// Delete the token file
    Clear,
    /// Report whether a token is stored (never prints it)
    Show,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Print a rail's ranked view
    List {
        /// Rail (`top_selling` or `latest`)
        #[arg(short, long, default_value = "top_selling")]
        tab: Tab,

        /// Hide products ranked on the other rail
        #[arg(long)]
        exclude_other: bool,
    },
    /// Search for products that can be added to a rail
    Search {
        /// Search text
        query: String,

        /// Rail (`top_selling` or `latest`)
        #[arg(short, long, default_value = "top_selling")]
        tab: Tab,

        /// Hide products ranked on the other rail
        #[arg(long)]
        exclude_other: bool,
    },
    /// Clear every product's rank on a rail
    Reset {
        /// Rail (`top_selling` or `latest`)
        #[arg(short, long)]
        tab: Tab,

        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Save an explicit order for a rail
    Order {
        /// Rail (`top_selling` or `latest`)
        #[arg(short, long)]
        tab: Tab,

        /// Product IDs, first is position 1
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr, command output to stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "curator_cli=info,curator_admin=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Token { action } => match action {
            TokenAction::Set { token } => commands::token::set(token),
            TokenAction::Clear => commands::token::clear(),
            TokenAction::Show => commands::token::show(),
        },
        Commands::Products { action } => match action {
            ProductsAction::List { tab, exclude_other } => {
                commands::products::list(tab, exclude_other).await
            }
            ProductsAction::Search {
                query,
                tab,
                exclude_other,
            } => commands::products::search(&query, tab, exclude_other).await,
            ProductsAction::Reset { tab, yes } => commands::products::reset(tab, yes).await,
            ProductsAction::Order { tab, ids } => commands::products::order(tab, &ids).await,
        },
    }
}

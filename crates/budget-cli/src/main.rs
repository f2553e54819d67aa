//! Budget CLI - a terminal front end for the budget app.
//!
//! Each subcommand stands in for one screen of the app: sign in, accounts,
//! categories, recording operations, history and the home summary.

mod commands;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budget_core::api::LOGIN_ROUTE;
use budget_core::config::Config;
use budget_core::{storage, ApiClient, SessionInvalidated, SessionStore};

#[derive(Parser)]
#[command(name = "budget", version, about = "Personal budget tracker")]
struct Cli {
    /// API base URL (overrides config and BUDGET_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a new user; sign in afterwards with `budget login`
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Balance summary, creating default account and categories on first use
    Home,
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: commands::AccountsAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: commands::CategoriesAction,
    },
    /// Record and list operations
    Ops {
        #[command(subcommand)]
        action: commands::OpsAction,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Print where to go after the server rejected the session.
fn announce_invalidation(event: &SessionInvalidated) {
    debug!(path = %event.path, redirect_to = event.redirect_to, "Session invalidated");
    if event.path.starts_with("/auth/") {
        return;
    }
    eprintln!(
        "Your session has expired ({}). Run 'budget login' to sign in again.",
        event.redirect_to
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }
    debug!(api = %config.api_base_url, backend = ?config.token_backend, "Config loaded");

    let token_store = storage::open(&config)?;
    let session = Arc::new(SessionStore::new(token_store));
    let api = ApiClient::new(&config, session.clone())?
        .on_session_invalidated(Arc::new(announce_invalidation));

    // Protected commands wait for this before doing anything
    session.initialize(&api).await;
    let state = session.wait_until_ready().await;
    info!(authenticated = state.is_authenticated, login_route = LOGIN_ROUTE, "Session ready");

    commands::run(cli.command, &api, &mut config).await
}

//! Atelier CLI - the site's public data and back-office from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from --password or ATELIER_PASSWORD)
//! atelier login -e admin@atelier.studio
//!
//! # Browse projects with local search and category filter
//! atelier projects list --search laravel --category "Web App"
//!
//! # Read a post (counts a view)
//! atelier blogs show 64f1c2
//!
//! # Keep the session refreshed until Ctrl+C
//! atelier keepalive
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `refresh`, `keepalive` - Session
//! - `projects`, `blogs` - Public content (and admin deletes)
//! - `users`, `logs`, `upload` - Back-office
//!
//! Results are printed to stdout as JSON. Diagnostics go to stderr and are
//! silent in production unless `RUST_LOG` is set.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use atelier_client::{ClientConfig, ClientState, RunMode};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier site and back-office CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (defaults to `ATELIER_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Exchange the refresh token for a new token pair
    Refresh,
    /// Keep the session refreshed until interrupted
    Keepalive,
    /// Portfolio projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Blog posts, categories and tags
    Blogs {
        #[command(subcommand)]
        action: BlogAction,
    },
    /// Back-office users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Back-office activity log
    Logs {
        #[command(subcommand)]
        action: LogAction,
    },
    /// Upload files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List {
        /// Case-insensitive search over title, description and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category (`all` for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Projects per page
        #[arg(long, default_value_t = 9)]
        per_page: usize,
    },
    /// Show one project
    Show { id: String },
    /// Delete a project
    Delete { id: String },
}

#[derive(Subcommand)]
enum BlogAction {
    /// List posts
    List {
        /// Case-insensitive search over title, excerpt and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category (`all` for every category)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one post and count a view
    Show { id: String },
    /// List categories
    Categories,
    /// List tags
    Tags,
}

#[derive(Subcommand)]
enum UserAction {
    /// List users
    List,
    /// Delete a user
    Delete { id: String },
}

#[derive(Subcommand)]
enum LogAction {
    /// List activity log entries
    List {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Only entries with this action (e.g. `login`, `delete`)
        #[arg(long)]
        action: Option<String>,
    },
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the mode decides, and production is silent.
/// `ATELIER_LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing(mode: RunMode) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| mode.default_directive().into());

    let json = std::env::var("ATELIER_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        let _ = writeln!(std::io::stderr(), "error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    init_tracing(config.mode);
    tracing::debug!(api_url = %config.api_url, mode = %config.mode, "configuration loaded");

    let state = ClientState::new(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&state, &email, password).await?;
        }
        Commands::Logout => commands::session::logout(&state).await?,
        Commands::Whoami => commands::session::whoami(&state).await?,
        Commands::Refresh => commands::session::refresh(&state).await?,
        Commands::Keepalive => commands::session::keepalive(&state).await?,
        Commands::Projects { action } => match action {
            ProjectAction::List {
                search,
                category,
                page,
                per_page,
            } => commands::projects::list(&state, search, category, page, per_page).await?,
            ProjectAction::Show { id } => commands::projects::show(&state, &id).await?,
            ProjectAction::Delete { id } => commands::projects::delete(&state, &id).await?,
        },
        Commands::Blogs { action } => match action {
            BlogAction::List { search, category } => {
                commands::blogs::list(&state, search, category).await?;
            }
            BlogAction::Show { id } => commands::blogs::show(&state, &id).await?,
            BlogAction::Categories => commands::blogs::categories(&state).await?,
            BlogAction::Tags => commands::blogs::tags(&state).await?,
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&state).await?,
            UserAction::Delete { id } => commands::users::delete(&state, &id).await?,
        },
        Commands::Logs { action } => match action {
            LogAction::List {
                page,
                limit,
                action,
            } => commands::logs::list(&state, page, limit, action).await?,
        },
        Commands::Upload { files } => commands::upload::upload(&state, &files).await?,
    }
    Ok(())
}

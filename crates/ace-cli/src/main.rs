//! `ace-search`
//!
//! Command line front end for ACE contact search: list saved filters and the
//! org hierarchy, inspect the most recent search, and run contact searches
//! against the evaluation API.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod output;

use ace_client::{FilterSession, HttpApiClient, SessionBridge, SessionEvent};
use ace_core::{
    Config, DateRange, EntityId, EvalState, FilterCriteria, QueryMode, SearchScope, build_query,
    init_logging,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Command line interface for ACE contact search
#[derive(Parser)]
#[command(
    name = "ace-search",
    version = env!("CARGO_PKG_VERSION"),
    about = "Search evaluation contacts from the command line"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Session cookie sent with every request (overrides configuration)
    #[arg(long, value_name = "COOKIE")]
    cookie: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// List saved filters
    SavedFilters {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show groups, teams and agents
    Org {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show the most recent search
    Recent,

    /// Run a contact search
    Search(SearchArgs),

    /// Print the query strings for some criteria without sending them
    Query {
        /// Search criteria
        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Show resolved configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned columns
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Arguments of the `search` subcommand
#[derive(Args)]
struct SearchArgs {
    /// Start from a saved filter
    #[arg(long, value_name = "KEY", conflicts_with = "recent")]
    saved: Option<String>,

    /// Start from the most recent search
    #[arg(long)]
    recent: bool,

    /// Search criteria, applied on top of the starting point
    #[command(flatten)]
    criteria: CriteriaArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// Search criteria given on the command line
#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    /// Contact id
    #[arg(long)]
    contact_id: Option<u64>,

    /// Date range key, for example `date_range_today`
    #[arg(long)]
    range: Option<DateRange>,

    /// Phone number (ANI or DNIS)
    #[arg(long)]
    phone: Option<String>,

    /// Search scope key, for example `myEvaluations`
    #[arg(long)]
    scope: Option<SearchScope>,

    /// Evaluation state key, for example `scored`
    #[arg(long)]
    eval_state: Option<EvalState>,

    /// Group id
    #[arg(long)]
    group: Option<EntityId>,

    /// Team id
    #[arg(long)]
    team: Option<EntityId>,

    /// Agent id
    #[arg(long)]
    agent: Option<EntityId>,

    /// Only calls shorter than this many seconds
    #[arg(long, value_name = "SECONDS")]
    max_duration: Option<u64>,

    /// Evaluator first name
    #[arg(long)]
    evaluator_first_name: Option<String>,

    /// Evaluator last name
    #[arg(long)]
    evaluator_last_name: Option<String>,
}

impl CriteriaArgs {
    /// `base` with every field given on the command line replaced
    fn overlay(&self, base: FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            contact_id: self.contact_id.or(base.contact_id),
            date_range: self.range.or(base.date_range),
            phone_number: self.phone.clone().or(base.phone_number),
            search_scope: self.scope.or(base.search_scope),
            eval_state: self.eval_state.or(base.eval_state),
            group: self.group.clone().or(base.group),
            team: self.team.clone().or(base.team),
            agent: self.agent.clone().or(base.agent),
            duration_seconds: self.max_duration.or(base.duration_seconds),
            evaluator_first_name: self
                .evaluator_first_name
                .clone()
                .or(base.evaluator_first_name),
            evaluator_last_name: self
                .evaluator_last_name
                .clone()
                .or(base.evaluator_last_name),
        }
    }
}

/// Main entry point
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the command fails
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {e}");
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "ace-search starting"
    );

    match cli.command {
        Commands::SavedFilters { format } => list_saved_filters(&config, format).await,
        Commands::Org { format } => show_org(&config, format).await,
        Commands::Recent => show_recent(&config).await,
        Commands::Search(args) => run_search(&config, args).await,
        Commands::Query { criteria } => show_query(&criteria),
        Commands::Config => show_config(&config),
    }
}

/// Load configuration and apply command line overrides
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(cookie) = &cli.cookie {
        config.api.session_cookie = Some(cookie.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    Ok(config)
}

fn bridge(config: &Config) -> Result<SessionBridge> {
    let client = HttpApiClient::from_config(&config.api)?;
    Ok(SessionBridge::new(Arc::new(client)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list_saved_filters(config: &Config, format: OutputFormat) -> Result<()> {
    let filters = bridge(config)?.fetch_saved_filters().await?;
    match format {
        OutputFormat::Table => print!("{}", output::saved_filters(&filters)),
        OutputFormat::Json => print_json(&filters)?,
    }
    Ok(())
}

async fn show_org(config: &Config, format: OutputFormat) -> Result<()> {
    let org = bridge(config)?.fetch_org_hierarchy().await?;
    match format {
        OutputFormat::Table => print!("{}", output::org(&org)),
        OutputFormat::Json => print_json(&org)?,
    }
    Ok(())
}

async fn show_recent(config: &Config) -> Result<()> {
    match bridge(config)?.fetch_most_recent_search().await? {
        Some(criteria) => print_json(&criteria),
        None => {
            println!("No recent search");
            Ok(())
        }
    }
}

/// Report alerts and login redirects the session publishes
async fn report_events(mut events: broadcast::Receiver<SessionEvent>, login_url: String) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Alert(message)) => eprintln!("{message}"),
            Ok(SessionEvent::NavigateToLogin { .. }) => {
                eprintln!("Session is not authorized. Log in at {login_url} and retry.");
            }
            Ok(event) => debug!(?event, "Session event"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed session events"),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_search(config: &Config, args: SearchArgs) -> Result<()> {
    let client = HttpApiClient::from_config(&config.api)?;
    let session = FilterSession::new(Arc::new(client), config);
    let reporter = tokio::spawn(report_events(
        session.subscribe(),
        format!("{}{}", config.api.base_url, config.session.login_path),
    ));

    let outcome = search_with(&session, config, &args).await;
    let rows = session.rows();
    let count = session.result_count();
    drop(session);
    if let Err(e) = reporter.await {
        warn!("Event reporter failed: {e}");
    }
    outcome?;

    match args.format {
        OutputFormat::Table => print!("{}", output::contacts(&rows, count)),
        OutputFormat::Json => print_json(&serde_json::json!({
            "count": count,
            "contacts": rows,
        }))?,
    }
    Ok(())
}

async fn search_with(session: &FilterSession, config: &Config, args: &SearchArgs) -> Result<()> {
    if let Some(key) = &args.saved {
        session.select_saved_filter(key).await?;
    } else if args.recent {
        match bridge(config)?.fetch_most_recent_search().await? {
            Some(recent) => {
                session.edit(|store| store.replace(recent));
            }
            None => warn!("No recent search to start from"),
        }
    }

    session.edit(|store| {
        let criteria = args.criteria.overlay(store.snapshot().clone());
        store.replace(criteria)
    });
    session.apply().await?;
    Ok(())
}

fn show_query(criteria: &CriteriaArgs) -> Result<()> {
    let criteria = criteria.overlay(FilterCriteria::default());
    println!("{}", build_query(&criteria, QueryMode::Contacts)?);
    println!("{}", build_query(&criteria, QueryMode::Stats)?);
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{rendered}");
    Ok(())
}

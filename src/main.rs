//! Linkweave main entry point
//!
//! This is the command-line interface for the Linkweave link mapper.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use linkweave::config::{load_config_with_hash, validate, Config};
use linkweave::crawler::{
    cancel_pair, save_to_history, start_crawl, CrawlEngine, CrawlEvent, CrawlOptions,
    FetchGateway,
};
use linkweave::output::{export_crawl, write_csv, ExportFormat, ResultRenderer, TextRenderer, ViewMode};
use linkweave::storage::{HistoryStore, SqliteHistoryStore};
use linkweave::{Session, WeaveError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code used when the user interrupts a crawl
const EXIT_CANCELLED: i32 = 130;

/// Linkweave: a breadth-first link mapper
///
/// Linkweave discovers the pages reachable from a seed URL, up to a bounded
/// depth and page count, and shows the unique links it found as a host/path
/// tree or a flat list. Crawls can be kept in a per-owner history and
/// exported as CSV or markdown.
#[derive(Parser, Debug)]
#[command(name = "linkweave")]
#[command(version)]
#[command(about = "A breadth-first link mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// History database (overrides the configuration)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from a seed URL and show the links found
    Crawl(CrawlArgs),

    /// Inspect saved crawls
    #[command(subcommand)]
    History(HistoryCommand),

    /// Export a saved crawl to a file
    Export {
        /// Saved crawl id
        id: i64,

        /// Output format
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct CrawlArgs {
    /// Seed URL; `https://` is assumed when no scheme is given
    url: String,

    /// Maximum link depth to follow (0 = seed page only)
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Follow links to other origins
    #[arg(long)]
    cross_origin: bool,

    /// Number of fetches in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// How to display the result
    #[arg(long, value_enum, default_value_t = ViewMode::Tree)]
    view: ViewMode,

    /// Also write the result as CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Save the crawl to this owner's history
    #[arg(long)]
    owner: Option<String>,
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List saved crawls, newest first
    List {
        #[arg(long)]
        owner: Option<String>,

        /// Show at most this many crawls
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the links of a saved crawl
    Show {
        id: i64,

        #[arg(long, value_enum, default_value_t = ViewMode::Tree)]
        view: ViewMode,
    },

    /// Delete a saved crawl
    Delete {
        id: i64,

        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.history.database_path = db.display().to_string();
    }

    match cli.command {
        Command::Crawl(args) => handle_crawl(config, args, cli.quiet).await,
        Command::History(HistoryCommand::List { owner, limit }) => {
            handle_history_list(&config, owner, limit)?;
            Ok(0)
        }
        Command::History(HistoryCommand::Show { id, view }) => {
            handle_history_show(&config, id, view)?;
            Ok(0)
        }
        Command::History(HistoryCommand::Delete { id, owner }) => {
            handle_history_delete(&config, id, owner)?;
            Ok(0)
        }
        Command::Export { id, format, output } => {
            handle_export(&config, id, format, &output)?;
            Ok(0)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkweave=info,warn"),
            1 => EnvFilter::new("linkweave=debug,info"),
            2 => EnvFilter::new("linkweave=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Resolves the owner from the command line, then the configuration
fn resolve_owner(config: &Config, owner: Option<String>) -> Option<String> {
    owner.or_else(|| config.history.owner.clone())
}

fn open_store(config: &Config) -> Result<SqliteHistoryStore> {
    let path = Path::new(&config.history.database_path);
    SqliteHistoryStore::new(path)
        .with_context(|| format!("Failed to open history database {}", path.display()))
}

/// Handles the crawl command
async fn handle_crawl(mut config: Config, args: CrawlArgs, quiet: bool) -> Result<i32> {
    if let Some(depth) = args.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_pages) = args.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(concurrency) = args.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if args.cross_origin {
        config.crawler.same_origin_only = false;
    }
    if let Some(owner) = args.owner {
        config.history.owner = Some(owner);
    }
    validate(&config).context("Invalid crawl options")?;

    let options = CrawlOptions::from(&config.crawler);
    let gateway = FetchGateway::from_config(&config.fetch).context("Failed to build HTTP client")?;
    tracing::info!("Fetch strategies: {}", gateway.strategy_names().join(", "));

    let mut engine = CrawlEngine::new(gateway).with_concurrency(config.crawler.concurrency);
    if !quiet {
        let max_pages = options.max_pages;
        engine = engine.with_progress(Arc::new(move |event: &CrawlEvent| {
            if let CrawlEvent::Fetching { url, visited, .. } = event {
                eprintln!("Crawling ({}/{}): {}", visited, max_pages, url);
            }
        }));
    }

    let (cancel, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            cancel.cancel();
        }
    });

    let result = match start_crawl(&args.url, &options, &engine, &token).await {
        Ok(result) => result,
        Err(WeaveError::Cancelled) => {
            eprintln!("Crawl cancelled");
            return Ok(EXIT_CANCELLED);
        }
        Err(e @ WeaveError::Url(_)) => {
            return Err(e).with_context(|| format!("Cannot crawl '{}'", args.url));
        }
    };

    if result.fetch_failures > 0 {
        tracing::warn!(
            "{} of {} pages could not be fetched",
            result.fetch_failures,
            result.pages_visited
        );
    }

    let mut renderer = TextRenderer::new(std::io::stdout().lock());
    renderer.render(&result.urls, args.view)?;

    if let Some(csv_path) = &args.csv {
        write_csv(&result.urls, csv_path)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    }

    let session = Session::from_owner(config.history.owner.as_deref());
    if session.is_signed_in() {
        // History is best effort; the result above stands either way
        match open_store(&config) {
            Ok(mut store) => {
                if let Some(id) = save_to_history(&session, &mut store, &result) {
                    eprintln!("Saved to history as #{}", id);
                }
            }
            Err(e) => tracing::warn!("{:#}", e),
        }
    }

    Ok(0)
}

/// Handles `history list`
fn handle_history_list(config: &Config, owner: Option<String>, limit: Option<usize>) -> Result<()> {
    let Some(owner) = resolve_owner(config, owner) else {
        bail!("No owner given; pass --owner or set history.owner in the configuration");
    };

    let store = open_store(config)?;
    let crawls = store.list(&owner)?;

    if crawls.is_empty() {
        println!("No saved crawls for {}", owner);
        return Ok(());
    }

    for saved in crawls.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "#{:<5} {}  {:>5} links  {}",
            saved.id,
            saved.record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            saved.record.url_count,
            saved.record.seed
        );
    }

    Ok(())
}

/// Handles `history show`
fn handle_history_show(config: &Config, id: i64, view: ViewMode) -> Result<()> {
    let store = open_store(config)?;
    let Some(saved) = store.get(id)? else {
        bail!("No saved crawl with id {}", id);
    };

    println!(
        "Crawl #{} of {} ({})",
        saved.id,
        saved.record.seed,
        saved.record.timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    let mut renderer = TextRenderer::new(std::io::stdout().lock());
    renderer.render(&saved.record.urls, view)?;

    Ok(())
}

/// Handles `history delete`; only the owner may delete a crawl
fn handle_history_delete(config: &Config, id: i64, owner: Option<String>) -> Result<()> {
    let Some(owner) = resolve_owner(config, owner) else {
        bail!("No owner given; pass --owner or set history.owner in the configuration");
    };

    let mut store = open_store(config)?;
    match store.get(id)? {
        Some(saved) if saved.owner_id == owner => {}
        Some(_) => bail!("Crawl #{} does not belong to {}", id, owner),
        None => bail!("No saved crawl with id {}", id),
    }

    if store.delete(id)? {
        println!("Deleted crawl #{}", id);
    }

    Ok(())
}

/// Handles `export`
fn handle_export(config: &Config, id: i64, format: ExportFormat, output: &Path) -> Result<()> {
    let store = open_store(config)?;
    let Some(saved) = store.get(id)? else {
        bail!("No saved crawl with id {}", id);
    };

    export_crawl(&saved, format, output)
        .with_context(|| format!("Failed to export crawl #{} to {}", id, output.display()))?;
    println!("Exported crawl #{} to {}", id, output.display());

    Ok(())
}

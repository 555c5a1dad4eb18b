use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gale::config::Config;
use gale::crawler::NytCrawler;
use gale::queue::RedisProcessQueue;
use gale::storage::{CrawlRepository, SqliteRepository};

#[derive(Parser)]
#[command(
    name = "gale",
    version,
    about = "Keyword-driven New York Times article crawler",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl articles for a keyword
    Crawl {
        /// Keyword to search for
        keyword: String,

        /// Keyword language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Maximum number of articles to store
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show storage statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Crawl {
            keyword,
            language,
            limit,
        } => {
            tracing::info!(
                keyword = %keyword,
                language = %language,
                limit = ?limit,
                "Starting crawl command"
            );
            crawl(config, keyword, language, limit).await?;
        }

        Commands::Stats => {
            stats(config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("gale=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("gale=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn crawl(
    config: Config,
    keyword: String,
    language: String,
    limit: Option<usize>,
) -> Result<()> {
    let repository = SqliteRepository::new(&config.database.sqlite_path)?;
    let queue = RedisProcessQueue::new(&config.queue)?;
    let crawler = NytCrawler::new(&config).context("Failed to create crawler")?;

    let limit = limit.unwrap_or(usize::MAX);

    let summary =
        gale::tasks::crawl_keyword(&crawler, &repository, &queue, &keyword, &language, limit)
            .await?;

    println!("Crawl complete for \"{}\"", summary.keyword_string);
    println!("  Pages fetched:     {}", summary.pages_fetched);
    println!("  Documents seen:    {}", summary.documents_seen);
    println!("  Records stored:    {}", summary.stored);
    println!("  Documents skipped: {}", summary.skipped);
    println!("  Tasks dispatched:  {}", summary.dispatched);
    if summary.dispatch_failures > 0 {
        println!("  Dispatch failures: {}", summary.dispatch_failures);
    }
    if summary.aborted {
        println!("  Pagination aborted early; results are partial");
    }

    Ok(())
}

fn stats(config: Config) -> Result<()> {
    let repository = SqliteRepository::new(&config.database.sqlite_path)?;
    let stats = repository.get_stats()?;

    println!("Storage statistics");
    println!("  Keywords: {}", stats.keywords);
    println!("  Crawls:   {}", stats.crawls);

    Ok(())
}

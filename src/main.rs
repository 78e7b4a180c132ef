//! # sift CLI Application
//!
//! Command-line access to the content extraction pipeline.
//!
//! ## Subcommands
//!
//! - `fetch`: fetch one URL as a normalized document
//! - `search`: run web searches and fetch every distinct result
//! - `ask`: answer a task from the content of one URL
//!
//! Documents are cached in a local libsql database (or in memory with
//! `--memory-cache`) for 24 hours.

mod telemetry;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use sift::answer::{CompletionAnswerService, web_task};
use sift::cache::{CacheDatabase, DocumentCache, MemoryCache};
use sift::document::Document;
use sift::fetcher::{ContentExtractor, FetchContext, FetcherConfig};
use sift::model::{DEFAULT_GEMINI_MODEL, DEFAULT_REQUESTS_PER_MINUTE, gemini_from_env};
use sift::search::{DEFAULT_RESULTS_PER_QUERY, GoogleSearch, SearchAggregator, SearchQuery};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Parser)]
#[command(author, version, about = "Fetch, cache and search web content for LLM pipelines", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Cache database path
    #[arg(long, global = true, default_value = ".sift/cache.db")]
    cache: PathBuf,

    /// Keep the cache in memory for this run only
    #[arg(long, global = true)]
    memory_cache: bool,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Show the browser window for JavaScript-rendered pages
    #[arg(long, global = true)]
    no_headless: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL as a normalized document
    Fetch(FetchArgs),

    /// Search the web and fetch the results
    Search(SearchArgs),

    /// Answer a task using the content of a URL
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// URL to fetch
    #[arg(required = true)]
    url: String,

    /// Ignore any cached copy
    #[arg(short, long)]
    refresh: bool,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search queries, run concurrently
    #[arg(required = true)]
    query: Vec<String>,

    /// Language of the queries
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Only results from the last N days; zero or less means no limit
    #[arg(short = 'd', long, default_value = "-1", allow_hyphen_values = true)]
    recent_days: i32,

    /// Results requested per query
    #[arg(short = 'n', long, default_value_t = DEFAULT_RESULTS_PER_QUERY)]
    max_results: usize,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// URL to read
    #[arg(required = true)]
    url: String,

    /// Task to answer from the content
    #[arg(required = true)]
    task: String,

    /// Gemini model to answer with
    #[arg(short, long, default_value = DEFAULT_GEMINI_MODEL)]
    model: String,

    /// Maximum model requests per minute
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    rate_limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _otel = telemetry::init_tracing_subscriber(cli.global.log_dir.as_deref())?;

    let extractor = build_extractor(&cli.global).await?;

    match cli.command {
        Commands::Fetch(args) => fetch_command(&extractor, args).await?,
        Commands::Search(args) => search_command(&extractor, args).await?,
        Commands::Ask(args) => ask_command(&extractor, args).await?,
    }

    Ok(())
}

async fn build_extractor(global: &GlobalArgs) -> anyhow::Result<ContentExtractor> {
    let cache: Arc<dyn DocumentCache> = if global.memory_cache {
        Arc::new(MemoryCache::new())
    } else {
        let db = CacheDatabase::new_from_path(&global.cache).await?;
        let purged = db.purge_expired().await?;
        info!("Opened cache {} ({} expired entries purged)", global.cache.display(), purged);
        Arc::new(db)
    };

    let config = FetcherConfig::builder()
        .headless(!global.no_headless)
        .build();

    Ok(ContentExtractor::new(FetchContext::new(config, cache)?))
}

#[instrument(skip(extractor))]
async fn fetch_command(extractor: &ContentExtractor, args: FetchArgs) -> anyhow::Result<()> {
    let document = extractor
        .afetch(&args.url, args.refresh)
        .await
        .ok_or_else(|| anyhow!("Could not fetch {}", args.url))?;

    print_documents(&[document], &args.format)
}

#[instrument(skip(extractor))]
async fn search_command(extractor: &ContentExtractor, args: SearchArgs) -> anyhow::Result<()> {
    let engine = GoogleSearch::from_env(reqwest::Client::new())?;
    let aggregator = SearchAggregator::new(Arc::new(engine), extractor.clone())
        .with_max_results(args.max_results);

    let queries = args
        .query
        .iter()
        .map(|q| SearchQuery::new(args.language.clone(), q.clone()).recent_days(args.recent_days))
        .collect::<Vec<_>>();

    let documents = aggregator.aggregate(&queries).await;
    if documents.is_empty() && args.format == "text" {
        println!("No results found.");
        return Ok(());
    }

    print_documents(&documents, &args.format)
}

#[instrument(skip(extractor))]
async fn ask_command(extractor: &ContentExtractor, args: AskArgs) -> anyhow::Result<()> {
    let model = gemini_from_env(&args.model, args.rate_limit)?;
    let service = CompletionAnswerService::new(model);

    let answer = web_task(extractor, &service, &args.url, &args.task).await?;
    println!("{}", answer);

    Ok(())
}

fn print_documents(documents: &[Document], format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(documents)?);
        return Ok(());
    }

    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            println!("\n---\n");
        }
        println!("# {}", document.title().unwrap_or("(untitled)"));
        for (name, value) in document.metadata_fields() {
            if let Some(value) = value {
                println!("{}: {}", name, value);
            }
        }
        println!();
        println!("{}", document.page_content());
    }

    Ok(())
}

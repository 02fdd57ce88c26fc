//! Quote-Origin command line interface

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quote_origin::{
    batch::{self, BatchOptions},
    config::{self, Settings},
    extraction::StaticExtractor,
    network::HttpClient,
    Pipeline, PipelineResult, ResolveRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quote-origin")]
#[command(version)]
#[command(about = "Find the original-language source of a translated quotation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to settings.yml
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Verbose debug logs
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the quotation of a single article
    Resolve(ResolveArgs),

    /// Build a dataset from a CSV of articles
    Batch(BatchArgs),
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["text", "file"])))]
struct ResolveArgs {
    /// Inline article text
    #[arg(long)]
    text: Option<String>,

    /// Path to a UTF-8 article file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Quotation to resolve
    #[arg(long)]
    quote: Option<String>,

    /// Article date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Number of keywords to extract
    #[arg(long)]
    top_n: Option<usize>,

    /// Keywords to include in the query
    #[arg(long)]
    top_k: Option<usize>,

    /// Use transcript-oriented query construction and search
    #[arg(long)]
    rollcall: bool,

    /// Run web search and span matching
    #[arg(long)]
    search: bool,

    /// Number of top similarity spans to return
    #[arg(long)]
    top_matches: Option<usize>,

    /// JSON file with a precomputed extraction (entities and keywords)
    #[arg(long)]
    extraction: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Input CSV of articles
    #[arg(long)]
    input: PathBuf,

    /// Output CSV path
    #[arg(long)]
    output: PathBuf,

    /// Column holding article text
    #[arg(long)]
    text_col: Option<String>,

    /// Column holding the article date
    #[arg(long)]
    date_col: Option<String>,

    /// Never use the transcript backend
    #[arg(long)]
    no_rollcall: bool,

    /// Quotes resolved concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Spans kept per quote
    #[arg(long)]
    top_matches: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings_path = config::settings_path(cli.config.as_deref());
    let settings = config::load(settings_path.as_deref())?;

    let level = if cli.debug || settings.general.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    info!("Starting quote-origin v{}", quote_origin::VERSION);
    match &settings_path {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    let client = HttpClient::with_settings(&settings.outgoing)?;
    match cli.command {
        Commands::Resolve(args) => resolve(&settings, client, args).await,
        Commands::Batch(args) => run_batch(&settings, client, args).await,
    }
}

async fn resolve(settings: &Settings, client: HttpClient, args: ResolveArgs) -> Result<()> {
    let mut builder = Pipeline::builder(settings, client);
    if let Some(path) = &args.extraction {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read extraction file: {}", path.display()))?;
        builder = builder.with_extractor(Arc::new(StaticExtractor::from_json(&json)?));
    }
    let pipeline = builder.build();

    let request = ResolveRequest {
        text: args.text,
        file: args.file,
        quote: args.quote,
        date: args.date,
        top_n: args.top_n,
        top_k: args.top_k,
        top_matches: args.top_matches,
        rollcall: args.rollcall,
        search: args.search,
    };
    let result = pipeline.resolve(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &PipelineResult) {
    let summary = &result.pipeline_result;

    println!("\n=== Entities by type ===");
    for (label, words) in &summary.entities_by_type {
        println!("{}: {:?}", label, words);
    }

    println!("\n=== Top keywords ===");
    for keyword in &summary.keywords {
        println!("{}  ({:.4})", keyword.text, keyword.score);
    }

    println!("\n=== Queries ===");
    println!("KO: {}", summary.queries.ko.as_deref().unwrap_or("-"));
    println!("EN: {}", summary.queries.en.as_deref().unwrap_or("-"));

    if !result.search_items.is_empty() {
        let backend = result
            .search_backend
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("\n=== Search results ({}) ===", backend);
        for (i, item) in result.search_items.iter().take(5).enumerate() {
            println!("[{}] {}", i + 1, item.link);
            if !item.snippet.is_empty() {
                println!("    {}", item.snippet);
            }
        }
    }

    if !result.span_candidates.is_empty() {
        println!("\n=== Top spans ===");
        for (i, span) in result.span_candidates.iter().enumerate() {
            println!("[{}] score={:.4} url={}", i + 1, span.best_score, span.url);
            println!("    best: {}", span.best_sentence);
            println!("    span: {}", span.span_text);
        }
    }
}

async fn run_batch(settings: &Settings, client: HttpClient, args: BatchArgs) -> Result<()> {
    let mut options = BatchOptions::from(&settings.batch);
    if let Some(col) = args.text_col {
        options.text_col = col;
    }
    if let Some(col) = args.date_col {
        options.date_col = col;
    }
    if args.no_rollcall {
        options.rollcall = false;
    }
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    if let Some(top_matches) = args.top_matches {
        options.top_matches = top_matches;
    }

    let pipeline = Pipeline::from_settings(settings, client);
    let records = batch::build_dataset(&pipeline, &args.input, &args.output, &options).await?;
    println!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(())
}

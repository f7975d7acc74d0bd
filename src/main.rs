//! # veille CLI
//!
//! Command-line front end for the competitive-intelligence pipeline.
//!
//! - `crawl`: crawl a company's sites and print the deduplicated French
//!   passages mentioning the keywords
//! - `dedup`: re-run the relevance filter and duplicate detector over a saved
//!   passage list
//!
//! Ctrl-C stops a crawl at the next page boundary; the passages gathered so
//! far are still reported.

mod telemetry;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use veille::crawler::{BrowserFetcher, CrawlProgress, CrawlerConfig, HttpFetcher, PageFetcher};
use veille::pipeline::{CrawlRequest, DEFAULT_REPORT_LIMIT, Pipeline, PipelineConfig};
use veille::processor::{Passage, ProcessorConfig, filter_passages, read_passages};

#[derive(Parser)]
#[command(author, version, about = "Competitive-intelligence crawler for French company websites", long_about = None)]
struct Cli {
    /// Export traces and metrics over OTLP
    #[arg(long, global = true)]
    otel: bool,

    /// Also write logs to veille.log in this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl seed sites and report relevant, deduplicated passages
    Crawl(CrawlArgs),

    /// Filter and deduplicate a saved passage list
    Dedup(DedupArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FetcherKind {
    /// Headless Chrome, renders client-side content
    Browser,
    /// Plain HTTP GET
    Http,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Company name used as the report label
    #[arg(short, long)]
    company: String,

    /// Seed URL (repeatable, at most 5)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// File with one seed URL per line
    #[arg(long)]
    urls_file: Option<PathBuf>,

    /// Comma-separated keywords
    #[arg(short, long)]
    keywords: String,

    /// Maximum number of pages per seed
    #[arg(short = 'p', long, default_value = "20")]
    max_pages: u32,

    /// Pages fetched concurrently within one site
    #[arg(long, default_value = "1")]
    concurrency: usize,

    /// Crawl all seeds at the same time
    #[arg(long)]
    parallel_seeds: bool,

    /// How pages are fetched
    #[arg(long, value_enum, default_value_t = FetcherKind::Browser)]
    fetcher: FetcherKind,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "15000")]
    timeout_ms: u64,

    /// Wait after navigation for client-rendered content, in milliseconds
    #[arg(long, default_value = "7000")]
    settle_ms: u64,

    /// CSS selector signalling the page is ready (bounded by --settle-ms)
    #[arg(long)]
    wait_for: Option<String>,

    /// Wall-clock budget per seed, in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Passages shown in text output
    #[arg(short, long, default_value_t = DEFAULT_REPORT_LIMIT)]
    limit: usize,
}

#[derive(Args, Debug)]
struct DedupArgs {
    /// JSON file holding a list of {url, text} passages
    #[arg(short, long)]
    input: PathBuf,

    /// Comma-separated keywords
    #[arg(short, long)]
    keywords: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _telemetry = telemetry::init_tracing_subscriber(cli.otel, cli.log_file.clone())?;

    match cli.command {
        Commands::Crawl(args) => crawl_command(args).await?,
        Commands::Dedup(args) => dedup_command(args).await?,
    }

    Ok(())
}

fn pipeline_config(args: &CrawlArgs) -> PipelineConfig {
    let crawler = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .concurrency(args.concurrency)
        .navigation_timeout(Duration::from_millis(args.timeout_ms))
        .settle_delay(Duration::from_millis(args.settle_ms))
        .wait_for_selector(args.wait_for.clone())
        .crawl_deadline(args.deadline_secs.map(Duration::from_secs))
        .build();

    PipelineConfig::builder()
        .crawler(crawler)
        .processor(ProcessorConfig::default())
        .parallel_seeds(args.parallel_seeds)
        .build()
}

fn make_fetcher(kind: FetcherKind, config: &CrawlerConfig) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let fetcher: Arc<dyn PageFetcher> = match kind {
        FetcherKind::Browser => Arc::new(BrowserFetcher::new(config)),
        FetcherKind::Http => Arc::new(HttpFetcher::new(config)?),
    };
    Ok(fetcher)
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let mut urls_text = args.urls.join("\n");
    if let Some(path) = &args.urls_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        urls_text.push('\n');
        urls_text.push_str(&content);
    }
    let request = CrawlRequest::from_raw(&args.company, &urls_text, &args.keywords);

    let config = pipeline_config(&args);
    let fetcher = make_fetcher(args.fetcher, &config.crawler)?;

    let (progress_sender, mut progress_receiver) = mpsc::channel(100);
    let pipeline = Pipeline::new(fetcher, config).with_progress(progress_sender);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {pos} pages {msg}")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Crawling for {}...", request.company));

    let progress_handle = tokio::spawn({
        let spinner = spinner.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                spinner.inc(1);
                match event {
                    CrawlProgress::PageFetched { url, .. } => spinner.set_message(url),
                    CrawlProgress::PageFailed { url, .. } => spinner.set_message(format!("skipped {url}")),
                }
            }
        }
    });

    let result = pipeline.run(&request, cancel).await;
    drop(pipeline);
    let _ = progress_handle.await;
    spinner.finish_and_clear();

    let report = result?;
    if report.incomplete {
        warn!("Crawl did not finish; the report is partial");
    }

    let rendered = match args.format {
        OutputFormat::Text => report.to_text(args.limit),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    write_output(&rendered, args.output.as_deref()).await
}

#[instrument]
async fn dedup_command(args: DedupArgs) -> anyhow::Result<()> {
    let passages = read_passages(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;
    let keywords: Vec<&str> = args
        .keywords
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if keywords.is_empty() {
        anyhow::bail!("no keyword given");
    }

    let (kept, stats) = filter_passages(passages, keywords.as_slice(), &ProcessorConfig::default());

    let rendered = match args.format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct DedupOutput<'a> {
                passages: &'a [Passage],
                stats: veille::processor::ProcessStats,
            }
            serde_json::to_string_pretty(&DedupOutput {
                passages: &kept,
                stats,
            })?
        }
        OutputFormat::Text => {
            let mut out = format!(
                "{} passages kept out of {} ({} near duplicates, {} exact)\n",
                kept.len(),
                stats.segmented,
                stats.near_duplicates,
                stats.exact_duplicates
            );
            for passage in &kept {
                out.push_str(&format!("\n{}\n   {}\n", passage.text, passage.url));
            }
            out
        }
    };
    write_output(&rendered, args.output.as_deref()).await
}

/// Write to `output` when given, stdout otherwise
async fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Saved report to {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_args_map_to_config() {
        let cli = Cli::parse_from([
            "veille",
            "crawl",
            "--company",
            "ACME",
            "--url",
            "https://acme.fr",
            "--url",
            "https://acme.com",
            "--keywords",
            "innovation",
            "--max-pages",
            "7",
            "--settle-ms",
            "500",
            "--deadline-secs",
            "60",
            "--fetcher",
            "http",
        ]);
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl command");
        };

        assert_eq!(args.urls.len(), 2);
        assert!(matches!(args.fetcher, FetcherKind::Http));

        let config = pipeline_config(&args);
        assert_eq!(config.crawler.max_pages, 7);
        assert_eq!(config.crawler.settle_delay, Duration::from_millis(500));
        assert_eq!(config.crawler.crawl_deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.crawler.concurrency, 1);
        assert!(!config.parallel_seeds);
    }

    #[tokio::test]
    async fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rapport.txt");

        write_output("Veille : ACME", Some(&path)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Veille : ACME");
    }
}

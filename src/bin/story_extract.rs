//! `story-extract`: command-line front end for the extraction pipelines.
//!
//! Results are printed as JSON on stdout; logs go to stderr and follow
//! `RUST_LOG` (default `info`).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use story_extractor::agent::{AgentProducer, OpenAiAgent};
use story_extractor::{
    extract, parse_url_list, Config, ContentProducer, Fetcher, FileStorage, HeuristicProducer, Orchestrator, Storage,
};

#[derive(Parser)]
#[command(name = "story-extract", version, about = "Extract stories from web pages")]
struct Cli {
    /// Storage directory (overrides STORY_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// URLs processed at once in a batch (overrides STORY_CONCURRENCY)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Render pages with headless Chromium first (needs the `browser` feature)
    #[arg(long, global = true)]
    browser: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and extract a single URL
    Url {
        url: String,
    },
    /// Process every URL in a CSV file (first column) as one batch
    Batch {
        csv: PathBuf,
    },
    /// Re-run the failed stories of a batch
    Retry {
        batch_id: String,
    },
    /// Print a stored story or batch
    Show {
        id: String,
        /// Print the story's rendered HTML instead of its record
        #[arg(long)]
        html: bool,
    },
    /// Extract a local HTML file ("-" for stdin) without storing anything
    Extract {
        file: PathBuf,
        /// URL the page was fetched from, for resolving links
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if cli.browser {
        config.fetch.use_browser = true;
    }
    config.validate()?;

    if let Command::Extract { file, url } = &cli.command {
        return extract_file(&config, file, url.as_deref());
    }
    run_pipeline(&config, cli.command).await
}

fn extract_file(config: &Config, file: &Path, url: Option<&str>) -> Result<ExitCode> {
    let html = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
    };

    match extract(&html, url, &config.extract) {
        Ok(content) => {
            print_json(&json!({ "success": true, "content": content }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_json(&json!({ "success": false, "error": err.to_failure() }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_pipeline(config: &Config, command: Command) -> Result<ExitCode> {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.data_dir).await?);
    let orchestrator = Orchestrator::new(
        Arc::new(build_fetcher(config)?),
        build_producer(config)?,
        Arc::clone(&storage),
        config.concurrency,
    );

    match command {
        Command::Url { url } => {
            let outcome = orchestrator.process_url(&url).await;
            let success = outcome.is_success();
            print_json(&json!({
                "success": success,
                "story": outcome.story,
                "error": outcome.failure,
            }))?;
            Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Batch { csv } => {
            let text = tokio::fs::read_to_string(&csv)
                .await
                .with_context(|| format!("reading {}", csv.display()))?;
            let urls = parse_url_list(&text)?;
            let batch = orchestrator.process_batch(&urls).await?;
            print_json(&json!({ "success": true, "batch": batch }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Retry { batch_id } => {
            let outcome = orchestrator.retry_batch(&batch_id).await?;
            print_json(&json!({
                "success": true,
                "batch": outcome.batch,
                "retried": outcome.retried,
                "recovered": outcome.recovered,
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id, html } => show(storage.as_ref(), &id, html).await,
        Command::Extract { file, url } => extract_file(config, &file, url.as_deref()),
    }
}

async fn show(storage: &dyn Storage, id: &str, html: bool) -> Result<ExitCode> {
    if html {
        let Some(document) = storage.read_html(id).await? else {
            bail!("no HTML stored for {id}");
        };
        println!("{document}");
        return Ok(ExitCode::SUCCESS);
    }

    let record = if id.starts_with("batch_") {
        storage.get_batch(id).await?.map(|batch| json!({ "success": true, "batch": batch }))
    } else {
        storage.get_story(id).await?.map(|story| json!({ "success": true, "story": story }))
    };
    match record {
        Some(value) => {
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            print_json(&json!({ "success": false, "error": "NOT_FOUND", "message": format!("{id} not found") }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_fetcher(config: &Config) -> Result<Fetcher> {
    let fetcher = Fetcher::new(config.fetch.clone())?;
    if !config.fetch.use_browser {
        return Ok(fetcher);
    }

    #[cfg(feature = "browser")]
    {
        use story_extractor::fetch::browser::ChromiumLauncher;
        use story_extractor::fetch::BrowserSession;

        let launcher = ChromiumLauncher {
            navigation_timeout: Some(config.fetch.timeout),
            ..ChromiumLauncher::default()
        };
        info!("browser rendering enabled");
        Ok(fetcher.with_renderer(Arc::new(BrowserSession::new(launcher))))
    }
    #[cfg(not(feature = "browser"))]
    {
        tracing::warn!("browser rendering requested but this build lacks the `browser` feature; using HTTP only");
        Ok(fetcher)
    }
}

fn build_producer(config: &Config) -> Result<Arc<dyn ContentProducer>> {
    let Some(agent) = &config.agent else {
        return Ok(Arc::new(HeuristicProducer::new(config.extract.clone())));
    };
    info!(model = %agent.model, "using extraction agent");
    let producer = AgentProducer::new(OpenAiAgent::new(agent)?)
        .with_policy(agent.review_policy)
        .with_max_input_chars(agent.max_input_chars)
        .with_options(config.extract.clone());
    Ok(Arc::new(producer))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use sentrag_core::config::{expand_path, Config};
use sentrag_pipeline::{ingest_pipeline, query_pipeline};

#[derive(Parser, Debug)]
#[command(name = "sentrag", about = "Sentence-window retrieval over an embedding service and a document store")]
struct Cli {
    /// Base TOML config; `<stem>.<RUST_ENV>.toml` next to it is layered on top
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk, embed and store a `.txt` file or every visible file under a directory
    Ingest { path: PathBuf },
    /// Retrieve context for a question and print the rendered prompt
    Query { question: String },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "sentrag failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = expand_path(&cli.config);
    let settings = Config::load_from(&config_path)
        .and_then(|c| c.settings())
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let base_dir = config_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

    match cli.command {
        Commands::Ingest { path } => {
            let pipeline = ingest_pipeline(&settings)?;
            if path.is_dir() {
                let report = pipeline.ingest_dir(&path)?;
                for failure in &report.failed {
                    println!("failed  {}: {:#}", failure.path.display(), failure.error);
                }
                println!(
                    "Ingested {} rows from {} files ({} failed)",
                    report.rows(),
                    report.ingested.len(),
                    report.failed.len()
                );
            } else {
                let rows = pipeline.ingest_file(&path)?;
                tracing::info!(path = %path.display(), rows, "ingested file");
                println!("Ingested {rows} rows from {}", path.display());
            }
        }
        Commands::Query { question } => {
            let pipeline = query_pipeline(&settings, base_dir)?;
            println!("{}", pipeline.answer_prompt(&question)?);
        }
    }
    Ok(())
}

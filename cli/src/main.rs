//! Seriesjoin CLI
//!
//! Command-line interface for aligning time series and exporting them as CSV.
//!
//! # Usage
//!
//! ```bash
//! seriesjoin --help
//! seriesjoin align cpu.json mem.json --output aligned.csv
//! seriesjoin export --request batch.json --datasources datasources.json
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::align::align;
use shared::export::{export_batch, write_csv};
use shared::fetch::RoutingFetcher;
use shared::models::{BatchRequest, Point, Series, Table};
use shared::storage::InMemoryDataSourceStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Seriesjoin CLI - align time series on timestamp and export them as CSV
#[derive(Parser)]
#[command(name = "seriesjoin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write CSV here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Align local series files; each is a JSON array of {"timestamp", "value"}
    Align {
        /// Series files, one column each, in column order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Sort points and drop duplicate timestamps instead of rejecting them
        #[arg(long)]
        normalize: bool,
    },

    /// Run a batch export request against the configured data sources
    Export {
        /// Batch request file (JSON array of series requests)
        #[arg(short, long)]
        request: PathBuf,

        /// Data source registry file
        #[arg(short, long, env = "SERIESJOIN_DATASOURCES")]
        datasources: PathBuf,

        /// Per-series fetch timeout in seconds
        #[arg(long, env = "SERIESJOIN_FETCH_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,
    },
}

/// Loads one series file, labelled by its file stem.
fn load_series(path: &Path, normalize: bool) -> Result<(String, Series)> {
    let contents =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let points: Vec<Point> = serde_json::from_slice(&contents)
        .with_context(|| format!("{} is not a JSON array of points", path.display()))?;

    let series = if normalize {
        Series::from_unsorted(points)
    } else {
        Series::new(points).with_context(|| {
            format!(
                "{} is not sorted by timestamp (use --normalize to sort it)",
                path.display()
            )
        })?
    };

    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(file = %path.display(), points = series.len(), "Loaded series");
    Ok((label, series))
}

fn align_files(files: &[PathBuf], normalize: bool) -> Result<Table> {
    let (labels, series): (Vec<String>, Vec<Series>) = files
        .iter()
        .map(|path| load_series(path, normalize))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    Ok(Table::new(labels, align(&series)))
}

async fn run_export(request: &Path, datasources: &Path, timeout: Duration) -> Result<Table> {
    let body =
        std::fs::read(request).with_context(|| format!("Failed to read {}", request.display()))?;
    let batch = BatchRequest::from_json(&body)
        .with_context(|| format!("Invalid batch request in {}", request.display()))?;

    let store = InMemoryDataSourceStore::load_from_file(datasources)
        .with_context(|| format!("Failed to load data sources from {}", datasources.display()))?;
    let fetcher = RoutingFetcher::for_external_stores(timeout)?;

    Ok(export_batch(&batch, &store, &fetcher).await?)
}

fn write_table(table: &Table, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_csv(table, &mut writer)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), rows = table.row_count(), "Wrote CSV");
        }
        None => write_csv(table, std::io::stdout().lock())?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let table = match cli.command {
        Some(Commands::Align { files, normalize }) => align_files(&files, normalize)?,
        Some(Commands::Export {
            request,
            datasources,
            timeout_secs,
        }) => run_export(&request, &datasources, Duration::from_secs(timeout_secs)).await?,
        None => {
            println!("Seriesjoin CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    write_table(&table, cli.output.as_deref())
}

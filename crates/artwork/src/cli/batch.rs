//! The `artwork batch` command: bounded-concurrency builds with progress and streaming output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use artwork_core::{BatchItem, CatalogEntry, Config, OutputFormat, OutputWriter};
use clap::{Args, ValueEnum};
use tokio::sync::Semaphore;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `batch` command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Catalog file (JSON array of products)
    #[arg(long)]
    pub catalog: PathBuf,

    /// Maximum builds in flight
    #[arg(short, long, default_value_t = 4)]
    pub parallel: usize,

    /// Write reports to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Jsonl)]
    pub format: Format,
}

/// Counts shown after a batch.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    complete: u64,
    partial: u64,
    failed: u64,
}

impl Summary {
    fn record(&mut self, item: &BatchItem) {
        match item {
            BatchItem::Built(build) if build.derivatives.is_complete() => self.complete += 1,
            BatchItem::Built(_) => self.partial += 1,
            BatchItem::Failed { .. } => self.failed += 1,
        }
    }

    fn total(&self) -> u64 {
        self.complete + self.partial + self.failed
    }
}

/// Execute the batch command.
pub async fn execute(args: BatchArgs, config: &Config) -> anyhow::Result<()> {
    if args.parallel == 0 {
        anyhow::bail!("--parallel must be at least 1");
    }

    let (builder, catalog) = super::open_builder(config, &args.catalog)?;
    let builder = Arc::new(builder);
    let entries: Vec<CatalogEntry> = catalog.entries().to_vec();
    tracing::info!(
        "Building {} products from {:?} ({} in parallel)",
        entries.len(),
        args.catalog,
        args.parallel
    );

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let format = OutputFormat::from(args.format);
    let mut writer = OutputWriter::new(sink, format, args.output.is_none());

    let progress = create_progress_bar(entries.len() as u64);
    let start = Instant::now();

    let semaphore = Arc::new(Semaphore::new(args.parallel));
    let mut handles = Vec::with_capacity(entries.len());
    for entry in entries {
        let builder = Arc::clone(&builder);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            build_entry(&builder, entry).await
        }));
    }

    let mut summary = Summary::default();
    let mut collected = Vec::new();
    for handle in handles {
        let item = handle.await?;
        summary.record(&item);

        // JSONL streams as builds finish; JSON needs the whole array
        match format {
            OutputFormat::JsonLines => writer.write(&item)?,
            OutputFormat::Json => collected.push(item),
        }

        progress.inc(1);
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} builds/sec", summary.total() as f64 / elapsed));
        }
    }

    if format == OutputFormat::Json {
        writer.write_all(&collected)?;
    }
    writer.flush()?;
    if let Some(path) = &args.output {
        tracing::info!("Reports written to {:?}", path);
    }

    progress.finish_and_clear();
    print_summary(&summary, start.elapsed());

    if summary.failed > 0 {
        anyhow::bail!("{} of {} builds failed", summary.failed, summary.total());
    }
    Ok(())
}

async fn build_entry(builder: &artwork_core::ArtworkBuilder, entry: CatalogEntry) -> BatchItem {
    let result = match entry.key() {
        Ok(key) => builder
            .build_artifact(&key, entry.product_type.as_deref())
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(build) => BatchItem::Built(build),
        Err(error) => {
            tracing::error!("Failed: NRN {} / NSN {} - {}", entry.nrn, entry.nsn, error);
            BatchItem::Failed {
                nrn: entry.nrn,
                nsn: entry.nsn,
                error,
            }
        }
    }
}

/// Create a progress bar for batch builds.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a batch.
fn print_summary(summary: &Summary, elapsed: Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        summary.total() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Complete:     {:>8}", summary.complete);
    if summary.partial > 0 {
        eprintln!("    Partial:      {:>8}", summary.partial);
    }
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} builds/sec", rate);
    eprintln!("  ====================================");
}

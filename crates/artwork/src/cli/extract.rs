//! The `artwork extract` command.

use std::path::PathBuf;

use anyhow::Context;
use artwork_core::locator;
use artwork_core::pipeline::{ArchiveExtractor, DOCUMENT_PATTERN};
use clap::Args;

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Archive path or `file:` locator
    pub archive: String,

    /// Directory to copy the entry into
    pub destination: PathBuf,

    /// Glob matched against entry base names
    #[arg(long, default_value = DOCUMENT_PATTERN)]
    pub pattern: String,
}

/// Execute the extract command and print the outcome as JSON.
pub async fn execute(args: ExtractArgs) -> anyhow::Result<()> {
    let archive = locator::local_path(&args.archive)
        .with_context(|| format!("{} is not a local archive", args.archive))?;
    if !args.destination.is_dir() {
        anyhow::bail!(
            "Destination {} is not a directory",
            args.destination.display()
        );
    }

    let extractor = ArchiveExtractor::new(&args.pattern)?;
    let destination = args.destination.clone();
    let outcome =
        tokio::task::spawn_blocking(move || extractor.extract(&archive, &destination)).await??;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

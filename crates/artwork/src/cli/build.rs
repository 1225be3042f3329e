//! The `artwork build` command.

use std::path::PathBuf;

use artwork_core::{CatalogKey, Config};
use clap::Args;

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Catalog file (JSON array of products)
    #[arg(long)]
    pub catalog: PathBuf,

    /// Product NRN
    #[arg(long)]
    pub nrn: String,

    /// Product NSN
    #[arg(long)]
    pub nsn: String,

    /// Product type (defaults to the catalog entry's, then "unavailable")
    #[arg(long)]
    pub product_type: Option<String>,
}

/// Execute the build command and print the report as pretty JSON.
pub async fn execute(args: BuildArgs, config: &Config) -> anyhow::Result<()> {
    let (builder, catalog) = super::open_builder(config, &args.catalog)?;
    let key = CatalogKey::new(&args.nrn, &args.nsn)?;

    let product_type = args.product_type.clone().or_else(|| {
        catalog
            .entries()
            .iter()
            .find(|entry| entry.key().is_ok_and(|k| k == key))
            .and_then(|entry| entry.product_type.clone())
    });

    let build = builder
        .build_artifact(&key, product_type.as_deref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&build)?);

    if !build.derivatives.is_complete() {
        anyhow::bail!("Build for {} did not write every derivative", key);
    }
    Ok(())
}

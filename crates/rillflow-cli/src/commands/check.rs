use std::path::Path;

use anyhow::{Context, Result};

use rillflow_engine::{PassThrough, Pipeline};

/// Execute the `check` command: resolve configuration and build the
/// connectors without moving any data.
pub async fn execute(dir: &Path) -> Result<()> {
    let pipeline = Pipeline::builder(PassThrough)
        .config_dir(dir)
        .build()
        .with_context(|| format!("failed to build pipeline from {}", dir.display()))?;

    println!("Pipeline:    {}", pipeline.name());
    match pipeline.source() {
        Some(desc) => println!("Source:      {} (OK)", desc.kind),
        None => println!("Source:      none configured"),
    }
    match pipeline.destination() {
        Some(desc) => println!("Destination: {} (OK)", desc.kind),
        None => println!("Destination: none configured"),
    }

    if pipeline.source().is_none() || pipeline.destination().is_none() {
        anyhow::bail!("pipeline is missing a source or destination")
    }
    println!("\nAll checks passed.");
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};

use rillflow_engine::{PassThrough, Pipeline, PipelineState};

/// Execute the `run` command: build the pipeline from `dir` and drive it.
pub async fn execute(dir: &Path, name: Option<&str>) -> Result<()> {
    let mut builder = Pipeline::builder(PassThrough).config_dir(dir);
    if let Some(name) = name {
        builder = builder.name(name);
    }
    let mut pipeline = builder
        .build()
        .with_context(|| format!("failed to build pipeline from {}", dir.display()))?;

    // Ctrl-C requests a clean stop through the cancellation token.
    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping pipeline");
            cancel.cancel();
        }
    });

    pipeline.run().await?;

    match pipeline.state() {
        PipelineState::Idle => println!("Pipeline '{}' drained its source.", pipeline.name()),
        _ => println!("Pipeline '{}' stopped.", pipeline.name()),
    }
    Ok(())
}

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rillflow",
    version,
    about = "Streaming enrichment pipelines: source in, transform, destination out"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline until its source drains or Ctrl-C is pressed
    Run {
        /// Directory containing the pipeline config file
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Override the pipeline name from the config file
        #[arg(long)]
        name: Option<String>,
    },
    /// Resolve a pipeline's configuration and connectors without running it
    Check {
        /// Directory containing the pipeline config file
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run { dir, name } => commands::run::execute(&dir, name.as_deref()).await,
        Commands::Check { dir } => commands::check::execute(&dir).await,
    }
}

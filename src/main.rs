//! Mindmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "mindmap")]
#[command(about = "Interactive mind-map editor backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Editor configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the editor server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Document to load instead of the seed node
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Write a new document holding only the seed node
    New {
        /// Output path
        #[arg(short, long, default_value = mindmap_core::DEFAULT_FILE_NAME)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print a structural summary of a document
    Inspect {
        /// Document to inspect
        file: PathBuf,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "mindmap={0},mindmap_core={0},mindmap_server={0}",
            log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Mindmap v{}", env!("CARGO_PKG_VERSION"));

    let config = mindmap_core::EditorConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, open, file } => {
            commands::serve(config, host, port, open, file).await
        }
        Commands::New { output, force } => commands::new_document(config, output, force),
        Commands::Inspect { file } => commands::inspect(file),
        Commands::Version => {
            println!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

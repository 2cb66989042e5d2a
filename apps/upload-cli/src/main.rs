//! SearchHub upload client entry point.

mod app;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File store base URL (overrides the configuration file)
    #[arg(short, long, value_name = "URL", global = true)]
    server: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file. Ctrl-C pauses, Enter resumes, a second Ctrl-C cancels.
    Upload {
        file: PathBuf,
        /// Destination folder under the store root
        #[arg(short, long, value_name = "NAME")]
        folder: Option<String>,
        /// Register the file in the search index after upload
        #[arg(long)]
        index: bool,
    },
    /// Show the server-side progress of an upload session
    Status {
        #[arg(value_name = "UPLOAD_ID")]
        upload_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::Config::load()?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    tracing::debug!(server = %config.server_url, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    match cli.cmd {
        Command::Upload {
            file,
            folder,
            index,
        } => rt.block_on(app::upload(&config, &file, folder, index)),
        Command::Status { upload_id } => rt.block_on(app::status(&config, &upload_id)),
    }
}

//! # resume-chat CLI
//!
//! ## Usage
//!
//! ```bash
//! resume-chat --config ./config/resume-chat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resume-chat serve` | Start the HTTP server (upload + chat endpoints) |
//! | `resume-chat ingest <file.pdf>` | Ingest a PDF and print its namespace |
//! | `resume-chat chat <namespace>` | Chat interactively with an ingested document |
//! | `resume-chat chat --file <file.pdf>` | Ingest first, then chat in the same process |
//!
//! ## Examples
//!
//! ```bash
//! # Serve the API for the web front-end
//! resume-chat serve
//!
//! # Ingest a resume into the configured index
//! resume-chat ingest ./resume.pdf
//!
//! # Chat against a previously ingested namespace
//! resume-chat chat 6f9c2a31-8d4e-4b7a-9c1d-0e5f3a72b816
//!
//! # One-process ingest + chat (works with the in-memory index)
//! resume-chat chat --file ./resume.pdf
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use resume_chat::{chat_cmd, config, ingest_cmd, server};

/// Chat with an uploaded resume — conversational retrieval over a PDF.
#[derive(Parser)]
#[command(
    name = "resume-chat",
    about = "Chat with an uploaded resume — conversational retrieval over a PDF",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/resume-chat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (upload + chat endpoints).
    Serve,

    /// Ingest a PDF and print the namespace its chunks were indexed under.
    Ingest {
        /// Path to the PDF file.
        file: PathBuf,
    },

    /// Chat interactively with an ingested document.
    Chat {
        /// Namespace of a previously ingested document.
        namespace: Option<String>,

        /// Ingest this PDF first and chat against the fresh namespace.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ingest { file } => {
            ingest_cmd::run_ingest(&cfg, &file).await?;
        }
        Commands::Chat { namespace, file } => {
            chat_cmd::run_chat(&cfg, namespace, file.as_deref()).await?;
        }
    }

    Ok(())
}

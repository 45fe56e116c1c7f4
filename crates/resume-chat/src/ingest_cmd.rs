//! One-shot document ingestion from the command line.

use std::path::Path;

use anyhow::{Context, Result};

use resume_chat_core::ingest::{ingest, IngestConfig};

use crate::config::Config;
use crate::loader;

/// Load a PDF, ingest it, and print the namespace to query it under.
pub async fn run_ingest(config: &Config, file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let text = loader::extract_text(&bytes)?;

    let embedder = crate::embedding::create_embedding_provider(&config.embedding)?;
    let index = crate::index::create_index(&config.index)?;

    if config.index.provider == "memory" {
        eprintln!("warning: index provider is 'memory'; the namespace will not outlive this process");
    }

    let ingest_config = IngestConfig {
        chunk_size: config.chunking.chunk_size,
        chunk_overlap: config.chunking.chunk_overlap,
        ..IngestConfig::default()
    };
    let namespace = ingest(&text, embedder.as_ref(), index.as_ref(), &ingest_config).await?;

    println!("ingest {}", file.display());
    println!("  characters extracted: {}", text.chars().count());
    println!("  namespace: {}", namespace);
    println!("ok");

    Ok(())
}

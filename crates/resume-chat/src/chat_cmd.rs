//! Interactive chat loop over an ingested document.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use resume_chat_core::ingest::{ingest, IngestConfig};
use resume_chat_core::models::Namespace;
use resume_chat_core::session::ChatSession;

use crate::config::Config;
use crate::loader;

/// Run a terminal chat session.
///
/// Attaches to `namespace` if given; with `--file`, ingests the PDF first
/// and chats against the fresh namespace (the only way to use the `memory`
/// index provider from the CLI, since its contents die with the process).
pub async fn run_chat(config: &Config, namespace: Option<String>, file: Option<&Path>) -> Result<()> {
    let embedder = crate::embedding::create_embedding_provider(&config.embedding)?;
    let index = crate::index::create_index(&config.index)?;
    let generator = crate::generation::create_generator(&config.generation)?;

    let namespace = match (namespace, file) {
        (_, Some(path)) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let text = loader::extract_text(&bytes)?;
            let ingest_config = IngestConfig {
                chunk_size: config.chunking.chunk_size,
                chunk_overlap: config.chunking.chunk_overlap,
                ..IngestConfig::default()
            };
            let ns = ingest(&text, embedder.as_ref(), index.as_ref(), &ingest_config).await?;
            println!("Ingested {} under namespace {}", path.display(), ns);
            ns
        }
        (Some(ns), None) => Namespace::from(ns),
        (None, None) => anyhow::bail!("Provide a namespace or --file <pdf> to ingest"),
    };

    let mut session = ChatSession::with_namespace(namespace);
    session.set_top_k(config.retrieval.top_k);

    println!("Chat ready. Ask questions about the document; type \"exit\" to quit.");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        match session
            .ask(embedder.as_ref(), index.as_ref(), generator.as_ref(), question)
            .await
        {
            Ok(answer) => println!("AI: {}", answer),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

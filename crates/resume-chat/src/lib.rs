//! # resume-chat
//!
//! Upload a resume (PDF) and hold a multi-turn conversation grounded in its
//! content. The pipeline lives in `resume-chat-core`; this crate supplies
//! everything around it: configuration, the PDF loader, concrete capability
//! providers, the HTTP server, and the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────────┐   ┌───────────────┐
//! │  Upload    │──▶│  Ingestion Pipeline  │──▶│  Vector Index │
//! │  (PDF)     │   │  chunk + embed       │   │  namespace N  │
//! └────────────┘   └──────────────────────┘   └──────┬────────┘
//!                                                    │
//!            ┌───────────────────────────────────────┤
//!            ▼                                       ▼
//!   ┌────────────────┐    per turn:      ┌────────────────────┐
//!   │  Chat surface  │  rewrite ─▶ retrieve ─▶ synthesize      │
//!   │  HTTP / CLI    │                   │  grounded answer   │
//!   └────────────────┘                   └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`loader`] | PDF text extraction |
//! | [`embedding`] | Google / Ollama embedding providers |
//! | [`generation`] | Google / Ollama generation providers |
//! | [`index`] | In-memory / Pinecone vector index backends |
//! | [`server`] | HTTP upload and chat endpoints |
//! | [`ingest_cmd`] | `ingest` CLI command |
//! | [`chat_cmd`] | `chat` CLI command |

pub mod chat_cmd;
pub mod config;
pub mod embedding;
pub mod generation;
mod http;
pub mod index;
pub mod ingest_cmd;
pub mod loader;
pub mod server;

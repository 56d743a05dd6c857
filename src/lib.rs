//! Gmail Assistant
//!
//! An AI-assisted email triage system: fetches recent Gmail messages,
//! classifies each by urgency with a local Ollama model, drafts a reply,
//! persists the processed record, and creates the draft in Gmail. Stored
//! drafts can later be previewed and (explicitly) sent, and aggregate
//! statistics can be recomputed from history at any time.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 authentication with token caching
//! - **Fetching**: Recent messages with decoded plain-text bodies
//! - **Classification**: Model-based urgency categorization with lenient,
//!   safe-default response parsing
//! - **Reply drafting**: Model-generated replies, scrubbed of reasoning
//!   artifacts before anything is persisted or sent
//! - **Persistence**: Append-only record store plus a per-draft store with a
//!   terminal sent partition
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_assistant::{auth, client::GmailMailbox, config::Config};
//! use gmail_assistant::generation::OllamaClient;
//! use gmail_assistant::processor::EmailProcessor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         config.gmail.credentials.as_ref(),
//!         config.gmail.token_cache.as_ref(),
//!     )
//!     .await?;
//!
//!     let processor = EmailProcessor::new(
//!         GmailMailbox::new(hub, config.gmail.user_email.clone()),
//!         OllamaClient::new(config.ollama.host.clone(), config.ollama.model.clone()),
//!         config.storage.records_dir.clone(),
//!         config.storage.drafts_dir.clone(),
//!     );
//!
//!     let stats = processor.process_emails(config.processing.fetch_limit).await?;
//!     println!("Processed {} emails", stats.total_emails);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`cleaner`] - Reply-text artifact scrubbing
//! - [`cli`] - Command-line interface and processor assembly
//! - [`client`] - Gmail mailbox client (fetch / draft / send)
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result alias
//! - [`generation`] - Ollama generation client and classify parsing
//! - [`interactive`] - Interactive command loop
//! - [`models`] - Core data structures
//! - [`processor`] - The email processing pipeline
//! - [`storage`] - Record and draft stores

pub mod auth;
pub mod cleaner;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod interactive;
pub mod models;
pub mod processor;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{AssistantError, Result};

// Core data models
pub use models::{
    Classification, EmailCategory, EmailMessage, ProcessedEmail, ProcessingStats, StoredDraft,
};

// Collaborator traits and production clients
pub use client::{DraftOutcome, GmailMailbox, Mailbox, SendOutcome};
pub use generation::{GenerationClient, OllamaClient};

// Pipeline
pub use processor::{EmailProcessor, SendDraftOutcome};

// Stores
pub use storage::{DraftStore, RecordStore};

// Config types
pub use config::{Config, GmailConfig, OllamaConfig, ProcessingConfig, StorageConfig};

// CLI types (for binary usage)
pub use cli::{Cli, Commands};

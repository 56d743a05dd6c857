//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::auth;
use crate::client::GmailMailbox;
use crate::config::Config;
use crate::error::{AssistantError, Result};
use crate::generation::OllamaClient;
use crate::models::{EmailCategory, ProcessingStats};
use crate::processor::EmailProcessor;

#[derive(Parser, Debug)]
#[command(name = "gmail-assistant")]
#[command(version)]
#[command(about = "AI-assisted email triage and reply drafting", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to run; without one, the interactive loop starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with the Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Fetch recent emails, classify them, and create reply drafts
    Process {
        /// Maximum number of emails to fetch (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show aggregate statistics from stored history (no fetching)
    Stats,

    /// Print an AI-generated digest of stored history
    Digest,

    /// Preview a stored draft, or send it with --confirm
    Send {
        /// Identifier of the draft (the originating email id)
        draft_id: String,

        /// Recipient email address
        recipient: String,

        /// Actually send; without this flag only a preview is printed
        #[arg(long)]
        confirm: bool,
    },

    /// Generate a standalone draft with the model and create it in Gmail
    Compose {
        /// Recipient email address
        to: String,

        /// Draft subject
        #[arg(short, long)]
        subject: String,

        /// What the draft should say
        #[arg(short, long)]
        message: String,

        /// Urgency bucket to write the draft for
        #[arg(long, default_value = "IMPORTANT")]
        category: EmailCategory,
    },

    /// Start the interactive command loop
    Interactive,

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Assemble the full processor: authenticated mailbox, generation client,
/// and both stores.
pub async fn build_processor(
    config: &Config,
) -> Result<EmailProcessor<GmailMailbox, OllamaClient>> {
    if config.gmail.user_email.is_empty() {
        return Err(AssistantError::ConfigError(
            "gmail.user_email is not set (config file or GMAIL_USER_EMAIL)".to_string(),
        ));
    }

    let hub = auth::initialize_gmail_hub(
        Path::new(&config.gmail.credentials),
        Path::new(&config.gmail.token_cache),
    )
    .await?;

    let mailbox = GmailMailbox::new(hub, config.gmail.user_email.clone());
    let generation = OllamaClient::new(config.ollama.host.clone(), config.ollama.model.clone());

    Ok(EmailProcessor::new(
        mailbox,
        generation,
        config.storage.records_dir.clone(),
        config.storage.drafts_dir.clone(),
    ))
}

/// Print batch or historical statistics in the operator-facing format.
pub fn print_stats(stats: &ProcessingStats) {
    println!("Total Emails: {}", stats.total_emails);
    println!("Categories:");
    for (category, count) in &stats.categories {
        println!("  {}: {}", category, count);
    }
}

/// Print the result of a draft preview or send.
pub fn print_send_outcome(outcome: &crate::processor::SendDraftOutcome) {
    use crate::processor::SendDraftOutcome;

    match outcome {
        SendDraftOutcome::Preview { to, subject, body } => {
            println!("--- Preview (not sent) ---");
            println!("To: {}", to);
            println!("Subject: {}", subject);
            println!();
            println!("{}", body);
            println!();
            println!("Re-run with --confirm to send.");
        }
        SendDraftOutcome::Sent { id, .. } => println!("Sent (message id {})", id),
        SendDraftOutcome::Failed { error } => println!("Send failed: {}", error),
    }
}

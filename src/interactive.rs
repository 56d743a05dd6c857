//! Interactive command loop
//!
//! Mirrors the subcommand surface as a small REPL: process a batch, inspect
//! statistics, preview/send stored drafts. Ctrl-C and EOF both exit cleanly.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{print_send_outcome, print_stats};
use crate::client::Mailbox;
use crate::error::{AssistantError, Result};
use crate::generation::GenerationClient;
use crate::processor::EmailProcessor;

pub async fn run<M: Mailbox, G: GenerationClient>(
    processor: &EmailProcessor<M, G>,
    default_limit: usize,
    user_email: &str,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nEnter command (type 'process' to process emails, 'help' for options, 'exit' to quit): ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nExiting...");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };

        // EOF on stdin ends the loop the same way 'exit' does.
        let Some(line) = line else {
            println!("Exiting...");
            return Ok(());
        };

        let args: Vec<&str> = line.split_whitespace().collect();
        match args.first().map(|s| s.to_lowercase()).as_deref() {
            None => continue,
            Some("exit") | Some("quit") => {
                println!("Exiting...");
                return Ok(());
            }
            Some("help") => print_help(),
            Some("process") => {
                let limit = args
                    .get(1)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default_limit);
                println!("Processing emails...");
                println!("Drafts will be created in {}", user_email);
                match processor.process_emails(limit).await {
                    Ok(stats) => {
                        println!("Processed {} emails", stats.total_emails);
                        print_stats(&stats);
                    }
                    Err(e) => println!("Processing failed: {}", e),
                }
            }
            Some("stats") => match processor.get_daily_stats().await {
                Ok(stats) => {
                    println!("\nCurrent Email Statistics:");
                    print_stats(&stats);
                }
                Err(e) => println!("Failed to read statistics: {}", e),
            },
            Some("digest") => match processor.generate_digest().await {
                Ok(digest) if !digest.is_empty() => println!("\n{}", digest),
                Ok(_) => println!("Digest generation returned no content."),
                Err(e) => println!("Digest failed: {}", e),
            },
            Some("send") => handle_send(processor, &args[1..]).await,
            Some(_) => println!("Unknown command. Type 'help' for available options."),
        }
    }
}

async fn handle_send<M: Mailbox, G: GenerationClient>(
    processor: &EmailProcessor<M, G>,
    args: &[&str],
) {
    if args.len() < 2 {
        println!("Usage: send <draft-id> <recipient> [--confirm]");
        return;
    }
    let confirm = args.get(2).map(|s| *s == "--confirm").unwrap_or(false);

    match processor.send_drafted_email(args[0], args[1], confirm).await {
        Ok(outcome) => print_send_outcome(&outcome),
        Err(AssistantError::DraftNotFound(id)) => println!("No draft found for '{}'", id),
        Err(e) => println!("Send failed: {}", e),
    }
}

fn print_help() {
    println!("\nAvailable commands:");
    println!("  help    - Show this help message");
    println!("  exit    - Exit the program");
    println!("  process [limit] - Process new emails");
    println!("  stats   - Show current email statistics");
    println!("  digest  - Print an AI-generated digest of stored history");
    println!("  send <draft-id> <recipient> [--confirm] - Preview or send a stored draft");
}

use anyhow::Result;
use clap::Parser;
use gmail_assistant::cli::{self, Cli, Commands};
use gmail_assistant::client::DraftOutcome;
use gmail_assistant::config::Config;
use gmail_assistant::error::AssistantError;
use gmail_assistant::generation::{GenerationClient, OllamaClient};
use gmail_assistant::storage::RecordStore;
use gmail_assistant::{auth, interactive, processor};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: gmail-assistant --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // This is necessary because multiple dependencies use different crypto providers
    // On non-Windows platforms, use aws-lc-rs (better performance, FIPS support)
    // On Windows, use ring (better compatibility, no NASM/CMake required)
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_assistant=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_assistant=info,warn,error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail API...");
            let config = Config::load_with_env(&cli.config).await?;

            let token_cache = std::path::PathBuf::from(&config.gmail.token_cache);

            // Ensure token cache directory exists
            if let Some(parent) = token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Delete existing token if force flag is set
            if force && token_cache.exists() {
                tokio::fs::remove_file(&token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            // Initialize Gmail hub (will trigger OAuth flow if needed)
            let hub = auth::initialize_gmail_hub(
                std::path::Path::new(&config.gmail.credentials),
                &token_cache,
            )
            .await?;
            auth::secure_token_file(&token_cache).await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", token_cache);

            // Test the connection - must specify scope to avoid triggering additional OAuth flow
            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope("https://www.googleapis.com/auth/gmail.readonly")
                .doit()
                .await
                .map_err(AssistantError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(())
        }

        Commands::Process { limit } => {
            let config = Config::load_with_env(&cli.config).await?;
            let processor = cli::build_processor(&config).await?;
            let limit = limit.unwrap_or(config.processing.fetch_limit);

            println!("Processing emails...");
            println!("Drafts will be created in {}", config.gmail.user_email);

            let stats = processor.process_emails(limit).await?;
            println!("Processed {} emails", stats.total_emails);
            cli::print_stats(&stats);

            Ok(())
        }

        Commands::Stats => {
            let config = Config::load_with_env(&cli.config).await?;

            // Reading history needs neither Gmail nor the model
            let records = RecordStore::new(config.storage.records_dir.clone());
            let stats = processor::compute_daily_stats(&records)?;

            println!("\nCurrent Email Statistics:");
            cli::print_stats(&stats);

            Ok(())
        }

        Commands::Digest => {
            let config = Config::load_with_env(&cli.config).await?;

            let records = RecordStore::new(config.storage.records_dir.clone());
            let stats = processor::compute_daily_stats(&records)?;
            let generation =
                OllamaClient::new(config.ollama.host.clone(), config.ollama.model.clone());

            let digest = generation.generate_digest(&stats).await;
            if digest.is_empty() {
                println!("Digest generation returned no content.");
            } else {
                println!("{}", digest);
            }

            Ok(())
        }

        Commands::Send {
            draft_id,
            recipient,
            confirm,
        } => {
            let config = Config::load_with_env(&cli.config).await?;
            let processor = cli::build_processor(&config).await?;

            let outcome = processor
                .send_drafted_email(&draft_id, &recipient, confirm)
                .await?;
            cli::print_send_outcome(&outcome);

            Ok(())
        }

        Commands::Compose {
            to,
            subject,
            message,
            category,
        } => {
            let config = Config::load_with_env(&cli.config).await?;
            let processor = cli::build_processor(&config).await?;

            match processor.compose_draft(&to, &subject, &message, category).await {
                DraftOutcome::Created { id, .. } => {
                    println!("Created draft {} for {}", id, to);
                }
                DraftOutcome::Failed { error } => {
                    println!("Error creating draft: {}", error);
                }
            }

            Ok(())
        }

        Commands::Interactive => {
            let config = Config::load_with_env(&cli.config).await?;
            let processor = cli::build_processor(&config).await?;

            interactive::run(
                &processor,
                config.processing.fetch_limit,
                &config.gmail.user_email,
            )
            .await?;

            Ok(())
        }

        Commands::InitConfig { output, force } => {
            tracing::info!("Generating example configuration file");

            // Check if file exists
            if output.exists() && !force {
                return Err(AssistantError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            // Create example config
            Config::create_example(&output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - gmail.user_email: Account that drafts are created in");
            println!("  - ollama.host / ollama.model: Generation service endpoint");
            println!("  - storage.records_dir / storage.drafts_dir: Where history is kept");
            println!("  - processing.fetch_limit: Default batch size");

            Ok(())
        }
    }
}

//! Nexus registry sync CLI.
//!
//! Merges the `NexusBootstrap` and `NexusAccountFactory` addresses from local
//! deployment artifacts into the shared S3 registry document, after a single
//! operator confirmation.
//!
//! # Usage
//!
//! ```bash
//! # Sync every chain deployed to the main environment
//! nexus-sync sync --env main
//!
//! # Sync a subset of chains
//! nexus-sync sync --env staging --chains 8453,10
//!
//! # Show what would change without prompting or uploading
//! nexus-sync sync --env demo --dry-run
//!
//! # Print the current registry document
//! nexus-sync show --env main
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nexus_registry::{Chain, Environment, validate_environment};
use nexus_sync::commit::{self, CommitOutcome, Confirm, Prompt};
use nexus_sync::config::{Config, DEFAULT_CONFIG_FILE};
use nexus_sync::remote::RemoteRegistry;
use nexus_sync::{SyncError, discover};

/// Nexus deployment registry sync.
#[derive(Debug, Parser)]
#[command(name = "nexus-sync", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Merge local deployment artifacts into the remote registry.
    Sync {
        /// Environment: main, demo or staging.
        #[arg(long = "env")]
        environment: String,

        /// Comma-separated chain IDs to sync (e.g. `1,10,8453`).
        /// If omitted, every chain found on disk is synced.
        #[arg(long)]
        chains: Option<String>,

        /// Merge and print the summary, but never prompt or upload.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the current remote registry document.
    Show {
        /// Environment: main, demo or staging.
        #[arg(long = "env")]
        environment: String,
    },

    /// List all configured chains.
    List,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sync {
            environment,
            chains,
            dry_run,
        } => {
            let config = Config::load(&cli.config)?;
            cmd_sync(&config, &environment, chains.as_deref(), dry_run).await
        }
        Command::Show { environment } => {
            let config = Config::load(&cli.config)?;
            cmd_show(&config, &environment).await
        }
        Command::List => {
            cmd_list();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validate the environment and build the registry client for its bucket.
/// Fails before any remote I/O.
fn resolve(config: &Config, environment: &str) -> Result<(Environment, RemoteRegistry)> {
    if !validate_environment(environment) {
        anyhow::bail!("invalid environment {environment:?} (expected main, demo or staging)");
    }
    let env: Environment = environment.parse()?;
    let bucket = config.buckets.bucket_for(env)?;
    let remote =
        RemoteRegistry::s3(bucket).with_context(|| format!("configuring S3 bucket {bucket}"))?;
    tracing::info!(environment = %env, bucket, "using registry bucket");
    Ok((env, remote))
}

/// Execute the `sync` subcommand.
#[allow(clippy::print_stdout)]
async fn cmd_sync(
    config: &Config,
    environment: &str,
    chains: Option<&str>,
    dry_run: bool,
) -> Result<ExitCode> {
    let (environment, remote) = resolve(config, environment)?;

    let filter = chains.map(discover::parse_chain_list).transpose()?;
    let targets = discover::discover(config, environment, filter.as_deref())?;

    let (document, report) = nexus_sync::prepare(config, &remote, environment, &targets).await?;
    let summary = commit::render_summary(environment, remote.bucket(), &document, &report);

    if dry_run {
        println!("{summary}");
        tracing::info!("dry run, nothing uploaded");
        return Ok(ExitCode::SUCCESS);
    }

    // Stdin is read on the blocking pool; the lock never crosses an await.
    let approved = tokio::task::spawn_blocking(move || Prompt::stdio().confirm(&summary))
        .await
        .context("reading operator confirmation")?;

    let outcome =
        commit::commit(&remote, environment, &document, &report, &mut |_: &str| approved).await;
    match outcome {
        Ok(CommitOutcome::Uploaded) => {
            tracing::info!(
                succeeded = report.success_count(),
                failed = report.failure_count(),
                "sync finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(CommitOutcome::Declined) => {
            tracing::info!("sync aborted by operator");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(anyhow::Error::new(SyncError::from(e)).context("registry upload failed")),
    }
}

/// Execute the `show` subcommand.
#[allow(clippy::print_stdout)]
async fn cmd_show(config: &Config, environment: &str) -> Result<ExitCode> {
    let (environment, remote) = resolve(config, environment)?;
    let document = remote.fetch(environment).await;
    println!("{}", document.to_json()?);
    Ok(ExitCode::SUCCESS)
}

/// Execute the `list` subcommand.
#[allow(clippy::print_stdout)]
fn cmd_list() {
    println!("{:<12} {:<18} Type", "Chain ID", "Name");
    println!("{}", "-".repeat(40));

    for chain in Chain::ALL {
        let net_type = if chain.is_testnet() { "test" } else { "main" };
        println!("{:<12} {:<18} {}", chain.chain_id(), chain.name(), net_type);
    }
}

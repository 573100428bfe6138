use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::ProviderDirectoryEntry;
use crate::ports::{JobQueue, ProviderDirectory, TransactionRepository};
use crate::services::{dispatch_fetch_updates, DispatchReport};

#[derive(Parser)]
#[command(name = "tingg-core")]
#[command(about = "Tingg Core - mobile money payout reconciliation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server and the periodic fetch-update scheduler (default)
    Serve,

    /// Schedule a status poll for every unfinished Tingg transaction
    FetchUpdate,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Provider directory commands
    #[command(subcommand)]
    Provider(ProviderCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Map a host mobile money provider onto a Tingg service code
    Add {
        /// Id of the provider in the host catalog
        #[arg(long)]
        source_provider_id: Uuid,

        /// Tingg service code, e.g. MTNNG
        #[arg(long)]
        code: String,
    },

    /// List provider mappings
    List,
}

pub async fn handle_fetch_update(
    transactions: &dyn TransactionRepository,
    queue: &dyn JobQueue,
) -> anyhow::Result<DispatchReport> {
    let report = dispatch_fetch_updates(transactions, queue).await?;

    tracing::info!(
        pending = report.pending,
        dispatched = report.dispatched,
        skipped = report.skipped,
        released = report.released,
        "Fetch update dispatch finished"
    );
    println!("{}", report.message());

    Ok(report)
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;
    println!("✓ Database migrations completed");

    Ok(())
}

pub async fn handle_provider_add(
    providers: &dyn ProviderDirectory,
    source_provider_id: Uuid,
    code: &str,
) -> anyhow::Result<ProviderDirectoryEntry> {
    let code = code.trim();
    if code.is_empty() {
        anyhow::bail!("Provider code must not be empty");
    }

    let entry = providers
        .insert(ProviderDirectoryEntry::new(source_provider_id, code))
        .await?;

    tracing::info!(
        source_provider_id = %entry.source_provider_id,
        code = %entry.provider_code,
        "Provider mapping added"
    );
    println!("✓ Provider {} mapped to {}", entry.source_provider_id, entry.provider_code);

    Ok(entry)
}

pub async fn handle_provider_list(providers: &dyn ProviderDirectory) -> anyhow::Result<()> {
    let entries = providers.list().await?;

    if entries.is_empty() {
        println!("No provider mappings found");
        return Ok(());
    }

    println!("{:<38} {:<16} {:<20}", "Source provider", "Code", "Created");
    println!("{}", "-".repeat(76));
    for entry in entries {
        println!(
            "{:<38} {:<16} {:<20}",
            entry.source_provider_id,
            entry.provider_code,
            entry.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Tingg API URL: {}", config.tingg.url);
    println!("  Tingg API Username: {}", config.tingg.username);
    println!("  Tingg API Password: ****");
    println!("  Tingg API Timeout: {}s", config.tingg.timeout_secs);
    println!("  Sender Name: {}", config.sender.name);
    println!("  Fetch Update Interval: {}s", config.fetch_update_interval_secs);
    println!("  Job Lease: {}s", config.job_lease_secs);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}

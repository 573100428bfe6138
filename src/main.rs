use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tingg_core::adapters::{PostgresJobQueue, PostgresProviderDirectory, PostgresTransactionRepository};
use tingg_core::cli::{self, Cli, Commands, DbCommands, ProviderCommands};
use tingg_core::config::{Config, LogFormat};
use tingg_core::services::run_fetch_update_scheduler;
use tingg_core::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::FetchUpdate => {
            let pool = db::create_pool(&config).await?;
            let transactions = PostgresTransactionRepository::new(pool.clone());
            let queue = PostgresJobQueue::with_lease(pool, job_lease(&config));
            cli::handle_fetch_update(&transactions, &queue).await?;
            Ok(())
        }
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Provider(ProviderCommands::Add {
            source_provider_id,
            code,
        }) => {
            let pool = db::create_pool(&config).await?;
            let providers = PostgresProviderDirectory::new(pool);
            cli::handle_provider_add(&providers, source_provider_id, &code).await?;
            Ok(())
        }
        Commands::Provider(ProviderCommands::List) => {
            let pool = db::create_pool(&config).await?;
            cli::handle_provider_list(&PostgresProviderDirectory::new(pool)).await
        }
        Commands::Config => cli::handle_config_validate(&config),
    }
}

fn job_lease(config: &Config) -> Duration {
    Duration::from_secs(config.job_lease_secs)
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let app_state = AppState::new(pool.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = tokio::spawn(run_fetch_update_scheduler(
        app_state.transactions.clone(),
        Arc::new(PostgresJobQueue::with_lease(pool, job_lease(&config))),
        Duration::from_secs(config.fetch_update_interval_secs),
        shutdown_rx,
    ));

    let app = create_app(app_state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(true);
    scheduler.await?;

    Ok(())
}

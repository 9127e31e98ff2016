use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use evaluator::{Evaluator, ScorerEvaluator};
use tokio_util::sync::CancellationToken;
use tracing::info;

use server::catalog::Catalog;
use server::config::{AppConfig, RescoreConfig};
use server::rescore::RescoreScheduler;

#[derive(Parser)]
#[command(name = "ledger", about = "Solution ledger and re-score loop")]
struct Cli {
    /// Config file, extension optional
    #[arg(long, env = "LEDGER_CONFIG", default_value = "config/config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the re-score scheduler until Ctrl-C (default)
    Serve,
    /// Run a single re-score sweep and exit
    Sweep,
    /// Delete solutions that duplicate an earlier payload for the same problem
    Dedup,
    /// Delete tag rows with empty text
    RemoveEmptyTags,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config).context("Failed to load config")?;

    let catalog = Catalog::connect(&config)
        .await
        .context("Failed to open catalog")?;
    info!(storage = %config.storage.base_path.display(), "Catalog ready");

    let evaluator: Arc<dyn Evaluator> = Arc::new(ScorerEvaluator::new(config.evaluator.clone()));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(catalog, evaluator, config.rescore).await?,
        Command::Sweep => {
            let (scheduler, _handle) = RescoreScheduler::new(catalog, evaluator, config.rescore);
            let stats = scheduler.sweep(&CancellationToken::new()).await?;
            info!(
                candidates = stats.candidates,
                scored = stats.scored,
                rejected = stats.rejected,
                failed = stats.failed,
                "Sweep finished"
            );
        }
        Command::Dedup => {
            let report = catalog.dedup_solutions().await?;
            info!(deleted = report.solutions_deleted, "Dedup finished");
        }
        Command::RemoveEmptyTags => {
            let removed = catalog.remove_empty_tags().await?;
            info!(removed, "Empty tags removed");
        }
    }

    Ok(())
}

async fn serve(
    catalog: Catalog,
    evaluator: Arc<dyn Evaluator>,
    rescore: RescoreConfig,
) -> anyhow::Result<()> {
    if !rescore.enabled {
        info!("Re-score scheduler disabled, nothing to serve");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let (scheduler, _handle) = RescoreScheduler::new(catalog, evaluator, rescore);
    let task = tokio::spawn(scheduler.run(cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    cancel.cancel();
    task.await.context("Re-score scheduler panicked")?;
    Ok(())
}

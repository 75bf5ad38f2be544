//! Tokenbook Simulator
//!
//! Workload harness: seeds a ledger and drives it with deterministic
//! scenarios or randomized concurrent transfers.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod metrics;
mod scenario;
mod workload;

use tokenbook_ledger::{ChannelSink, EventSink, LedgerConfig, MemorySink, TracingSink, TransferProcessor};

use scenario::Scenario;
use workload::{account_pool, WorkloadController};

/// Tokenbook Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Tokenbook workload and scenario harness")]
struct Args {
    /// Scenario to run (deterministic mode)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Number of accounts besides the owner (randomized mode)
    #[arg(short, long, default_value = "8")]
    accounts: usize,

    /// Number of concurrent workers (randomized mode)
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Transfers issued per worker (randomized mode)
    #[arg(short, long, default_value = "250")]
    transfers: u64,

    /// Maximum single transfer amount (randomized mode)
    #[arg(long, default_value = "100")]
    max_amount: u64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Tokenbook Simulator");

    // Load configuration
    let config = LedgerConfig::from_env();
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(
        token = %config.token,
        owner = %config.owner,
        total_supply = config.total_supply,
        "Ledger configuration loaded"
    );

    match &args.scenario {
        Some(name) => run_scenario_mode(&config, name),
        None => run_random_mode(&config, &args).await,
    }
}

/// Deterministic mode: one named scenario against a fresh ledger.
fn run_scenario_mode(config: &LedgerConfig, name: &str) -> anyhow::Result<()> {
    let scenario = Scenario::load(name)?;

    let observed = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(TracingSink::new()), observed.clone()];

    let processor = Arc::new(TransferProcessor::new(config.token.clone(), sinks));
    processor.initialize(&config.owner, config.total_supply)?;

    let controller = WorkloadController::new(processor.clone());
    controller.run_scenario(&scenario)?;

    let metrics = controller.metrics();
    info!("Scenario complete");
    info!("Transfers: {}", metrics.total_transfers);
    info!("Events observed: {}", observed.len());
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}

/// Randomized mode: concurrent workers issuing seeded random transfers,
/// with an async consumer draining the event channel.
async fn run_random_mode(config: &LedgerConfig, args: &Args) -> anyhow::Result<()> {
    let (sink, mut rx) = ChannelSink::new();
    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(sink)];

    let processor = Arc::new(TransferProcessor::new(config.token.clone(), sinks));
    processor.initialize(&config.owner, config.total_supply)?;

    // Drain events until every sender is gone
    let consumer = tokio::spawn(async move {
        let mut count = 0u64;
        while rx.recv().await.is_some() {
            count += 1;
        }
        count
    });

    let seed = args.seed.unwrap_or_else(rand::random);
    let pool = account_pool(&config.owner, args.accounts);

    let controller = WorkloadController::new(processor.clone());
    controller
        .run_random(pool, args.workers, args.transfers, args.max_amount, seed)
        .await?;

    let metrics = controller.metrics();
    let journal_len = processor.journal().len();

    // Drop every sender so the consumer sees the channel close
    drop(controller);
    drop(processor);
    let observed = consumer.await?;

    info!("Workload complete");
    info!("Total transfers: {}", metrics.total_transfers);
    info!("Successful: {}", metrics.successful_transfers);
    info!("Rejected: {}", metrics.rejected_transfers);
    info!("Average latency: {}us", metrics.average_latency_us());
    info!("Journal records: {}", journal_len);
    info!("Events observed: {}", observed);
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    if observed != metrics.successful_transfers {
        return Err(anyhow::anyhow!(
            "Event count {} does not match successful transfers {}",
            observed,
            metrics.successful_transfers
        ));
    }

    Ok(())
}

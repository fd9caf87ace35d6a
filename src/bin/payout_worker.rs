use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;

use payouts::configure::load_config;
use payouts::logger::setup_logger;
use payouts::payout::{
    Currency, LogProgress, MemoryStore, NewPayout, PayoutProcessor, PayoutQueue, PayoutService,
    PayoutWorker, ProcessorConfig, SimulatedRail,
};

#[derive(Parser)]
#[command(author, version, about = "Payout processing worker")]
struct Cli {
    /// Create a demo payout on startup so the pipeline has something to run
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    setup_logger(&config)?;
    log::info!("🚀 Payout worker starting...");

    // In-memory wiring; a real deployment implements PayoutStore over its
    // database and PaymentRail over the settlement network client.
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(PayoutQueue::new(config.queue_capacity));
    let rail = Arc::new(SimulatedRail::new());
    let progress = Arc::new(LogProgress);

    let processor = Arc::new(PayoutProcessor::new(
        store.clone(),
        rail,
        progress,
        ProcessorConfig {
            stale_after_ms: config.stale_after_ms,
        },
    ));

    let service = PayoutService::new(store.clone(), queue.clone(), config.enqueue_delay_ms);

    if cli.demo {
        let payout = service
            .create(NewPayout {
                amount: Decimal::new(15_000, 2), // 150.00
                currency: Currency::Usd,
                recipient_details: serde_json::json!({
                    "type": "card",
                    "card_number": "5555555555554444",
                    "card_holder": "Ivanov Ivan",
                    "expiry_date": "12/25"
                }),
                description: Some("Demo payout".to_string()),
            })
            .await?;
        log::info!(
            "Demo payout {} enqueued (delivery in {}ms)",
            payout.id,
            config.enqueue_delay_ms
        );
    }

    let worker = PayoutWorker::new(processor, store, queue, config.worker_config());
    log::info!("📡 Waiting for payout jobs...");
    worker.run().await;

    Ok(())
}

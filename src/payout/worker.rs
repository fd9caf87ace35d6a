//! Background worker and work queue for payout processing
//!
//! The queue delivers "process payout" messages at-least-once with a
//! per-message delivery delay; the worker drains it and runs each delivery
//! through the processor. A periodic scanner re-enqueues non-terminal
//! payouts that have gone quiet, so a crashed attempt is always followed by
//! a fresh delivery eventually.

use crossbeam::queue::ArrayQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::payout::processor::PayoutProcessor;
use crate::payout::store::PayoutStore;
use crate::payout::types::Outcome;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Scan interval for stale payouts (ms)
    pub scan_interval_ms: u64,
    /// Stale threshold (ms) - non-terminal payouts untouched longer than
    /// this are re-enqueued by the scanner
    pub stale_after_ms: i64,
    /// Queue capacity
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 5000,   // 5 seconds
            stale_after_ms: 300_000,  // 5 minutes, matches the processor
            queue_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QueuedJob {
    payout_id: Uuid,
    /// Earliest delivery time (ms)
    ready_at: i64,
}

/// Work queue (ring buffer with backpressure)
///
/// At-least-once: duplicate enqueues of the same payout id are allowed and
/// expected; the processor is idempotent against them.
pub struct PayoutQueue {
    buffer: ArrayQueue<QueuedJob>,
}

impl PayoutQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: ArrayQueue::new(capacity),
        }
    }

    /// Enqueue for immediate delivery.
    /// Returns false if the queue is full (backpressure).
    pub fn enqueue(&self, payout_id: Uuid) -> bool {
        self.enqueue_after(payout_id, 0)
    }

    /// Enqueue with a delivery delay.
    pub fn enqueue_after(&self, payout_id: Uuid, delay_ms: i64) -> bool {
        let job = QueuedJob {
            payout_id,
            ready_at: chrono::Utc::now().timestamp_millis() + delay_ms,
        };
        self.buffer.push(job).is_ok()
    }

    /// Pop the next job whose delivery delay has elapsed.
    ///
    /// Jobs are enqueued with uniform delays, so the head is always the
    /// earliest due; a head that is not due yet is pushed back and nothing
    /// is delivered this round.
    pub fn try_pop_ready(&self) -> Option<Uuid> {
        let job = self.buffer.pop()?;
        if job.ready_at <= chrono::Utc::now().timestamp_millis() {
            Some(job.payout_id)
        } else {
            let _ = self.buffer.push(job);
            None
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Background worker for payout processing
pub struct PayoutWorker {
    processor: Arc<PayoutProcessor>,
    store: Arc<dyn PayoutStore>,
    queue: Arc<PayoutQueue>,
    config: WorkerConfig,
}

impl PayoutWorker {
    pub fn new(
        processor: Arc<PayoutProcessor>,
        store: Arc<dyn PayoutStore>,
        queue: Arc<PayoutQueue>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            processor,
            store,
            queue,
            config,
        }
    }

    /// Process every delivery that is currently due.
    /// Returns the number of attempts run.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;
        while let Some(payout_id) = self.queue.try_pop_ready() {
            let outcome = self.processor.process(payout_id).await;
            match &outcome {
                Outcome::Completed => {
                    log::info!("Payout {} attempt finished: completed", payout_id);
                }
                Outcome::AlreadyCompleted | Outcome::InProgress => {
                    log::debug!(
                        "Payout {} attempt dropped: {}",
                        payout_id,
                        outcome.label()
                    );
                }
                Outcome::NotFound => {
                    log::warn!("Payout {} attempt dropped: record gone", payout_id);
                }
                Outcome::Failed(reason) => {
                    log::error!("Payout {} attempt failed: {}", payout_id, reason);
                }
            }
            processed += 1;
        }
        processed
    }

    /// Re-enqueue non-terminal payouts that have gone quiet.
    ///
    /// This only produces another delivery; whether the payout is actually
    /// stuck is the processor's call. Returns the number enqueued.
    pub async fn scan_stale(&self) -> usize {
        let cutoff = chrono::Utc::now().timestamp_millis() - self.config.stale_after_ms;

        let stale = match self.store.find_stale(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                log::error!("Error scanning stale payouts: {}", e);
                return 0;
            }
        };

        if !stale.is_empty() {
            log::info!("Found {} stale payouts", stale.len());
        }

        let mut enqueued = 0;
        for record in stale {
            log::info!(
                "Re-enqueueing stale payout {} (status: {})",
                record.id,
                record.status.as_str()
            );
            if self.queue.enqueue(record.id) {
                enqueued += 1;
            } else {
                log::warn!("Queue full, stale payout {} deferred to next scan", record.id);
            }
        }
        enqueued
    }

    /// Run the worker loop
    pub async fn run(&self) {
        log::info!(
            "Payout worker started (scan_interval={}ms, stale_after={}ms)",
            self.config.scan_interval_ms,
            self.config.stale_after_ms
        );

        loop {
            self.drain().await;
            self.scan_stale().await;
            sleep(Duration::from_millis(self.config.scan_interval_ms)).await;
        }
    }

    /// Start the worker in a background task
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

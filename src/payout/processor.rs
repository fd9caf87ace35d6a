//! Payout processing orchestrator
//!
//! Consumes one delivered "process payout" message and drives the record
//! through the pipeline. Delivery is at-least-once, so every path here must
//! tolerate duplicate and concurrent invocations for the same payout id.
//!
//! Concurrency discipline: optimistic check then conditional write. No lock
//! is held across the rail stages; each status mutation is a single
//! compare-and-swap against the store, and a swap that is not applied means
//! another attempt (or a concurrent delete) got there first.

use std::sync::Arc;

use uuid::Uuid;

use crate::payout::progress::ProgressSink;
use crate::payout::rail::{PaymentRail, RailError, Stage};
use crate::payout::status::PayoutStatus;
use crate::payout::store::PayoutStore;
use crate::payout::types::{Outcome, Payout};

/// Processor tuning
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// How long a `processing` record may sit untouched before a new
    /// attempt treats the previous one as crashed (ms)
    pub stale_after_ms: i64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            stale_after_ms: 300_000, // 5 minutes
        }
    }
}

pub struct PayoutProcessor {
    store: Arc<dyn PayoutStore>,
    rail: Arc<dyn PaymentRail>,
    progress: Arc<dyn ProgressSink>,
    config: ProcessorConfig,
}

impl PayoutProcessor {
    pub fn new(
        store: Arc<dyn PayoutStore>,
        rail: Arc<dyn PaymentRail>,
        progress: Arc<dyn ProgressSink>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            rail,
            progress,
            config,
        }
    }

    /// Process one delivered job message for `payout_id`.
    ///
    /// Never panics and never raises for control flow; every attempt
    /// resolves to exactly one `Outcome`.
    pub async fn process(&self, payout_id: Uuid) -> Outcome {
        // 1. Load
        let payout = match self.store.get(payout_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                log::warn!("Payout {} not found, dropping attempt", payout_id);
                return Outcome::NotFound;
            }
            Err(e) => {
                log::error!("Failed to load payout {}: {}", payout_id, e);
                return Outcome::Failed(format!("store read failed: {}", e));
            }
        };

        // 2. Idempotency / liveness check
        match payout.status {
            PayoutStatus::Completed => {
                log::info!("Payout {} already completed", payout_id);
                return Outcome::AlreadyCompleted;
            }
            PayoutStatus::Failed | PayoutStatus::Cancelled => {
                // Terminal; nothing to advance and nothing to write
                return Outcome::Failed(format!(
                    "payout is in terminal status {}",
                    payout.status.as_str()
                ));
            }
            PayoutStatus::Processing => {
                let now = chrono::Utc::now().timestamp_millis();
                let age_ms = now - payout.updated_at;
                if age_ms < self.config.stale_after_ms {
                    log::info!(
                        "Payout {} already in processing (age {}ms), deferring",
                        payout_id,
                        age_ms
                    );
                    return Outcome::InProgress;
                }

                log::warn!(
                    "Payout {} stuck in processing for {}ms, resetting to pending",
                    payout_id,
                    age_ms
                );
                match self
                    .store
                    .update_status_if(payout_id, PayoutStatus::Processing, PayoutStatus::Pending)
                    .await
                {
                    Ok(true) => {} // reset applied, start fresh
                    Ok(false) => {
                        // Another attempt reset or advanced it first
                        return Outcome::InProgress;
                    }
                    Err(e) => {
                        return self.fail(payout_id, format!("stuck reset failed: {}", e)).await;
                    }
                }
            }
            PayoutStatus::Pending => {}
        }

        // 3. Mark in-flight. This compare-and-swap is the linearization
        // point concurrent duplicate deliveries key off of.
        match self
            .store
            .update_status_if(payout_id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await
        {
            Ok(true) => {}
            Ok(false) => return self.classify_lost_claim(payout_id).await,
            Err(e) => {
                return self.fail(payout_id, format!("claim write failed: {}", e)).await;
            }
        }
        log::info!("Payout {} moved to processing", payout_id);

        // 4. Execute stages in fixed order, reporting progress after each
        let total = Stage::ALL.len();
        for (i, stage) in Stage::ALL.iter().enumerate() {
            if let Err(e) = self.run_stage(&payout, *stage).await {
                let reason = format!("stage {} failed: {}", stage.name(), e);
                return self.fail(payout_id, reason).await;
            }
            self.progress.report(payout_id, stage.name(), i + 1, total);
        }

        // 5. Complete
        match self
            .store
            .update_status_if(payout_id, PayoutStatus::Processing, PayoutStatus::Completed)
            .await
        {
            Ok(true) => {
                log::info!("Payout {} completed", payout_id);
                Outcome::Completed
            }
            Ok(false) => self.classify_lost_completion(payout_id).await,
            Err(e) => {
                self.fail(payout_id, format!("completion write failed: {}", e))
                    .await
            }
        }
    }

    /// Route one named stage to its rail operation.
    async fn run_stage(&self, payout: &Payout, stage: Stage) -> Result<(), RailError> {
        match stage {
            Stage::DataCheck => self.rail.check_data(payout).await,
            Stage::BalanceVerification => self.rail.verify_balance(payout).await,
            Stage::FundsReservation => self.rail.reserve_funds(payout).await,
            Stage::TransactionPreparation => self.rail.prepare_transaction(payout).await,
            Stage::RailDispatch => self.rail.dispatch(payout).await,
        }
    }

    /// Record the failure, then surface it.
    async fn fail(&self, payout_id: Uuid, reason: String) -> Outcome {
        log::error!("Payout {} failed: {}", payout_id, reason);
        self.record_failure(payout_id, &reason).await;
        Outcome::Failed(reason)
    }

    /// Failure recorder: mark the payout `failed` and append the diagnostic
    /// to its description. Best-effort; a failure of this write is logged
    /// and swallowed so the original error stays the surfaced one.
    pub async fn record_failure(&self, payout_id: Uuid, error: &str) {
        match self.store.mark_failed(payout_id, error).await {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "Could not record failure for payout {}: record missing",
                    payout_id
                );
            }
            Err(e) => {
                log::error!("Failed to record failure for payout {}: {}", payout_id, e);
            }
        }
    }

    /// The `pending -> processing` swap was not applied: a concurrent
    /// attempt won the claim, or the record was deleted under us.
    async fn classify_lost_claim(&self, payout_id: Uuid) -> Outcome {
        match self.store.get(payout_id).await {
            Ok(None) => Outcome::NotFound,
            Ok(Some(p)) if p.status == PayoutStatus::Completed => Outcome::AlreadyCompleted,
            Ok(Some(_)) => {
                log::info!("Payout {} claimed by a concurrent attempt, deferring", payout_id);
                Outcome::InProgress
            }
            Err(e) => Outcome::Failed(format!("store read failed: {}", e)),
        }
    }

    /// The `processing -> completed` swap was not applied: the record was
    /// deleted mid-pipeline, or its status was edited out-of-band. A
    /// duplicate completion counts as success; an operator edit is not
    /// stomped with a failure write.
    async fn classify_lost_completion(&self, payout_id: Uuid) -> Outcome {
        match self.store.get(payout_id).await {
            Ok(None) => {
                log::warn!("Payout {} deleted during processing", payout_id);
                Outcome::NotFound
            }
            Ok(Some(p)) if p.status == PayoutStatus::Completed => Outcome::Completed,
            Ok(Some(p)) => Outcome::Failed(format!(
                "status changed to {} during processing",
                p.status.as_str()
            )),
            Err(e) => Outcome::Failed(format!("store read failed: {}", e)),
        }
    }
}

//! Payout lifecycle surface
//!
//! Thin field-mapping wrapper over the record store, plus the one rule with
//! teeth: creating a payout enqueues exactly one processing job, only after
//! the record is durably inserted, with a short artificial delivery delay.

use std::sync::Arc;

use uuid::Uuid;

use crate::payout::error::PayoutError;
use crate::payout::store::PayoutStore;
use crate::payout::types::{NewPayout, Payout, PayoutUpdate};
use crate::payout::validator::validate_new_payout;
use crate::payout::worker::PayoutQueue;

pub struct PayoutService {
    store: Arc<dyn PayoutStore>,
    queue: Arc<PayoutQueue>,
    /// Delivery delay for the processing job enqueued on create (ms)
    enqueue_delay_ms: i64,
}

impl PayoutService {
    pub fn new(
        store: Arc<dyn PayoutStore>,
        queue: Arc<PayoutQueue>,
        enqueue_delay_ms: i64,
    ) -> Self {
        Self {
            store,
            queue,
            enqueue_delay_ms,
        }
    }

    /// Create a payout in `pending` and schedule its processing job.
    pub async fn create(&self, req: NewPayout) -> Result<Payout, PayoutError> {
        validate_new_payout(&req)?;

        let payout = Payout::new(req);
        self.store.insert(&payout).await?;

        // Enqueue only after the insert succeeded; a record must exist
        // before any delivery can reference it.
        if !self.queue.enqueue_after(payout.id, self.enqueue_delay_ms) {
            log::warn!(
                "Work queue full, payout {} will be picked up by the stale scanner",
                payout.id
            );
        }

        log::info!(
            "Created payout {} ({} {})",
            payout.id,
            payout.amount,
            payout.currency
        );
        Ok(payout)
    }

    pub async fn get(&self, id: Uuid) -> Result<Payout, PayoutError> {
        self.store
            .get(id)
            .await?
            .ok_or(PayoutError::NotFound(id))
    }

    /// Direct status/description edit. This is the only path to `cancelled`.
    pub async fn update(&self, id: Uuid, update: PayoutUpdate) -> Result<Payout, PayoutError> {
        self.store
            .apply_update(id, update)
            .await?
            .ok_or(PayoutError::NotFound(id))
    }

    /// Unconditional delete, regardless of status. Not coordinated with an
    /// in-flight job; the processor treats the vanished record as NotFound.
    pub async fn delete(&self, id: Uuid) -> Result<(), PayoutError> {
        if self.store.delete(id).await? {
            log::info!("Deleted payout {}", id);
            Ok(())
        } else {
            Err(PayoutError::NotFound(id))
        }
    }
}

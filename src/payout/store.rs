//! Record store interface for payouts
//!
//! The store owns persistence; the processor only ever holds a transient
//! working copy and re-validates status at write time through the
//! conditional-update primitive.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::payout::status::PayoutStatus;
use crate::payout::types::{Payout, PayoutUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate payout id: {0}")]
    DuplicateId(Uuid),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent store for payout records.
///
/// All status mutations are single-record atomic read-modify-writes; the
/// conditional variants return `Ok(false)` (never an error) when the record
/// is missing or the expected prior status does not match, so a concurrent
/// delete degrades to a lost write rather than a raised failure.
#[async_trait]
pub trait PayoutStore: Send + Sync {
    /// Insert a freshly created record.
    async fn insert(&self, payout: &Payout) -> Result<(), StoreError>;

    /// Point-in-time read.
    async fn get(&self, id: Uuid) -> Result<Option<Payout>, StoreError>;

    /// Compare-and-swap on `status`, touching `updated_at` on success.
    /// Returns whether the write was applied.
    async fn update_status_if(
        &self,
        id: Uuid,
        expected: PayoutStatus,
        new_status: PayoutStatus,
    ) -> Result<bool, StoreError>;

    /// Failure write: set `status = failed` and append
    /// `"\nError: <note>"` to a non-empty description (else set
    /// `"Error: <note>"`), touching `updated_at`. Returns whether the
    /// record existed.
    async fn mark_failed(&self, id: Uuid, note: &str) -> Result<bool, StoreError>;

    /// Direct field edit used by the CRUD update path. Returns the updated
    /// record, or `None` when it is missing.
    async fn apply_update(
        &self,
        id: Uuid,
        update: PayoutUpdate,
    ) -> Result<Option<Payout>, StoreError>;

    /// Unconditional delete. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Non-terminal records not touched since `cutoff_ms`, for the
    /// safety-net scanner.
    async fn find_stale(&self, cutoff_ms: i64) -> Result<Vec<Payout>, StoreError>;
}

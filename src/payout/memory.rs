//! In-memory payout store
//!
//! Backs tests and the demo worker binary. A real deployment implements
//! `PayoutStore` over its database; the conditional-update semantics here
//! match what a LWT / `UPDATE ... IF` gives you there.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::payout::status::PayoutStatus;
use crate::payout::store::{PayoutStore, StoreError};
use crate::payout::types::{Payout, PayoutUpdate};

pub struct MemoryStore {
    payouts: RwLock<HashMap<Uuid, Payout>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            payouts: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.payouts.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.read().unwrap().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayoutStore for MemoryStore {
    async fn insert(&self, payout: &Payout) -> Result<(), StoreError> {
        let mut map = self.payouts.write().unwrap();
        if map.contains_key(&payout.id) {
            return Err(StoreError::DuplicateId(payout.id));
        }
        map.insert(payout.id, payout.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payout>, StoreError> {
        Ok(self.payouts.read().unwrap().get(&id).cloned())
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: PayoutStatus,
        new_status: PayoutStatus,
    ) -> Result<bool, StoreError> {
        let mut map = self.payouts.write().unwrap();
        match map.get_mut(&id) {
            Some(payout) if payout.status == expected => {
                payout.status = new_status;
                payout.updated_at = chrono::Utc::now().timestamp_millis();
                Ok(true)
            }
            // Missing record and status mismatch are both "not applied"
            _ => Ok(false),
        }
    }

    async fn mark_failed(&self, id: Uuid, note: &str) -> Result<bool, StoreError> {
        let mut map = self.payouts.write().unwrap();
        match map.get_mut(&id) {
            Some(payout) => {
                payout.status = PayoutStatus::Failed;
                payout.description = Some(match payout.description.take() {
                    Some(existing) if !existing.is_empty() => {
                        format!("{}\nError: {}", existing, note)
                    }
                    _ => format!("Error: {}", note),
                });
                payout.updated_at = chrono::Utc::now().timestamp_millis();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_update(
        &self,
        id: Uuid,
        update: PayoutUpdate,
    ) -> Result<Option<Payout>, StoreError> {
        let mut map = self.payouts.write().unwrap();
        match map.get_mut(&id) {
            Some(payout) => {
                if let Some(status) = update.status {
                    payout.status = status;
                }
                if let Some(description) = update.description {
                    payout.description = Some(description);
                }
                payout.updated_at = chrono::Utc::now().timestamp_millis();
                Ok(Some(payout.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.payouts.write().unwrap().remove(&id).is_some())
    }

    async fn find_stale(&self, cutoff_ms: i64) -> Result<Vec<Payout>, StoreError> {
        let map = self.payouts.read().unwrap();
        Ok(map
            .values()
            .filter(|p| p.status.needs_processing() && p.updated_at < cutoff_ms)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::types::{Currency, NewPayout};
    use rust_decimal_macros::dec;

    fn sample_payout() -> Payout {
        Payout::new(NewPayout {
            amount: dec!(100.00),
            currency: Currency::Usd,
            recipient_details: serde_json::json!({"type": "card"}),
            description: None,
        })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let payout = sample_payout();

        store.insert(&payout).await.unwrap();

        let stored = store.get(payout.id).await.unwrap().unwrap();
        assert_eq!(stored.id, payout.id);
        assert_eq!(stored.status, PayoutStatus::Pending);

        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let payout = sample_payout();

        store.insert(&payout).await.unwrap();
        assert!(matches!(
            store.insert(&payout).await,
            Err(StoreError::DuplicateId(_))
        ));
    }

    #[tokio::test]
    async fn test_conditional_update_applies_on_match() {
        let store = MemoryStore::new();
        let payout = sample_payout();
        store.insert(&payout).await.unwrap();

        let applied = store
            .update_status_if(payout.id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await
            .unwrap();
        assert!(applied);

        let stored = store.get(payout.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayoutStatus::Processing);
        assert!(stored.updated_at >= payout.updated_at);
    }

    #[tokio::test]
    async fn test_conditional_update_rejects_on_mismatch() {
        let store = MemoryStore::new();
        let payout = sample_payout();
        store.insert(&payout).await.unwrap();

        let applied = store
            .update_status_if(payout.id, PayoutStatus::Processing, PayoutStatus::Completed)
            .await
            .unwrap();
        assert!(!applied);

        let stored = store.get(payout.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayoutStatus::Pending);
    }

    #[tokio::test]
    async fn test_conditional_update_on_missing_record_not_applied() {
        let store = MemoryStore::new();
        let applied = store
            .update_status_if(Uuid::new_v4(), PayoutStatus::Pending, PayoutStatus::Processing)
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_mark_failed_appends_description() {
        let store = MemoryStore::new();
        let mut payout = sample_payout();
        payout.description = Some("note".to_string());
        store.insert(&payout).await.unwrap();

        assert!(store.mark_failed(payout.id, "rail timeout").await.unwrap());

        let stored = store.get(payout.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayoutStatus::Failed);
        assert_eq!(stored.description.unwrap(), "note\nError: rail timeout");
    }

    #[tokio::test]
    async fn test_mark_failed_sets_description_when_empty() {
        let store = MemoryStore::new();
        let payout = sample_payout();
        store.insert(&payout).await.unwrap();

        store.mark_failed(payout.id, "rail timeout").await.unwrap();

        let stored = store.get(payout.id).await.unwrap().unwrap();
        assert_eq!(stored.description.unwrap(), "Error: rail timeout");

        assert!(!store.mark_failed(Uuid::new_v4(), "gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_stale_filters_by_status_and_age() {
        let store = MemoryStore::new();
        let now = chrono::Utc::now().timestamp_millis();

        let mut stale = sample_payout();
        stale.status = PayoutStatus::Processing;
        stale.updated_at = now - 600_000;
        store.insert(&stale).await.unwrap();

        let mut fresh = sample_payout();
        fresh.status = PayoutStatus::Processing;
        store.insert(&fresh).await.unwrap();

        let mut done = sample_payout();
        done.status = PayoutStatus::Completed;
        done.updated_at = now - 600_000;
        store.insert(&done).await.unwrap();

        let found = store.find_stale(now - 300_000).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, stale.id);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let payout = sample_payout();
        store.insert(&payout).await.unwrap();

        assert!(store.delete(payout.id).await.unwrap());
        assert!(!store.delete(payout.id).await.unwrap());
        assert!(store.get(payout.id).await.unwrap().is_none());
    }
}

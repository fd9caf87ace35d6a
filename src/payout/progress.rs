//! Progress reporting for in-flight processing attempts
//!
//! Fire-and-forget: the processor never reads progress back, and a sink
//! failure must never fail the pipeline, so the trait is infallible and
//! implementations swallow their own errors.

use std::sync::Mutex;
use uuid::Uuid;

pub trait ProgressSink: Send + Sync {
    fn report(&self, payout_id: Uuid, stage: &str, ordinal: usize, total: usize);
}

/// Logs progress through the standard logger
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, payout_id: Uuid, stage: &str, ordinal: usize, total: usize) {
        log::info!("Payout {}: stage {}/{} '{}'", payout_id, ordinal, total, stage);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub payout_id: Uuid,
    pub stage: String,
    pub ordinal: usize,
    pub total: usize,
}

/// Captures reports for assertions in tests
pub struct RecordingProgress {
    reports: Mutex<Vec<ProgressReport>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn reports(&self) -> Vec<ProgressReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl Default for RecordingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, payout_id: Uuid, stage: &str, ordinal: usize, total: usize) {
        self.reports.lock().unwrap().push(ProgressReport {
            payout_id,
            stage: stage.to_string(),
            ordinal,
            total,
        });
    }
}

//! Payout State Machine
//!
//! Defines the payout lifecycle states and the transition table that the
//! processor and the CRUD surface are both held to.

use serde::{Deserialize, Serialize};

/// Payout lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Created, waiting to be picked up by a worker
    Pending,
    /// A worker claimed the payout and is driving it through the rail stages
    Processing,
    /// All stages finished, funds dispatched
    Completed,
    /// Pipeline failed, diagnostics appended to the description
    Failed,
    /// Cancelled by an operator; never set by the worker
    Cancelled,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Failed => "failed",
            PayoutStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PayoutStatus::Pending),
            "processing" => Some(PayoutStatus::Processing),
            "completed" => Some(PayoutStatus::Completed),
            "failed" => Some(PayoutStatus::Failed),
            "cancelled" => Some(PayoutStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PayoutStatus::Completed | PayoutStatus::Failed | PayoutStatus::Cancelled
        )
    }

    /// Check if this state is eligible for pickup by the stale scanner
    pub fn needs_processing(&self) -> bool {
        !self.is_terminal()
    }
}

/// Structural transition legality.
///
/// The table covers both writers of `status`:
/// - the processor: `pending -> processing -> completed`, any non-terminal
///   state `-> failed`, and the single permitted regression
///   `processing -> pending` (stuck-job reset; whether the staleness window
///   has elapsed is the processor's guard, not encoded here)
/// - the CRUD update path: `-> cancelled` from any non-terminal state
///
/// Terminal states accept no transitions.
pub fn can_transition(from: PayoutStatus, to: PayoutStatus) -> bool {
    use PayoutStatus::*;

    match (from, to) {
        (Pending, Processing) => true,
        (Processing, Pending) => true,
        (Processing, Completed) => true,
        (Pending, Failed) | (Processing, Failed) => true,
        (Pending, Cancelled) | (Processing, Cancelled) => true,
        _ => false,
    }
}

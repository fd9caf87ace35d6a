//! Core types for the payout engine
//!
//! The payout record, its request/update companions, and the processing
//! outcome returned to the work-queue framework.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payout::status::PayoutStatus;

/// Supported payout currencies
///
/// Uses strum for String conversion:
/// - `currency.as_ref()` -> &str "USD" (zero-alloc)
/// - `Currency::from_str("USD")` -> Result<Currency>
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    Kzt,
}

/// Payout record stored in the record store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    /// Unique identifier, generated at creation
    pub id: Uuid,
    /// Amount to disburse, positive, max 2 decimal places
    pub amount: Decimal,
    /// Currency of the amount
    pub currency: Currency,
    /// Opaque recipient payload (card / bank account / crypto wallet).
    /// Shape validation happens upstream, before a record is created.
    pub recipient_details: serde_json::Value,
    /// Current lifecycle state
    pub status: PayoutStatus,
    /// Free-text comment; failure diagnostics are appended here
    pub description: Option<String>,
    /// Creation timestamp (ms), immutable
    pub created_at: i64,
    /// Last mutation timestamp (ms); the only worker-liveness signal
    pub updated_at: i64,
}

impl Payout {
    /// Build a fresh `pending` record from a creation request.
    pub fn new(req: NewPayout) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Payout {
            id: Uuid::new_v4(),
            amount: req.amount,
            currency: req.currency,
            recipient_details: req.recipient_details,
            status: PayoutStatus::Pending,
            description: req.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create a payout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayout {
    pub amount: Decimal,
    pub currency: Currency,
    pub recipient_details: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update applied through the CRUD surface.
///
/// This is the only path to `cancelled`; the worker never sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutUpdate {
    #[serde(default)]
    pub status: Option<PayoutStatus>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of one processing attempt, returned to the queue framework.
///
/// Every attempt resolves to exactly one of these; the processor never
/// signals control flow through errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Pipeline ran to the end, payout is now `completed`
    Completed,
    /// Payout was already `completed`; idempotent no-op success
    AlreadyCompleted,
    /// Another live attempt is presumed in flight; this attempt dropped
    InProgress,
    /// Record vanished between enqueue and processing
    NotFound,
    /// Pipeline failed; payout marked `failed` with diagnostics appended
    Failed(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::AlreadyCompleted => "already_completed",
            Outcome::InProgress => "in_progress",
            Outcome::NotFound => "not_found",
            Outcome::Failed(_) => "failed",
        }
    }
}

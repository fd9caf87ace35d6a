//! Payment rail adapter
//!
//! The processor only orchestrates; the actual effect of every stage is
//! delegated to a rail client behind this trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::payout::types::Payout;

/// Ordered pipeline stages, executed exactly in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    DataCheck,
    BalanceVerification,
    FundsReservation,
    TransactionPreparation,
    RailDispatch,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::DataCheck,
        Stage::BalanceVerification,
        Stage::FundsReservation,
        Stage::TransactionPreparation,
        Stage::RailDispatch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::DataCheck => "data check",
            Stage::BalanceVerification => "balance verification",
            Stage::FundsReservation => "funds reservation",
            Stage::TransactionPreparation => "transaction preparation",
            Stage::RailDispatch => "payment rail dispatch",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RailError {
    /// Business rejection (insufficient balance, blocked recipient)
    #[error("rejected: {0}")]
    Rejected(String),

    /// Technical fault (timeout, connection refused)
    #[error("rail unavailable: {0}")]
    Unavailable(String),
}

/// Payment rail client - implemented per settlement network
///
/// All operations MUST be idempotent per payout id: re-running a stage for
/// the same payout after a crash or a duplicate delivery must not double
/// any effect on the rail side.
#[async_trait]
pub trait PaymentRail: Send + Sync {
    /// Verify the payout data is acceptable to the rail
    async fn check_data(&self, payout: &Payout) -> Result<(), RailError>;

    /// Confirm the disbursement account covers the amount
    async fn verify_balance(&self, payout: &Payout) -> Result<(), RailError>;

    /// Earmark funds for this payout
    async fn reserve_funds(&self, payout: &Payout) -> Result<(), RailError>;

    /// Build the rail-side transaction from the reserved funds
    async fn prepare_transaction(&self, payout: &Payout) -> Result<(), RailError>;

    /// Hand the prepared transaction to the payment network
    async fn dispatch(&self, payout: &Payout) -> Result<(), RailError>;

    /// Rail name for logging
    fn name(&self) -> &str;
}

/// Stand-in rail used by the worker binary.
///
/// Logs each stage and always succeeds; real settlement lives behind a
/// different implementation of the trait.
pub struct SimulatedRail;

impl SimulatedRail {
    pub fn new() -> Self {
        Self
    }

    fn log_stage(&self, payout: &Payout, stage: Stage) {
        log::info!(
            "[{}] stage '{}' for payout {} ({} {})",
            self.name(),
            stage.name(),
            payout.id,
            payout.amount,
            payout.currency
        );
    }
}

impl Default for SimulatedRail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRail for SimulatedRail {
    async fn check_data(&self, payout: &Payout) -> Result<(), RailError> {
        self.log_stage(payout, Stage::DataCheck);
        Ok(())
    }

    async fn verify_balance(&self, payout: &Payout) -> Result<(), RailError> {
        self.log_stage(payout, Stage::BalanceVerification);
        Ok(())
    }

    async fn reserve_funds(&self, payout: &Payout) -> Result<(), RailError> {
        self.log_stage(payout, Stage::FundsReservation);
        Ok(())
    }

    async fn prepare_transaction(&self, payout: &Payout) -> Result<(), RailError> {
        self.log_stage(payout, Stage::TransactionPreparation);
        Ok(())
    }

    async fn dispatch(&self, payout: &Payout) -> Result<(), RailError> {
        self.log_stage(payout, Stage::RailDispatch);
        Ok(())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Mock rail for testing
///
/// Allows scripting a failure at a chosen stage for a specific payout.
pub struct MockRail {
    /// Map of payout id -> (stage to fail at, error to return)
    failures: Mutex<HashMap<Uuid, (Stage, RailError)>>,
    /// Stages executed, in call order
    calls: Mutex<Vec<(Uuid, Stage)>>,
}

impl MockRail {
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the given stage for the given payout; all other calls succeed.
    pub fn fail_at(&self, payout_id: Uuid, stage: Stage, error: RailError) {
        self.failures.lock().unwrap().insert(payout_id, (stage, error));
    }

    pub fn clear(&self) {
        self.failures.lock().unwrap().clear();
        self.calls.lock().unwrap().clear();
    }

    /// Stages executed so far, in call order.
    pub fn calls(&self) -> Vec<(Uuid, Stage)> {
        self.calls.lock().unwrap().clone()
    }

    fn run(&self, payout: &Payout, stage: Stage) -> Result<(), RailError> {
        log::debug!("[{}] {}({})", self.name(), stage.name(), payout.id);
        self.calls.lock().unwrap().push((payout.id, stage));

        if let Some((fail_stage, error)) = self.failures.lock().unwrap().get(&payout.id) {
            if *fail_stage == stage {
                return Err(error.clone());
            }
        }
        Ok(())
    }
}

impl Default for MockRail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRail for MockRail {
    async fn check_data(&self, payout: &Payout) -> Result<(), RailError> {
        self.run(payout, Stage::DataCheck)
    }

    async fn verify_balance(&self, payout: &Payout) -> Result<(), RailError> {
        self.run(payout, Stage::BalanceVerification)
    }

    async fn reserve_funds(&self, payout: &Payout) -> Result<(), RailError> {
        self.run(payout, Stage::FundsReservation)
    }

    async fn prepare_transaction(&self, payout: &Payout) -> Result<(), RailError> {
        self.run(payout, Stage::TransactionPreparation)
    }

    async fn dispatch(&self, payout: &Payout) -> Result<(), RailError> {
        self.run(payout, Stage::RailDispatch)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

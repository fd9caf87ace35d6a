//! Payout module - main module file
//!
//! Payout processing with an explicit state machine, a conditional-update
//! record store, pluggable rail/progress collaborators, and a background
//! worker consuming at-least-once deliveries.

pub mod error;
pub mod memory;
pub mod processor;
pub mod progress;
pub mod rail;
pub mod service;
pub mod status;
pub mod store;
pub mod types;
pub mod validator;
pub mod worker;

// Re-export commonly used types
pub use error::PayoutError;
pub use memory::MemoryStore;
pub use processor::{PayoutProcessor, ProcessorConfig};
pub use progress::{LogProgress, ProgressReport, ProgressSink, RecordingProgress};
pub use rail::{MockRail, PaymentRail, RailError, SimulatedRail, Stage};
pub use service::PayoutService;
pub use status::{can_transition, PayoutStatus};
pub use store::{PayoutStore, StoreError};
pub use types::{Currency, NewPayout, Outcome, Payout, PayoutUpdate};
pub use worker::{PayoutQueue, PayoutWorker, WorkerConfig};

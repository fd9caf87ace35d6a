//! Error types for the payout lifecycle surface

use thiserror::Error;
use uuid::Uuid;

use crate::payout::store::StoreError;

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {amount} below minimum {minimum} for {currency}")]
    AmountTooSmall {
        amount: String,
        minimum: String,
        currency: String,
    },

    #[error("Amount {amount} above maximum {maximum} for {currency}")]
    AmountTooLarge {
        amount: String,
        maximum: String,
        currency: String,
    },

    #[error("Payout {0} not found")]
    NotFound(Uuid),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

// Error code mapping for API responses
impl PayoutError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::AmountTooSmall { .. } => "AMOUNT_TOO_SMALL",
            Self::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            Self::NotFound(_) => "PAYOUT_NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::AmountTooSmall { .. } | Self::AmountTooLarge { .. }
        )
    }
}

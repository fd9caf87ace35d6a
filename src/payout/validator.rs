//! Creation-time validation for payout requests
//!
//! Amount sanity and per-currency bounds. Recipient-details shape validation
//! is handled upstream and is deliberately absent here.

use rust_decimal::Decimal;

use crate::payout::error::PayoutError;
use crate::payout::types::{Currency, NewPayout};

/// Per-currency amount bounds (inclusive)
fn currency_limits(currency: Currency) -> (Decimal, Decimal) {
    match currency {
        Currency::Rub => (Decimal::new(10, 0), Decimal::new(1_000_000, 0)),
        Currency::Usd => (Decimal::new(1, 0), Decimal::new(10_000, 0)),
        Currency::Eur => (Decimal::new(1, 0), Decimal::new(10_000, 0)),
        Currency::Kzt => (Decimal::new(100, 0), Decimal::new(5_000_000, 0)),
    }
}

/// Validate a payout creation request
pub fn validate_new_payout(req: &NewPayout) -> Result<(), PayoutError> {
    // 1. Amount must be positive
    if req.amount <= Decimal::ZERO {
        return Err(PayoutError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }

    // 2. Validate precision (money is quoted to 2 decimal places)
    if req.amount.normalize().scale() > 2 {
        return Err(PayoutError::InvalidAmount(format!(
            "amount precision {} exceeds 2 decimal places",
            req.amount.scale()
        )));
    }

    // 3. Currency-scoped bounds
    let (min, max) = currency_limits(req.currency);
    if req.amount < min {
        return Err(PayoutError::AmountTooSmall {
            amount: req.amount.to_string(),
            minimum: min.to_string(),
            currency: req.currency.as_ref().to_string(),
        });
    }
    if req.amount > max {
        return Err(PayoutError::AmountTooLarge {
            amount: req.amount.to_string(),
            maximum: max.to_string(),
            currency: req.currency.as_ref().to_string(),
        });
    }

    Ok(())
}

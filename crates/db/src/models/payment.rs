//! Payment ledger models and DTOs.
//!
//! Payments are append-only; they record a subject buying their way out
//! and feed the totals and leaderboard endpoints.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use watchgate_core::error::CoreError;
use watchgate_core::ransom::validate_required;
use watchgate_core::types::{DbId, Timestamp};

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub subject: String,
    pub amount: f64,
    pub paid_at: Timestamp,
}

/// Total paid per subject.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub subject: String,
    pub total_paid: f64,
}

/// DTO for recording a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub subject: String,
    pub amount: f64,
}

impl CreatePayment {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required(&self.subject, "subject")?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

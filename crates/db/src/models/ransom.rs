//! Ransom models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use watchgate_core::error::CoreError;
use watchgate_core::ransom::{validate_required, validate_threshold, Gate, RansomState, DEFAULT_THRESHOLD};
use watchgate_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `ransoms` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Ransom {
    pub id: DbId,
    pub subject: String,
    pub prerequisite: String,
    pub locked_collection: String,
    pub progress: f64,
    pub threshold: f64,
    #[sqlx(try_from = "String")]
    pub state: RansomState,
    pub issued_by: Option<String>,
    pub lock_message: Option<String>,
    pub unlock_message: Option<String>,
    pub created_at: Timestamp,
    pub unlocked_at: Option<Timestamp>,
}

impl Ransom {
    /// The terms the decision logic evaluates events against.
    pub fn gate(&self) -> Gate<'_> {
        Gate {
            prerequisite: &self.prerequisite,
            locked_collection: &self.locked_collection,
            threshold: self.threshold,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == RansomState::Active
    }
}

/// Prerequisite popularity, for the "most used" listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrerequisiteUsage {
    pub prerequisite: String,
    pub times_used: i64,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a ransom.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRansom {
    pub subject: String,
    pub prerequisite: String,
    pub locked_collection: String,
    pub threshold: Option<f64>,
    pub issued_by: Option<String>,
    pub lock_message: Option<String>,
    pub unlock_message: Option<String>,
}

impl CreateRansom {
    /// Threshold to persist, falling back to the default.
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    /// Check required fields and the threshold range.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required(&self.subject, "subject")?;
        validate_required(&self.prerequisite, "prerequisite")?;
        validate_required(&self.locked_collection, "locked_collection")?;
        validate_threshold(self.effective_threshold())
    }

    /// Trim text fields and drop blank optional ones.
    pub fn normalized(self) -> Self {
        Self {
            subject: self.subject.trim().to_string(),
            prerequisite: self.prerequisite.trim().to_string(),
            locked_collection: self.locked_collection.trim().to_string(),
            threshold: self.threshold,
            issued_by: non_blank(self.issued_by),
            lock_message: non_blank(self.lock_message),
            unlock_message: non_blank(self.unlock_message),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

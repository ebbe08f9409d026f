//! Ransom lifecycle state and threshold rules.
//!
//! A ransom is created `Active` with zero progress and moves to `Unlocked`
//! exactly once, when a progress checkpoint on the prerequisite reaches the
//! threshold. `Unlocked` is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Threshold applied when the creator does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Upper bound for both progress and threshold percentages.
pub const MAX_PERCENT: f64 = 100.0;

/// Lifecycle state of a ransom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RansomState {
    Active,
    Unlocked,
}

impl RansomState {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            RansomState::Active => "active",
            RansomState::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for RansomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RansomState {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(RansomState::Active),
            "unlocked" => Ok(RansomState::Unlocked),
            other => Err(CoreError::Validation(format!(
                "unknown ransom state '{other}'"
            ))),
        }
    }
}

/// The terms of a ransom that the decision logic needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate<'a> {
    /// Title that must be watched.
    pub prerequisite: &'a str,
    /// Collection withheld until the threshold is reached.
    pub locked_collection: &'a str,
    /// Percentage of the prerequisite required to unlock.
    pub threshold: f64,
}

impl Gate<'_> {
    /// Whether `progress` satisfies this gate.
    pub fn is_satisfied_by(&self, progress: f64) -> bool {
        progress >= self.threshold
    }
}

/// Validate that a threshold lies in `(0, 100]`.
pub fn validate_threshold(threshold: f64) -> Result<(), CoreError> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold > MAX_PERCENT {
        return Err(CoreError::Validation(format!(
            "threshold must be greater than 0 and at most 100, got {threshold}"
        )));
    }
    Ok(())
}

/// Validate that a required text field is present.
pub fn validate_required(value: &str, name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_text() {
        for state in [RansomState::Active, RansomState::Unlocked] {
            let parsed = RansomState::try_from(state.as_str().to_string()).unwrap();
            assert_eq!(parsed, state);
        }
        assert!(RansomState::try_from("paused".to_string()).is_err());
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(0.1).is_ok());
        assert!(validate_threshold(DEFAULT_THRESHOLD).is_ok());
        assert!(validate_threshold(100.0).is_ok());
        assert!(validate_threshold(0.0).is_err());
        assert!(validate_threshold(-5.0).is_err());
        assert!(validate_threshold(100.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn gate_satisfied_at_threshold() {
        let gate = Gate {
            prerequisite: "Inception",
            locked_collection: "Horror",
            threshold: 20.0,
        };
        assert!(!gate.is_satisfied_by(19.9));
        assert!(gate.is_satisfied_by(20.0));
        assert!(gate.is_satisfied_by(30.0));
    }

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("bob", "subject").is_ok());
        assert!(validate_required("   ", "subject").is_err());
    }
}

//! Interpreting dice rolls as success or failure.
//!
//! The game uses a single resolution mechanic: roll a d20 at or under a
//! target derived from an attribute. See [`roll_under`].

pub mod roll_under;

pub use roll_under::{AttributeTest, AttributeTestResult, roll_attribute_test};

use serde::{Deserialize, Serialize};

/// The outcome of a roll-under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A natural 1: succeeds regardless of the target.
    CriticalSuccess,
    /// The adjusted roll was at or under the target.
    Success,
    /// The adjusted roll was over the target.
    Failure,
    /// A natural 20: fails regardless of the target.
    CriticalFailure,
}

impl Outcome {
    /// Returns true for either kind of success.
    pub fn is_success(self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalSuccess => write!(f, "Critical Success"),
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::CriticalFailure => write!(f, "Fumble"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::CriticalSuccess.to_string(), "Critical Success");
        assert_eq!(Outcome::Success.to_string(), "Success");
        assert_eq!(Outcome::Failure.to_string(), "Failure");
        assert_eq!(Outcome::CriticalFailure.to_string(), "Fumble");
    }

    #[test]
    fn outcome_success() {
        assert!(Outcome::CriticalSuccess.is_success());
        assert!(Outcome::Success.is_success());
        assert!(!Outcome::Failure.is_success());
        assert!(!Outcome::CriticalFailure.is_success());
    }
}

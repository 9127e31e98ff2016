use serde::{Deserialize, Serialize};
use std::fmt;

/// Dislike stored for solutions that have no valid score: either not yet
/// evaluated or rejected. The reject reason tells the two apart.
pub const DISLIKE_SENTINEL: i64 = 999_999_999;

/// A bonus a solution earned on another problem, as reported by the scorer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredBonus {
    pub bonus: String,
    pub problem: i64,
}

/// Lifecycle of a solution's score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ScoreState {
    /// Waiting for the re-score loop.
    Unscored,
    /// Evaluated with a finite dislike.
    Scored,
    /// Evaluated and refused; see the reject reason.
    Rejected,
}

impl ScoreState {
    pub fn of(dislike: i64, reject_reason: &str) -> Self {
        if !reject_reason.is_empty() {
            Self::Rejected
        } else if dislike == DISLIKE_SENTINEL {
            Self::Unscored
        } else {
            Self::Scored
        }
    }

    /// Returns true once an evaluation has produced a verdict.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unscored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unscored => "Unscored",
            Self::Scored => "Scored",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ScoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one evaluation attempt. Always storable: evaluator failures
/// are represented as a rejection, never as an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub dislike: i64,
    #[serde(default)]
    pub acquired_bonuses: Vec<AcquiredBonus>,
    #[serde(default)]
    pub reject_reason: String,
}

impl Evaluation {
    /// A valid score. Dislikes outside `0..DISLIKE_SENTINEL` cannot be told
    /// apart from "not evaluated yet", so they are stored as a rejection.
    pub fn scored(dislike: i64, acquired_bonuses: Vec<AcquiredBonus>) -> Self {
        if !(0..DISLIKE_SENTINEL).contains(&dislike) {
            return Self::rejected(format!("scorer reported out-of-range dislike {dislike}"));
        }
        Self {
            dislike,
            acquired_bonuses,
            reject_reason: String::new(),
        }
    }

    /// An empty reason would read back as Unscored, so one is always filled in.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        if reason.trim().is_empty() {
            reason = "rejected without reason".into();
        }
        Self {
            dislike: DISLIKE_SENTINEL,
            acquired_bonuses: Vec::new(),
            reject_reason: reason,
        }
    }

    pub fn unscored() -> Self {
        Self {
            dislike: DISLIKE_SENTINEL,
            acquired_bonuses: Vec::new(),
            reject_reason: String::new(),
        }
    }

    pub fn state(&self) -> ScoreState {
        ScoreState::of(self.dislike, &self.reject_reason)
    }
}

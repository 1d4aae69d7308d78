//! Navigation outcomes, sidebar statuses, and change notifications.
//!
//! These types are shared between the navigator (which produces them) and any
//! presentation layer (which renders them). They carry no behaviour of their
//! own so hosts can serialize them across whatever boundary they use.

use serde::{Deserialize, Serialize};

/// Result of asking the navigator to move forward one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    /// The next step was unlocked and is now current.
    Advanced,
    /// The current step's validator rejected the record.
    ValidationFailed(String),
    /// The last step passed validation; the index did not move.
    Completed,
}

/// Result of asking the navigator to jump to an arbitrary step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum JumpOutcome {
    /// The target is now current.
    Jumped,
    /// A step between the current index and the target failed validation.
    ValidationFailed(String),
    /// The target is neither visited nor the frontier step.
    Rejected,
}

impl AdvanceOutcome {
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }
}

impl JumpOutcome {
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }
}

/// Display status of a step in the progress sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step currently shown.
    Active,
    /// Visited and positioned before the current step.
    Completed,
    /// Reachable but not behind the current step (visited ahead, or the frontier).
    Available,
    /// Not reachable yet.
    Locked,
}

impl StepStatus {
    pub fn is_clickable(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// Change notification emitted after every state-changing navigator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigatorEvent {
    /// The record was merged with a patch touching `keys`.
    RecordUpdated { keys: Vec<String> },
    /// Forward move from `from` to `to` after a successful validation.
    Advanced { from: usize, to: usize },
    /// Backward move by one step.
    Retreated { from: usize, to: usize },
    /// Direct move to a reachable step.
    Jumped { from: usize, to: usize },
    /// A validator rejected the record; the message is stored under `step_id`.
    ValidationFailed { index: usize, step_id: String, message: String },
    /// A jump to an unreachable step was refused.
    Rejected { target: usize },
    /// The terminal step passed validation.
    Completed { index: usize },
    /// The session was restored to its seed state.
    Reset,
}

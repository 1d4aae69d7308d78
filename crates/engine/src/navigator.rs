//! The step navigation state machine.
//!
//! A [`StepNavigator`] owns the aggregate record for one wizard session along
//! with the current step index, the set of unlocked (visited) steps and the
//! per-step error map. Every transition is synchronous and funnels through a
//! small set of `apply_*` helpers that take already-computed validation
//! verdicts. The async [`WizardSession`](crate::WizardSession) reuses those
//! helpers so validation can suspend without ever leaving the navigator
//! half-updated.
//!
//! Unlock policy: index 0 is always visited; a successful `advance` unlocks the
//! next index; `go_to` may target any visited index or the frontier
//! `min(visited) + 1`. Nothing is ever locked again until [`reset`].
//!
//! [`reset`]: StepNavigator::reset

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use indexmap::IndexMap;
use stepwise_types::{AdvanceOutcome, AggregateRecord, JumpOutcome, NavigatorEvent, StepStatus};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::{events::EventHub, step::StepDefinition};

/// Construction failures for a navigator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigatorError {
    #[error("a wizard needs at least one step")]
    NoSteps,
    #[error("step {index} has an empty id")]
    EmptyStepId { index: usize },
    #[error("step id '{0}' is used more than once")]
    DuplicateStepId(String),
}

/// How a `go_to` request will be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JumpPlan {
    /// Target is out of range or not reachable.
    Rejected,
    /// Target is at or behind the current step; no validation needed.
    Direct,
    /// Target is ahead; these step indices must pass validation in order.
    Validate(Vec<usize>),
}

pub struct StepNavigator<R: AggregateRecord> {
    steps: Vec<StepDefinition<R>>,
    seed: R,
    record: R,
    current_index: usize,
    visited: BTreeSet<usize>,
    errors: IndexMap<String, String>,
    events: EventHub,
}

impl<R: AggregateRecord> StepNavigator<R> {
    /// Builds a navigator positioned on the first step, seeded with `seed`.
    pub fn new(steps: Vec<StepDefinition<R>>, seed: R) -> Result<Self, NavigatorError> {
        if steps.is_empty() {
            return Err(NavigatorError::NoSteps);
        }
        let mut seen = HashSet::new();
        for (index, step) in steps.iter().enumerate() {
            if step.id().trim().is_empty() {
                return Err(NavigatorError::EmptyStepId { index });
            }
            if !seen.insert(step.id()) {
                return Err(NavigatorError::DuplicateStepId(step.id().to_string()));
            }
        }

        Ok(Self {
            steps,
            record: seed.clone(),
            seed,
            current_index: 0,
            visited: BTreeSet::from([0]),
            errors: IndexMap::new(),
            events: EventHub::default(),
        })
    }

    /// Registers an observer that receives a [`NavigatorEvent`] after every state change.
    pub fn subscribe(&mut self) -> UnboundedReceiver<NavigatorEvent> {
        self.events.subscribe()
    }

    /// Shallow-merges `patch` into the record. Never validates, never fails.
    pub fn update_record(&mut self, patch: impl Into<R::Patch>) {
        let patch = patch.into();
        let keys = R::patch_keys(&patch);
        self.record.merge(patch);
        debug!(?keys, "record updated");
        self.events.emit(NavigatorEvent::RecordUpdated { keys });
    }

    /// Validates the current step and, if it passes, moves to the next one.
    ///
    /// On the last step a pass yields [`AdvanceOutcome::Completed`] and the
    /// index stays put.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let verdict = self.validate_step(self.current_index);
        self.apply_advance(verdict)
    }

    /// Moves back one step without validating. No-op on the first step.
    pub fn retreat(&mut self) {
        if self.current_index == 0 {
            return;
        }
        let from = self.current_index;
        self.current_index -= 1;
        debug!(from, to = self.current_index, "retreated");
        self.events.emit(NavigatorEvent::Retreated {
            from,
            to: self.current_index,
        });
    }

    /// Jumps to `target` if it is reachable, validating every step in between when moving forward.
    pub fn go_to(&mut self, target: usize) -> JumpOutcome {
        let verdicts = match self.plan_jump(target) {
            JumpPlan::Rejected | JumpPlan::Direct => Vec::new(),
            JumpPlan::Validate(chain) => {
                let mut verdicts = Vec::with_capacity(chain.len());
                for index in chain {
                    let verdict = self.validate_step(index);
                    let failed = verdict.is_some();
                    verdicts.push((index, verdict));
                    if failed {
                        break;
                    }
                }
                verdicts
            }
        };
        self.apply_jump(target, verdicts)
    }

    /// Restores the seed record and the initial position, clearing every error and unlock.
    pub fn reset(&mut self) {
        self.record = self.seed.clone();
        self.current_index = 0;
        self.visited = BTreeSet::from([0]);
        self.errors.clear();
        debug!("navigator reset");
        self.events.emit(NavigatorEvent::Reset);
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> &StepDefinition<R> {
        &self.steps[self.current_index]
    }

    pub fn steps(&self) -> &[StepDefinition<R>] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, step_id: &str) -> Option<&str> {
        self.errors.get(step_id).map(String::as_str)
    }

    pub fn current_error(&self) -> Option<&str> {
        self.error_for(self.current_step().id())
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.steps.len()
    }

    /// The only not-yet-visited step `go_to` accepts: `min(visited) + 1`.
    pub fn frontier_index(&self) -> Option<usize> {
        let lowest = self.visited.first().copied().unwrap_or(0);
        Some(lowest + 1).filter(|&index| index < self.steps.len())
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        index < self.steps.len() && (self.visited.contains(&index) || self.frontier_index() == Some(index))
    }

    /// Sidebar status of the step at `index`.
    pub fn status_of(&self, index: usize) -> StepStatus {
        if index == self.current_index {
            StepStatus::Active
        } else if index < self.current_index && self.visited.contains(&index) {
            StepStatus::Completed
        } else if self.is_reachable(index) {
            StepStatus::Available
        } else {
            StepStatus::Locked
        }
    }

    pub(crate) fn validate_step(&self, index: usize) -> Option<String> {
        self.steps[index].check(&self.record)
    }

    pub(crate) fn plan_jump(&self, target: usize) -> JumpPlan {
        if !self.is_reachable(target) {
            JumpPlan::Rejected
        } else if target <= self.current_index {
            JumpPlan::Direct
        } else {
            JumpPlan::Validate((self.current_index..target).collect())
        }
    }

    /// Commits an advance given the current step's verdict.
    pub(crate) fn apply_advance(&mut self, verdict: Option<String>) -> AdvanceOutcome {
        let index = self.current_index;
        if let Some(message) = verdict {
            self.record_failure(index, message.clone());
            return AdvanceOutcome::ValidationFailed(message);
        }
        self.clear_error(index);

        if self.is_last() {
            debug!(index, "final step passed validation");
            self.events.emit(NavigatorEvent::Completed { index });
            return AdvanceOutcome::Completed;
        }

        let next = index + 1;
        self.visited.insert(next);
        self.current_index = next;
        debug!(from = index, to = next, "advanced");
        self.events.emit(NavigatorEvent::Advanced { from: index, to: next });
        AdvanceOutcome::Advanced
    }

    /// Commits a jump given verdicts for the validated prefix of the chain.
    ///
    /// Verdicts are applied in order; the first failure aborts the jump.
    pub(crate) fn apply_jump(&mut self, target: usize, verdicts: Vec<(usize, Option<String>)>) -> JumpOutcome {
        if matches!(self.plan_jump(target), JumpPlan::Rejected) {
            warn!(target, current = self.current_index, "rejected jump to unreachable step");
            self.events.emit(NavigatorEvent::Rejected { target });
            return JumpOutcome::Rejected;
        }

        for (index, verdict) in verdicts {
            match verdict {
                Some(message) => {
                    self.record_failure(index, message.clone());
                    return JumpOutcome::ValidationFailed(message);
                }
                None => self.clear_error(index),
            }
        }

        let from = self.current_index;
        self.visited.insert(target);
        self.current_index = target;
        debug!(from, to = target, "jumped");
        self.events.emit(NavigatorEvent::Jumped { from, to: target });
        JumpOutcome::Jumped
    }

    fn record_failure(&mut self, index: usize, message: String) {
        let step_id = self.steps[index].id().to_string();
        debug!(index, step = %step_id, %message, "validation failed");
        self.errors.insert(step_id.clone(), message.clone());
        self.events.emit(NavigatorEvent::ValidationFailed { index, step_id, message });
    }

    fn clear_error(&mut self, index: usize) {
        self.errors.shift_remove(self.steps[index].id());
    }
}

impl<R: AggregateRecord + fmt::Debug> fmt::Debug for StepNavigator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepNavigator")
            .field("steps", &self.steps)
            .field("current_index", &self.current_index)
            .field("visited", &self.visited)
            .field("errors", &self.errors)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

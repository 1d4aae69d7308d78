//! Async wrapper around a navigator with single-flight transitions.
//!
//! A [`WizardSession`] adds suspending validators (for example a remote
//! uniqueness check) on top of the synchronous ones carried by each step.
//! Only one transition runs at a time: a second `advance`, `retreat`, `go_to`
//! or `reset` issued while one is pending fails fast with
//! [`SessionError::TransitionInFlight`]. Every verdict is computed before the
//! navigator is touched, so dropping a pending transition future discards its
//! result and leaves the state exactly as it was.
//! [`WizardSession::advance_and_finish`] extends the transition over the
//! completion hand-off and the reset that follows it.

use std::{collections::BTreeSet, sync::Arc};

use indexmap::IndexMap;
use stepwise_types::{AdvanceOutcome, AggregateRecord, JumpOutcome, NavigatorEvent};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc::UnboundedReceiver};
use tracing::{debug, warn};

use crate::{
    navigator::{JumpPlan, StepNavigator},
    step::{AsyncStepValidator, panic_message},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("another navigation is still in progress")]
    TransitionInFlight,
    #[error("no step with id '{0}'")]
    UnknownStep(String),
}

/// Point-in-time copy of the navigator state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot<R> {
    pub current_index: usize,
    pub visited: BTreeSet<usize>,
    pub errors: IndexMap<String, String>,
    pub record: R,
}

pub struct WizardSession<R: AggregateRecord> {
    navigator: Arc<Mutex<StepNavigator<R>>>,
    transition: Arc<Mutex<()>>,
    step_ids: Arc<Vec<String>>,
    async_validators: IndexMap<String, Arc<dyn AsyncStepValidator<R>>>,
}

impl<R: AggregateRecord> Clone for WizardSession<R> {
    fn clone(&self) -> Self {
        Self {
            navigator: Arc::clone(&self.navigator),
            transition: Arc::clone(&self.transition),
            step_ids: Arc::clone(&self.step_ids),
            async_validators: self.async_validators.clone(),
        }
    }
}

impl<R: AggregateRecord> WizardSession<R> {
    pub fn new(navigator: StepNavigator<R>) -> Self {
        let step_ids = navigator.steps().iter().map(|step| step.id().to_string()).collect();
        Self {
            navigator: Arc::new(Mutex::new(navigator)),
            transition: Arc::new(Mutex::new(())),
            step_ids: Arc::new(step_ids),
            async_validators: IndexMap::new(),
        }
    }

    /// Registers a suspending validator run after `step_id`'s own validator passes.
    pub fn with_async_validator(
        mut self,
        step_id: impl Into<String>,
        validator: impl AsyncStepValidator<R> + 'static,
    ) -> Result<Self, SessionError> {
        let step_id = step_id.into();
        if !self.step_ids.contains(&step_id) {
            return Err(SessionError::UnknownStep(step_id));
        }
        self.async_validators.insert(step_id, Arc::new(validator));
        Ok(self)
    }

    /// True while a transition is pending.
    pub fn is_busy(&self) -> bool {
        self.transition.try_lock().is_err()
    }

    pub async fn update_record(&self, patch: impl Into<R::Patch>) {
        self.navigator.lock().await.update_record(patch);
    }

    pub async fn advance(&self) -> Result<AdvanceOutcome, SessionError> {
        let _gate = self.begin_transition()?;
        let mut navigator = self.navigator.lock().await;
        let index = navigator.current_index();
        let verdict = self.verdict_for(&navigator, index).await;
        Ok(navigator.apply_advance(verdict))
    }

    /// Advances and, when the final step passes, hands a copy of the record to
    /// `finish` and resets, all inside one transition.
    ///
    /// The navigator stays locked until `finish` resolves, so edits and other
    /// transitions cannot land between completion and reset. If `finish`
    /// fails, the session stays on the last step.
    pub async fn advance_and_finish<E, F, Fut>(&self, finish: F) -> Result<AdvanceOutcome, E>
    where
        E: From<SessionError>,
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let _gate = self.begin_transition()?;
        let mut navigator = self.navigator.lock().await;
        let index = navigator.current_index();
        let verdict = self.verdict_for(&navigator, index).await;
        let outcome = navigator.apply_advance(verdict);
        if outcome == AdvanceOutcome::Completed {
            finish(navigator.record().clone()).await?;
            navigator.reset();
        }
        Ok(outcome)
    }

    pub async fn retreat(&self) -> Result<(), SessionError> {
        let _gate = self.begin_transition()?;
        self.navigator.lock().await.retreat();
        Ok(())
    }

    pub async fn go_to(&self, target: usize) -> Result<JumpOutcome, SessionError> {
        let _gate = self.begin_transition()?;
        let mut navigator = self.navigator.lock().await;
        let mut verdicts = Vec::new();
        if let JumpPlan::Validate(chain) = navigator.plan_jump(target) {
            for index in chain {
                let verdict = self.verdict_for(&navigator, index).await;
                let failed = verdict.is_some();
                verdicts.push((index, verdict));
                if failed {
                    break;
                }
            }
        }
        Ok(navigator.apply_jump(target, verdicts))
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        let _gate = self.begin_transition()?;
        self.navigator.lock().await.reset();
        Ok(())
    }

    pub async fn subscribe(&self) -> UnboundedReceiver<NavigatorEvent> {
        self.navigator.lock().await.subscribe()
    }

    pub async fn record(&self) -> R {
        self.navigator.lock().await.record().clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot<R> {
        let navigator = self.navigator.lock().await;
        SessionSnapshot {
            current_index: navigator.current_index(),
            visited: navigator.visited().clone(),
            errors: navigator.errors().clone(),
            record: navigator.record().clone(),
        }
    }

    /// Runs `read` against the navigator while holding its lock.
    pub async fn read<T>(&self, read: impl FnOnce(&StepNavigator<R>) -> T) -> T {
        read(&*self.navigator.lock().await)
    }

    fn begin_transition(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, SessionError> {
        self.transition.try_lock().map_err(|_| {
            debug!("transition rejected while another is pending");
            SessionError::TransitionInFlight
        })
    }

    /// Synchronous validator first, then the async one if registered.
    async fn verdict_for(&self, navigator: &StepNavigator<R>, index: usize) -> Option<String> {
        if let Some(message) = navigator.validate_step(index) {
            return Some(message);
        }
        let step_id = navigator.steps()[index].id();
        let validator = Arc::clone(self.async_validators.get(step_id)?);
        let record = navigator.record().clone();

        // Spawned so a panicking check surfaces as a JoinError instead of unwinding through the caller.
        let handle = tokio::spawn(async move { validator.validate(&record).await });
        match handle.await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(error)) => {
                warn!(step = %step_id, error = %error, "async validator returned an error");
                Some(error.to_string())
            }
            Err(join_error) if join_error.is_panic() => {
                let message = panic_message(join_error.into_panic().as_ref());
                warn!(step = %step_id, %message, "async validator panicked");
                Some(message)
            }
            Err(join_error) => {
                warn!(step = %step_id, error = %join_error, "async validator was cancelled");
                Some(join_error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::step::StepDefinition;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use indexmap::indexmap;
    use serde_json::json;
    use stepwise_types::JsonRecord;
    use tokio::sync::Notify;

    const TAKEN_EMAIL: &str = "taken@example.com";

    struct UniqueEmail;

    #[async_trait]
    impl AsyncStepValidator<JsonRecord> for UniqueEmail {
        async fn validate(&self, record: &JsonRecord) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok((record.get_str("email") == Some(TAKEN_EMAIL)).then(|| "Email is already registered".to_string()))
        }
    }

    /// Signals when it starts, then waits for permission to finish.
    struct Gated {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AsyncStepValidator<JsonRecord> for Gated {
        async fn validate(&self, _record: &JsonRecord) -> Result<Option<String>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(None)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl AsyncStepValidator<JsonRecord> for Unreachable {
        async fn validate(&self, _record: &JsonRecord) -> Result<Option<String>> {
            Err(anyhow!("directory service unreachable"))
        }
    }

    fn email_required(record: &JsonRecord) -> Option<String> {
        match record.get_str("email") {
            Some(email) if email.contains('@') => None,
            _ => Some("Email is required".to_string()),
        }
    }

    fn session() -> WizardSession<JsonRecord> {
        let steps = vec![
            StepDefinition::new("account", "Account").validator(email_required),
            StepDefinition::new("profile", "Profile"),
            StepDefinition::new("confirm", "Confirm"),
        ];
        WizardSession::new(StepNavigator::new(steps, JsonRecord::new()).expect("valid steps"))
    }

    async fn set_email(session: &WizardSession<JsonRecord>, email: &str) {
        session.update_record(indexmap! { "email".to_string() => json!(email) }).await;
    }

    #[test]
    fn unknown_step_ids_are_refused() {
        let result = session().with_async_validator("billing", UniqueEmail);
        assert!(matches!(result, Err(SessionError::UnknownStep(id)) if id == "billing"));
    }

    #[tokio::test]
    async fn async_validator_runs_after_sync_validator_passes() {
        let session = session().with_async_validator("account", UniqueEmail).expect("known step");

        assert_eq!(session.advance().await.expect("no overlap"), AdvanceOutcome::ValidationFailed("Email is required".into()));

        set_email(&session, TAKEN_EMAIL).await;
        assert_eq!(
            session.advance().await.expect("no overlap"),
            AdvanceOutcome::ValidationFailed("Email is already registered".into())
        );
        assert_eq!(
            session.read(|nav| nav.error_for("account").map(str::to_string)).await,
            Some("Email is already registered".to_string())
        );

        set_email(&session, "ada@example.com").await;
        assert_eq!(session.advance().await.expect("no overlap"), AdvanceOutcome::Advanced);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.current_index, 1);
        assert!(snapshot.errors.is_empty());
    }

    #[tokio::test]
    async fn async_validator_errors_become_failures() {
        let session = session().with_async_validator("account", Unreachable).expect("known step");
        set_email(&session, "ada@example.com").await;

        assert_eq!(
            session.advance().await.expect("no overlap"),
            AdvanceOutcome::ValidationFailed("directory service unreachable".into())
        );
        assert_eq!(session.snapshot().await.current_index, 0);
    }

    #[tokio::test]
    async fn forward_jump_runs_async_checks_along_the_chain() {
        let session = session().with_async_validator("account", UniqueEmail).expect("known step");
        set_email(&session, TAKEN_EMAIL).await;

        assert_eq!(
            session.go_to(1).await.expect("no overlap"),
            JumpOutcome::ValidationFailed("Email is already registered".into())
        );
        assert_eq!(session.go_to(2).await.expect("no overlap"), JumpOutcome::Rejected);

        set_email(&session, "ada@example.com").await;
        assert_eq!(session.go_to(1).await.expect("no overlap"), JumpOutcome::Jumped);
        assert_eq!(session.snapshot().await.visited, BTreeSet::from([0, 1]));
    }

    #[tokio::test]
    async fn second_transition_is_rejected_while_one_is_pending() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = session()
            .with_async_validator(
                "account",
                Gated {
                    entered: Arc::clone(&entered),
                    release: Arc::clone(&release),
                },
            )
            .expect("known step");
        set_email(&session, "ada@example.com").await;

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.advance().await }
        });
        entered.notified().await;

        assert!(session.is_busy());
        assert_eq!(session.advance().await, Err(SessionError::TransitionInFlight));
        assert_eq!(session.go_to(0).await, Err(SessionError::TransitionInFlight));
        assert_eq!(session.retreat().await, Err(SessionError::TransitionInFlight));

        release.notify_one();
        assert_eq!(pending.await.expect("task joins"), Ok(AdvanceOutcome::Advanced));
        assert!(!session.is_busy());
        assert_eq!(session.snapshot().await.current_index, 1);
    }

    #[tokio::test]
    async fn dropping_a_pending_transition_leaves_state_untouched() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = session()
            .with_async_validator(
                "account",
                Gated {
                    entered: Arc::clone(&entered),
                    release: Arc::clone(&release),
                },
            )
            .expect("known step");
        set_email(&session, "ada@example.com").await;
        let before = session.snapshot().await;

        tokio::select! {
            _ = session.advance() => panic!("advance should still be waiting on its check"),
            _ = entered.notified() => {}
        }

        assert!(!session.is_busy());
        assert_eq!(session.snapshot().await, before);
        release.notify_one();
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let first = session();
        let second = session();
        set_email(&first, "ada@example.com").await;
        first.advance().await.expect("no overlap");

        assert_eq!(first.snapshot().await.current_index, 1);
        assert_eq!(second.snapshot().await.current_index, 0);
        assert!(second.record().await.is_empty());
    }
}

//! Host shell: sidebar, progress and completion around a session.
//!
//! The shell owns no presentation of its own. It turns navigator state into a
//! [`ShellView`] that any front end can render, and it owns the completion
//! hand-off: once the final step passes, the record goes to the configured
//! [`CompletionHandler`] and the session starts over.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use stepwise_types::{AdvanceOutcome, AggregateRecord, JumpOutcome, StepStatus};
use thiserror::Error;
use tracing::info;

use crate::{navigator::StepNavigator, session::{SessionError, WizardSession}};

/// Receives the finished record when the last step passes validation.
#[async_trait]
pub trait CompletionHandler<R>: Send + Sync {
    async fn complete(&self, record: &R) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Completion(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: StepStatus,
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// 1-based position of the current step.
    pub position: usize,
    pub total: usize,
    pub percent: f64,
}

impl Progress {
    pub fn label(&self) -> String {
        format!("Step {} of {}", self.position, self.total)
    }
}

/// Everything a front end needs to draw one frame of the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellView {
    pub title: String,
    pub description: Option<String>,
    pub sidebar: Vec<SidebarEntry>,
    pub progress: Progress,
    pub current_step_id: String,
    pub current_title: String,
    pub error: Option<String>,
    pub back_enabled: bool,
    pub is_last: bool,
}

impl ShellView {
    /// Label for the forward button.
    pub fn next_label(&self) -> &'static str {
        if self.is_last { "Submit" } else { "Next" }
    }

    fn from_navigator<R: AggregateRecord>(title: &str, description: Option<&str>, navigator: &StepNavigator<R>) -> Self {
        let sidebar = navigator
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let status = navigator.status_of(index);
                SidebarEntry {
                    index,
                    id: step.id().to_string(),
                    title: step.title().to_string(),
                    description: step.description_text().map(str::to_string),
                    status,
                    clickable: status.is_clickable(),
                }
            })
            .collect();
        let total = navigator.step_count();
        let position = navigator.current_index() + 1;
        let step = navigator.current_step();

        Self {
            title: title.to_string(),
            description: description.map(str::to_string),
            sidebar,
            progress: Progress {
                position,
                total,
                percent: position as f64 / total as f64 * 100.0,
            },
            current_step_id: step.id().to_string(),
            current_title: step.title().to_string(),
            error: navigator.current_error().map(str::to_string),
            back_enabled: !navigator.is_first(),
            is_last: navigator.is_last(),
        }
    }
}

pub struct WizardShell<R: AggregateRecord> {
    title: String,
    description: Option<String>,
    session: WizardSession<R>,
    completion: Arc<dyn CompletionHandler<R>>,
}

impl<R: AggregateRecord> WizardShell<R> {
    pub fn new(title: impl Into<String>, session: WizardSession<R>, completion: Arc<dyn CompletionHandler<R>>) -> Self {
        Self {
            title: title.into(),
            description: None,
            session,
            completion,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn session(&self) -> &WizardSession<R> {
        &self.session
    }

    pub async fn view(&self) -> ShellView {
        let title = self.title.as_str();
        let description = self.description.as_deref();
        self.session
            .read(|navigator| ShellView::from_navigator(title, description, navigator))
            .await
    }

    pub async fn update(&self, patch: impl Into<R::Patch>) {
        self.session.update_record(patch).await;
    }

    /// Advances; on completion hands the record to the handler and starts over.
    ///
    /// The hand-off counts as part of the transition: a second `next` issued
    /// while the handler is pending fails with
    /// [`SessionError::TransitionInFlight`]. If the handler fails the session is
    /// left on the last step so the user can retry.
    pub async fn next(&self) -> Result<AdvanceOutcome, ShellError> {
        let completion = Arc::clone(&self.completion);
        let outcome = self
            .session
            .advance_and_finish(|record| async move { completion.complete(&record).await.map_err(ShellError::from) })
            .await?;
        if outcome == AdvanceOutcome::Completed {
            info!(title = %self.title, "wizard completed and reset");
        }
        Ok(outcome)
    }

    pub async fn back(&self) -> Result<(), ShellError> {
        Ok(self.session.retreat().await?)
    }

    /// Sidebar click. Locked entries come back as [`JumpOutcome::Rejected`].
    pub async fn select(&self, index: usize) -> Result<JumpOutcome, ShellError> {
        Ok(self.session.go_to(index).await?)
    }
}

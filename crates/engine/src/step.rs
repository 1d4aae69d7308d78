//! Step definitions and the validator contracts they carry.
//!
//! A step is an id, some display metadata, and at most one synchronous
//! validator. Validators are pure functions of the whole record; they return
//! `None` when the record is acceptable and a human-readable message when it
//! is not. Presentation is left to the host, which keys its own widgets by
//! [`StepDefinition::id`].

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Synchronous validator run by the navigator before leaving a step.
pub trait StepValidator<R>: Send + Sync {
    fn validate(&self, record: &R) -> Result<Option<String>>;
}

impl<R, F> StepValidator<R> for F
where
    F: Fn(&R) -> Option<String> + Send + Sync,
{
    fn validate(&self, record: &R) -> Result<Option<String>> {
        Ok(self(record))
    }
}

/// Adapter for validators that can fail for reasons unrelated to the record.
///
/// An `Err` is reported as a validation failure carrying the error text.
pub struct Fallible<F>(pub F);

impl<R, F> StepValidator<R> for Fallible<F>
where
    F: Fn(&R) -> Result<Option<String>> + Send + Sync,
{
    fn validate(&self, record: &R) -> Result<Option<String>> {
        (self.0)(record)
    }
}

/// Validator that has to suspend, for example a remote uniqueness lookup.
///
/// Registered on a [`WizardSession`](crate::WizardSession) and run after the
/// step's synchronous validator passes.
#[async_trait]
pub trait AsyncStepValidator<R>: Send + Sync {
    async fn validate(&self, record: &R) -> Result<Option<String>>;
}

/// One ordered unit of a wizard.
pub struct StepDefinition<R> {
    id: String,
    title: String,
    description: Option<String>,
    validator: Option<Arc<dyn StepValidator<R>>>,
}

impl<R: 'static> StepDefinition<R> {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            validator: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a pure `(record) -> Option<message>` validator.
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&R) -> Option<String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Attaches a validator whose own failures count as validation failures.
    pub fn fallible_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&R) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(Fallible(validator)));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Runs the validator against `record`.
    ///
    /// Steps without a validator always pass. A validator that returns an
    /// error or panics is treated as a failure carrying the fault's message.
    pub fn check(&self, record: &R) -> Option<String> {
        let validator = self.validator.as_ref()?;
        match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(record))) {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(error)) => {
                warn!(step = %self.id, error = %error, "validator returned an error");
                Some(error.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(step = %self.id, %message, "validator panicked");
                Some(message)
            }
        }
    }
}

impl<R> Clone for StepDefinition<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<R> fmt::Debug for StepDefinition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Extracts the text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "validator failed unexpectedly".to_string()
    }
}

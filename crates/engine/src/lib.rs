//! # Stepwise Engine
//!
//! The engine drives guided, multi-step data collection: an ordered list of
//! steps, one aggregate record that every step reads from and writes to, and
//! a navigator that decides which steps the user may visit.
//!
//! ## Key Features
//!
//! - **Validation gating**: a step's validator must pass before the user moves past it
//! - **Monotonic unlock**: once a step is reached it stays reachable for the session
//! - **Shallow merge**: field edits replace whole top-level groups of the record
//! - **Single-flight async sessions**: suspending validators without interleaved transitions
//!
//! ## Usage
//!
//! ```rust
//! use indexmap::indexmap;
//! use serde_json::json;
//! use stepwise_engine::{StepDefinition, StepNavigator};
//! use stepwise_types::{AdvanceOutcome, JsonRecord};
//!
//! let steps = vec![
//!     StepDefinition::new("name", "Name").validator(|record: &JsonRecord| {
//!         record.get_str("name").is_none().then(|| "Name is required".to_string())
//!     }),
//!     StepDefinition::new("done", "Done"),
//! ];
//! let mut navigator = StepNavigator::new(steps, JsonRecord::new())?;
//!
//! assert!(navigator.advance().is_validation_failure());
//! navigator.update_record(indexmap! { "name".to_string() => json!("Ada") });
//! assert_eq!(navigator.advance(), AdvanceOutcome::Advanced);
//! assert_eq!(navigator.advance(), AdvanceOutcome::Completed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`step`**: step definitions and validator contracts
//! - **`navigator`**: the synchronous state machine
//! - **`session`**: async wrapper with single-flight transitions
//! - **`shell`**: sidebar/progress view model and completion hand-off
//! - **`forms`**: step sequences for the bundled resume and registration forms

pub mod events;
pub mod forms;
pub mod navigator;
pub mod session;
pub mod shell;
pub mod step;

pub use events::EventHub;
pub use forms::{registration_steps, resume_steps};
pub use navigator::{NavigatorError, StepNavigator};
pub use session::{SessionError, SessionSnapshot, WizardSession};
pub use shell::{CompletionHandler, Progress, ShellError, ShellView, SidebarEntry, WizardShell};
pub use step::{AsyncStepValidator, Fallible, StepDefinition, StepValidator};

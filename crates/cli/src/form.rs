//! What the terminal host needs to know about a form.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use stepwise_engine::StepDefinition;
use stepwise_types::AggregateRecord;
use stepwise_util::FieldProducer;

pub type PatchOf<R> = <R as AggregateRecord>::Patch;

type ApplyFn<R> = Box<dyn Fn(&R, &str) -> Result<PatchOf<R>, String> + Send + Sync>;

/// A form the CLI can drive: its steps, seed, field prompts and patch parsing.
pub trait FormDefinition: Send + Sync + 'static {
    type Record: AggregateRecord + Serialize + PartialEq + fmt::Debug;

    /// Short name used in output file names.
    fn name(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn steps(&self) -> Vec<StepDefinition<Self::Record>>;

    fn seed(&self) -> Self::Record;

    /// Turns a `{key: value}` document (seed file or script `update`) into a patch.
    fn patch_from_value(&self, value: Value) -> Result<PatchOf<Self::Record>>;

    /// Field prompts for the step with `step_id`, reading current values from `record`.
    fn prompts(&self, step_id: &str, record: &Self::Record) -> Vec<Prompt<Self::Record>>;

    /// Appends a blank item to `list` on this step, if the step has such a list.
    fn add_entry(&self, _step_id: &str, _list: ListTarget, _record: &Self::Record) -> Option<PatchOf<Self::Record>> {
        None
    }

    /// Removes item `index` from `list` on this step, if the step has such a list.
    fn remove_entry(
        &self,
        _step_id: &str,
        _list: ListTarget,
        _record: &Self::Record,
        _index: usize,
    ) -> Option<PatchOf<Self::Record>> {
        None
    }
}

/// Which list an add or remove command edits. Indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    /// The step's own entries (education, experiences, skills).
    Entries,
    /// Description points of one entry.
    Points(usize),
    /// Additional experiences kept apart from the main list.
    Other,
}

/// One field of a step: label, current display value and how raw input becomes a patch.
pub struct Prompt<R: AggregateRecord> {
    pub label: String,
    pub current: String,
    pub required: bool,
    /// Shown instead of the current value while the field is blank.
    pub hint: Option<String>,
    apply: ApplyFn<R>,
}

impl<R: AggregateRecord> Prompt<R> {
    /// Binds a field producer to the part of the record it edits.
    ///
    /// `build` receives the record as it is when the answer arrives and the
    /// produced value (`None` when the field was cleared).
    pub fn from_field<P, B>(field: P, current: Option<&P::Value>, build: B) -> Self
    where
        P: FieldProducer + Send + Sync + 'static,
        B: Fn(&R, Option<P::Value>) -> PatchOf<R> + Send + Sync + 'static,
    {
        let label = field.label().to_string();
        let current = current.map(|value| field.display(value)).unwrap_or_default();
        let required = field.is_required();
        let hint = field.hint();
        Self {
            label,
            current,
            required,
            hint,
            apply: Box::new(move |record, raw| {
                let value = field.produce(raw)?;
                Ok(build(record, value))
            }),
        }
    }

    pub fn apply(&self, record: &R, raw: &str) -> Result<PatchOf<R>, String> {
        (self.apply)(record, raw)
    }
}

impl<R: AggregateRecord> fmt::Debug for Prompt<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("label", &self.label)
            .field("current", &self.current)
            .field("required", &self.required)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

/// Current text value, or `None` when blank, for seeding a prompt.
pub fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

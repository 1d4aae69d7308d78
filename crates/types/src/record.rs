//! Aggregate record model shared by the navigator and every form instance.
//!
//! A record is the single source of truth for a wizard session. It is only
//! ever mutated through [`AggregateRecord::merge`], which performs a shallow
//! top-level overwrite: every key named by the patch is replaced wholesale and
//! every other key is left untouched. Nested structures are never deep-merged.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Contract implemented by every record type a navigator can own.
pub trait AggregateRecord: Clone + Send + Sync + 'static {
    /// Partial update consumed by a single merge.
    type Patch: Send;

    /// Applies `patch`, replacing exactly the top-level keys it names.
    fn merge(&mut self, patch: Self::Patch);

    /// Returns the top-level keys a patch would replace, in patch order.
    fn patch_keys(patch: &Self::Patch) -> Vec<String>;
}

/// Partial update for a [`JsonRecord`], keyed by top-level field group.
pub type JsonPatch = IndexMap<String, JsonValue>;

/// Open, insertion-ordered record for dynamically shaped forms.
///
/// Keys keep the position of their first insertion so a presentation layer
/// can render groups in the order they were introduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRecord(IndexMap<String, JsonValue>);

impl JsonRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object. Non-object values yield `None`.
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) => Some(Self(map.into_iter().collect())),
            JsonValue::Null => Some(Self::default()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Returns the string stored at `key`, ignoring non-string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Converts the record into a JSON object value.
    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.0.iter().map(|(key, value)| (key.clone(), value.clone())).collect())
    }
}

impl FromIterator<(String, JsonValue)> for JsonRecord {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl AggregateRecord for JsonRecord {
    type Patch = JsonPatch;

    fn merge(&mut self, patch: Self::Patch) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }

    fn patch_keys(patch: &Self::Patch) -> Vec<String> {
        patch.keys().cloned().collect()
    }
}

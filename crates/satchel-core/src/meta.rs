//! Dot-path metadata accumulation.
//!
//! Application code can attach extra metadata to whatever response it ends up
//! returning. [`MetaAccumulator`] stores those entries as a nested map keyed by
//! dot-separated paths, and [`Annotations`] bundles them with the message and
//! error-code overrides for a single in-flight request.

use crate::envelope::Message;
use serde_json::{Map, Value};

/// Nested map built from dot-separated paths.
///
/// Setting a path creates intermediate maps as needed and never removes keys
/// that are not on the path.
///
/// # Example
///
/// ```
/// use satchel_core::meta::MetaAccumulator;
/// use serde_json::json;
///
/// let mut meta = MetaAccumulator::new();
/// meta.set("a.b.c", 1);
/// meta.set("a.b.d", 2);
///
/// assert_eq!(json!(meta.merge()), json!({ "a": { "b": { "c": 1, "d": 2 } } }));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaAccumulator {
    entries: Map<String, Value>,
}

impl MetaAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `value` at the dot-separated `path`.
    ///
    /// Empty segments are skipped, so `"a..b"` addresses the same place as
    /// `"a.b"`. A path with no segments at all is ignored. An intermediate
    /// segment that currently holds a non-map value is replaced by a map.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            tracing::debug!(path, "ignoring empty meta path");
            return;
        };

        let mut cursor = &mut self.entries;
        for segment in parents {
            let slot = cursor
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            cursor = map;
        }
        cursor.insert((*leaf).to_string(), value.into());
    }

    /// Returns the value stored at `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns true if nothing has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of the accumulated tree.
    #[must_use]
    pub fn merge(&self) -> Map<String, Value> {
        self.entries.clone()
    }

    /// Consumes the accumulator, returning the accumulated tree.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }

    /// Deep-merges another accumulator into this one; `other` wins on leaves.
    pub fn absorb(&mut self, other: Self) {
        deep_merge(&mut self.entries, other.entries, &[]);
    }

    /// Deep-merges the accumulated tree into `target`.
    ///
    /// Top-level keys listed in `reserved` are left untouched in `target`.
    /// Nested maps merge recursively; any other value overwrites.
    pub fn merge_into(&self, target: &mut Map<String, Value>, reserved: &[&str]) {
        deep_merge(target, self.entries.clone(), reserved);
    }
}

fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>, reserved: &[&str]) {
    for (key, value) in source {
        if reserved.contains(&key.as_str()) {
            tracing::debug!(key = %key, "refusing to overwrite reserved meta key");
            continue;
        }
        let Value::Object(incoming) = value else {
            target.insert(key, value);
            continue;
        };
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            deep_merge(existing, incoming, &[]);
            continue;
        }
        target.insert(key, Value::Object(incoming));
    }
}

/// Out-of-band response metadata for one in-flight request.
///
/// Collects `with_meta` entries and the message/code overrides set through
/// `with_message` and `with_error`. A later override replaces an earlier one;
/// setting a new error code without a message drops any earlier message so
/// the phrase is recomputed from the new code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    meta: MetaAccumulator,
    code: Option<u16>,
    message: Option<Message>,
}

impl Annotations {
    /// Creates empty annotations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets extra metadata at a dot-separated path.
    pub fn with_meta(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        self.meta.set(path, value);
        self
    }

    /// Overrides `meta.message`.
    pub fn with_message(&mut self, message: impl Into<Message>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Flags an error with a custom message and code.
    pub fn with_error(&mut self, message: impl Into<Message>, code: u16) -> &mut Self {
        self.code = Some(code);
        self.message = Some(message.into());
        self
    }

    /// Flags an error code, letting the message fall back to the reason phrase.
    pub fn flag_error(&mut self, code: u16) -> &mut Self {
        self.code = Some(code);
        self.message = None;
        self
    }

    /// Returns the accumulated metadata.
    #[must_use]
    pub fn meta(&self) -> &MetaAccumulator {
        &self.meta
    }

    /// Returns the overriding code, if an error was flagged.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// Returns the overriding message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Returns true if nothing was annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.code.is_none() && self.message.is_none()
    }

    /// Folds later annotations into these ones.
    ///
    /// Metadata deep-merges; a code in `later` replaces ours together with its
    /// message, and a message alone replaces ours.
    pub fn absorb(&mut self, later: Self) {
        self.meta.absorb(later.meta);
        if let Some(code) = later.code {
            self.code = Some(code);
            self.message = later.message;
        } else if later.message.is_some() {
            self.message = later.message;
        }
    }
}

//! Recursive key mutation.
//!
//! A [`KeyMutator`] walks a JSON tree and renames every object key through a
//! pluggable [`KeyRename`] function. The same mutator type serves both the
//! inbound (request) and outbound (response) directions; each direction is
//! configured with its own instance.
//!
//! # Example
//!
//! ```
//! use satchel_core::mutate::{KeyCase, KeyMutator};
//! use serde_json::json;
//!
//! let mutator = KeyMutator::with_case(KeyCase::Camel);
//! let value = mutator.mutate(json!({ "first_name": "Ada", "tags": [{ "tag_id": 1 }] }));
//!
//! assert_eq!(value, json!({ "firstName": "Ada", "tags": [{ "tagId": 1 }] }));
//! ```

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A per-key rename function.
///
/// Implemented for any `Fn(&str) -> String + Send + Sync`, so closures can be
/// used directly.
pub trait KeyRename: Send + Sync {
    /// Returns the new name for `key`.
    fn rename(&self, key: &str) -> String;
}

impl<F> KeyRename for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn rename(&self, key: &str) -> String {
        self(key)
    }
}

/// Rename function that leaves keys untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl KeyRename for Identity {
    fn rename(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Built-in case conventions for object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// `firstName`
    Camel,
    /// `first_name`
    Snake,
    /// `FirstName`
    Pascal,
    /// `first-name`
    Kebab,
    /// `FIRST_NAME`
    ScreamingSnake,
}

impl KeyCase {
    const fn as_case(self) -> Case {
        match self {
            Self::Camel => Case::Camel,
            Self::Snake => Case::Snake,
            Self::Pascal => Case::Pascal,
            Self::Kebab => Case::Kebab,
            Self::ScreamingSnake => Case::ScreamingSnake,
        }
    }

    /// Parses a case name as used in configuration and environment variables.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "camel" | "camel_case" => Some(Self::Camel),
            "snake" | "snake_case" => Some(Self::Snake),
            "pascal" | "pascal_case" => Some(Self::Pascal),
            "kebab" | "kebab_case" => Some(Self::Kebab),
            "screaming_snake" | "screaming_snake_case" => Some(Self::ScreamingSnake),
            _ => None,
        }
    }
}

impl KeyRename for KeyCase {
    fn rename(&self, key: &str) -> String {
        key.to_case(self.as_case())
    }
}

/// Stateless recursive key renamer.
///
/// Cloning is cheap; the rename function is shared behind an [`Arc`].
#[derive(Clone)]
pub struct KeyMutator {
    rename: Arc<dyn KeyRename>,
    identity: bool,
}

impl KeyMutator {
    /// Creates a mutator that leaves every key untouched.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rename: Arc::new(Identity),
            identity: true,
        }
    }

    /// Creates a mutator from an arbitrary rename function.
    pub fn new<R: KeyRename + 'static>(rename: R) -> Self {
        Self {
            rename: Arc::new(rename),
            identity: false,
        }
    }

    /// Creates a mutator applying one of the built-in case conventions.
    #[must_use]
    pub fn with_case(case: KeyCase) -> Self {
        Self::new(case)
    }

    /// Creates a mutator for an optional case convention.
    ///
    /// `None` yields the identity mutator.
    #[must_use]
    pub fn from_case(case: Option<KeyCase>) -> Self {
        case.map_or_else(Self::identity, Self::with_case)
    }

    /// Returns true if this mutator never changes a key.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Renames a single key.
    #[must_use]
    pub fn rename_key(&self, key: &str) -> String {
        self.rename.rename(key)
    }

    /// Renames every object key in `value`, recursively.
    ///
    /// Arrays keep their order and length; scalars are returned unchanged.
    /// When two keys of one object rename to the same string, the later entry
    /// wins.
    #[must_use]
    pub fn mutate(&self, value: Value) -> Value {
        if self.identity {
            return value;
        }
        self.walk(value)
    }

    /// Renames every key of a map, recursively.
    #[must_use]
    pub fn mutate_map(&self, map: Map<String, Value>) -> Map<String, Value> {
        if self.identity {
            return map;
        }
        map.into_iter()
            .map(|(key, value)| (self.rename.rename(&key), self.walk(value)))
            .collect()
    }

    fn walk(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.mutate_map(map)),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.walk(v)).collect()),
            scalar => scalar,
        }
    }
}

impl Default for KeyMutator {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for KeyMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMutator")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

//! Copy-producing container operations.
//!
//! Every operation here produces a *new* container from an existing one
//! and carries the source's resolved capability flag onto the result, so
//! that an opted-in container stays opted-in through filtering, merging
//! and transformation. The key-format preference is not carried; derived
//! containers fall back to the configured default. In-place mutation
//! (`insert`, `remove`, `clear`) is not a derivation and never touches
//! capability state.

use crate::key::MapKey;
use crate::map::SmartMap;
use serde_json::Value;

impl SmartMap {
    /// Copy without `null`-valued entries.
    pub fn compact(&self) -> SmartMap {
        self.derived(
            self.iter()
                .filter(|(_, value)| !value.is_null())
                .map(clone_entry),
        )
    }

    /// Copy with keys and values swapped. A string value keeps its text
    /// as the new key name; any other value uses its compact JSON
    /// rendering. Old keys become string values, so the round trip is
    /// lossy on the key encoding. Later entries win on collisions.
    pub fn invert(&self) -> SmartMap {
        self.derived(self.iter().map(|(key, value)| {
            let inverted = match value.as_str() {
                Some(text) => MapKey::str(text),
                None => MapKey::str(value.to_string()),
            };
            (inverted, Value::String(key.name().to_string()))
        }))
    }

    /// Union of both containers; `other` wins on conflicting keys.
    pub fn merge(&self, other: &SmartMap) -> SmartMap {
        self.derived(self.iter().chain(other.iter()).map(clone_entry))
    }

    /// Copy without the entries matching `predicate`.
    pub fn reject<F>(&self, mut predicate: F) -> SmartMap
    where
        F: FnMut(&MapKey, &Value) -> bool,
    {
        self.derived(
            self.iter()
                .filter(|(key, value)| !predicate(key, value))
                .map(clone_entry),
        )
    }

    /// Copy keeping only the entries matching `predicate`.
    pub fn select<F>(&self, mut predicate: F) -> SmartMap
    where
        F: FnMut(&MapKey, &Value) -> bool,
    {
        self.derived(
            self.iter()
                .filter(|(key, value)| predicate(key, value))
                .map(clone_entry),
        )
    }

    /// Copy keeping only the given keys (exact, encoding included).
    /// Missing keys are skipped.
    pub fn slice(&self, keys: &[MapKey]) -> SmartMap {
        self.derived(keys.iter().filter_map(|key| {
            self.get_key(key).map(|value| (key.clone(), value.clone()))
        }))
    }

    /// Fresh container with the same entries.
    pub fn to_map(&self) -> SmartMap {
        self.derived(self.iter().map(clone_entry))
    }

    /// Copy with every key rewritten. Later entries win when `transform`
    /// maps two keys to the same result.
    pub fn transform_keys<F>(&self, mut transform: F) -> SmartMap
    where
        F: FnMut(&MapKey) -> MapKey,
    {
        self.derived(
            self.iter()
                .map(|(key, value)| (transform(key), value.clone())),
        )
    }

    /// Copy with every value rewritten.
    pub fn transform_values<F>(&self, mut transform: F) -> SmartMap
    where
        F: FnMut(&Value) -> Value,
    {
        self.derived(
            self.iter()
                .map(|(key, value)| (key.clone(), transform(value))),
        )
    }
}

fn clone_entry((key, value): (&MapKey, &Value)) -> (MapKey, Value) {
    (key.clone(), value.clone())
}

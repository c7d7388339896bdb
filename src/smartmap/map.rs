//! The container type and its attribute-style accessor surface.
//!
//! [`SmartMap`] wraps an ordinary ordered map of [`MapKey`] to
//! [`serde_json::Value`] and carries two pieces of per-instance capability
//! state: a tri-state "smart" flag and a tri-state key-format preference.
//! Either, when unset, resolves through the process-wide configuration —
//! and the resolution is remembered on the instance, so a later change to
//! the global default does not retroactively change a container that has
//! already been observed.
//!
//! Attribute-style access (`get`/`get_from`/`set`) is honored only when
//! the capability has been installed ([`crate::config::install`]) and the
//! container's resolved flag is true. Everything else on the map behaves
//! exactly like the underlying storage.

use crate::config;
use crate::error::{Result, SmartMapError};
use crate::key::{KeyFormat, MapKey};
use serde_json::Value;
use std::cell::Cell;
use std::collections::btree_map;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct SmartMap {
    entries: BTreeMap<MapKey, Value>,
    smart: Cell<Option<bool>>,
    format: Cell<Option<KeyFormat>>,
    frozen: bool,
}

impl SmartMap {
    pub fn new() -> Self {
        Self::default()
    }

    // --- capability state ---

    /// Resolved capability flag.
    ///
    /// Unset flags resolve through `smart_by_default` in the live
    /// configuration and the result is remembered on this instance.
    /// Frozen containers recompute on every read instead of persisting,
    /// so the read always succeeds.
    pub fn is_smart(&self) -> bool {
        match self.smart.get() {
            Some(flag) => flag,
            None => {
                let resolved = config::snapshot().smart_by_default;
                if !self.frozen {
                    self.smart.set(Some(resolved));
                }
                resolved
            }
        }
    }

    pub fn set_smart(&self, smart: bool) -> Result<()> {
        self.check_mutable()?;
        self.smart.set(Some(smart));
        Ok(())
    }

    /// Fluent opt-in: `let map = SmartMap::new().into_smart()?;`
    pub fn into_smart(self) -> Result<Self> {
        self.set_smart(true)?;
        Ok(self)
    }

    /// Resolved key-format preference, defaulting through the live
    /// configuration with the same remember-on-first-read behavior as
    /// [`SmartMap::is_smart`].
    pub fn key_format(&self) -> KeyFormat {
        match self.format.get() {
            Some(format) => format,
            None => {
                let resolved = config::snapshot().default_format();
                if !self.frozen {
                    self.format.set(Some(resolved));
                }
                resolved
            }
        }
    }

    pub fn set_key_format(&self, format: KeyFormat) -> Result<()> {
        self.check_mutable()?;
        self.format.set(Some(format));
        Ok(())
    }

    // --- freezing ---

    /// Make the container immutable. Capability state and entries can
    /// still be read; any mutation fails with
    /// [`SmartMapError::ImmutableTarget`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn check_mutable(&self) -> Result<()> {
        if self.frozen {
            Err(SmartMapError::ImmutableTarget)
        } else {
            Ok(())
        }
    }

    // --- attribute-style access ---

    fn dispatch_open(&self) -> bool {
        config::installed() && self.is_smart()
    }

    /// Whether attribute-style access would be honored. Mirrors the same
    /// gate as `get`/`set`: the capability must be installed and the
    /// resolved flag true.
    pub fn responds_to(&self, _name: &str) -> bool {
        self.dispatch_open()
    }

    /// Read the field `name` under the container's resolved key format.
    ///
    /// A missing key is not an error: it reads as `Ok(None)`. The access
    /// itself fails with [`SmartMapError::NoSuchMember`] when the
    /// container does not honor attribute-style access.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        self.get_from(name, self.key_format())
    }

    /// Read the field `name` under an explicit retrieval format,
    /// overriding the container's preference. `Any` tries the `Sym`
    /// encoding first and falls back to `Str`.
    pub fn get_from(&self, name: &str, from: KeyFormat) -> Result<Option<&Value>> {
        if !self.dispatch_open() {
            return Err(SmartMapError::NoSuchMember(name.to_string()));
        }

        Ok(match from {
            KeyFormat::Any => self
                .entries
                .get(&MapKey::sym(name))
                .or_else(|| self.entries.get(&MapKey::str(name))),
            format => self.entries.get(&MapKey::for_format(name, format)),
        })
    }

    /// Write the field `name` under the container's resolved key format
    /// (`Any` stores as `Sym`). Overwrites the entry under that exact
    /// encoding only; an entry under the other encoding is left alone.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if !self.dispatch_open() {
            return Err(SmartMapError::NoSuchMember(name.to_string()));
        }
        self.check_mutable()?;

        let key = MapKey::for_format(name, self.key_format());
        self.entries.insert(key, value.into());
        Ok(())
    }

    // --- underlying storage ---

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MapKey, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, MapKey, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, MapKey, Value> {
        self.entries.values()
    }

    /// Lookup by exact key, encoding included.
    pub fn get_key(&self, key: &MapKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert under an exact key. In-place mutation; capability state is
    /// untouched.
    pub fn insert(&mut self, key: MapKey, value: impl Into<Value>) -> Result<Option<Value>> {
        self.check_mutable()?;
        Ok(self.entries.insert(key, value.into()))
    }

    pub fn remove(&mut self, key: &MapKey) -> Result<Option<Value>> {
        self.check_mutable()?;
        Ok(self.entries.remove(key))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.check_mutable()?;
        self.entries.clear();
        Ok(())
    }

    /// New container holding `entries`, carrying the source's resolved
    /// capability flag. The key-format preference is not carried; derived
    /// containers fall back to the configured default.
    pub(crate) fn derived<I>(&self, entries: I) -> SmartMap
    where
        I: IntoIterator<Item = (MapKey, Value)>,
    {
        SmartMap {
            entries: entries.into_iter().collect(),
            smart: Cell::new(Some(self.is_smart())),
            format: Cell::new(None),
            frozen: false,
        }
    }
}

/// Cloning yields a mutable copy, frozen or not.
impl Clone for SmartMap {
    fn clone(&self) -> Self {
        SmartMap {
            entries: self.entries.clone(),
            smart: self.smart.clone(),
            format: self.format.clone(),
            frozen: false,
        }
    }
}

/// Equality looks at entries only; capability state and frozenness never
/// affect comparison.
impl PartialEq for SmartMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SmartMap {}

impl FromIterator<(MapKey, Value)> for SmartMap {
    fn from_iter<I: IntoIterator<Item = (MapKey, Value)>>(iter: I) -> Self {
        SmartMap {
            entries: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// A parsed JSON object becomes a container with string-encoded keys.
impl From<serde_json::Map<String, Value>> for SmartMap {
    fn from(object: serde_json::Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(name, value)| (MapKey::str(name), value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a SmartMap {
    type Item = (&'a MapKey, &'a Value);
    type IntoIter = btree_map::Iter<'a, MapKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn smart(format: KeyFormat) -> SmartMap {
        config::install();
        let map = SmartMap::new();
        map.set_smart(true).unwrap();
        map.set_key_format(format).unwrap();
        map
    }

    #[test]
    fn missing_field_reads_as_absent() {
        let map = smart(KeyFormat::Sym);
        assert_eq!(map.get("foo").unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut map = smart(KeyFormat::Sym);
        map.set("foo", "bar").unwrap();
        assert_eq!(map.get("foo").unwrap(), Some(&json!("bar")));

        map.set("foo", "baz").unwrap();
        assert_eq!(map.get("foo").unwrap(), Some(&json!("baz")));
    }

    #[test]
    fn str_format_stores_string_keys_only() {
        let mut map = smart(KeyFormat::Str);
        map.set("foo", "bar").unwrap();

        assert_eq!(map.get_key(&MapKey::str("foo")), Some(&json!("bar")));
        assert_eq!(map.get_key(&MapKey::sym("foo")), None);
        assert_eq!(map.get_from("foo", KeyFormat::Sym).unwrap(), None);
    }

    #[test]
    fn sym_format_stores_symbol_keys_only() {
        let mut map = smart(KeyFormat::Sym);
        map.set("foo", "bar").unwrap();

        assert_eq!(map.get_key(&MapKey::sym("foo")), Some(&json!("bar")));
        assert_eq!(map.get_key(&MapKey::str("foo")), None);
        assert_eq!(map.get_from("foo", KeyFormat::Str).unwrap(), None);
    }

    #[test]
    fn any_format_reads_both_and_prefers_sym() {
        let mut map = smart(KeyFormat::Any);
        map.insert(MapKey::sym("foo"), "from sym").unwrap();
        map.insert(MapKey::str("foo"), "from str").unwrap();
        map.insert(MapKey::str("only_str"), "present").unwrap();

        assert_eq!(map.get("foo").unwrap(), Some(&json!("from sym")));
        assert_eq!(map.get("only_str").unwrap(), Some(&json!("present")));
        assert_eq!(map.get("neither").unwrap(), None);
    }

    #[test]
    fn explicit_from_overrides_any_preference() {
        let mut map = smart(KeyFormat::Any);
        map.insert(MapKey::sym("foo"), "from sym").unwrap();
        map.insert(MapKey::str("foo"), "from str").unwrap();

        assert_eq!(
            map.get_from("foo", KeyFormat::Str).unwrap(),
            Some(&json!("from str"))
        );
        assert_eq!(
            map.get_from("foo", KeyFormat::Sym).unwrap(),
            Some(&json!("from sym"))
        );
    }

    #[test]
    fn any_format_stores_as_sym_without_touching_str() {
        let mut map = smart(KeyFormat::Any);
        map.insert(MapKey::str("foo"), "old str").unwrap();

        map.set("foo", "new").unwrap();
        assert_eq!(map.get_key(&MapKey::sym("foo")), Some(&json!("new")));
        assert_eq!(map.get_key(&MapKey::str("foo")), Some(&json!("old str")));
    }

    #[test]
    fn non_smart_container_rejects_attribute_access() {
        config::install();
        let mut map = SmartMap::new();
        map.set_smart(false).unwrap();

        assert!(matches!(
            map.get("foo"),
            Err(SmartMapError::NoSuchMember(name)) if name == "foo"
        ));
        assert!(matches!(
            map.set("foo", "bar"),
            Err(SmartMapError::NoSuchMember(_))
        ));
        assert!(!map.responds_to("foo"));
    }

    #[test]
    fn responds_to_mirrors_the_flag() {
        config::install();
        let map = SmartMap::new();

        map.set_smart(true).unwrap();
        assert!(map.responds_to("anything"));

        map.set_smart(false).unwrap();
        assert!(!map.responds_to("anything"));
    }

    #[test]
    fn flag_resolution_is_sticky_per_instance() {
        let _guard = crate::config::test_lock();

        config::configure(|config| config.smart_by_default = true);
        let map = SmartMap::new();
        assert!(map.is_smart());

        // Changing the default later does not reach an already-observed
        // container.
        config::configure(|config| config.smart_by_default = false);
        assert!(map.is_smart());

        // A container observed after the change resolves to the new
        // default.
        assert!(!SmartMap::new().is_smart());
    }

    #[test]
    fn frozen_container_reads_recompute_instead_of_persisting() {
        let _guard = crate::config::test_lock();

        let mut map = SmartMap::new();
        map.freeze();

        config::configure(|config| config.smart_by_default = true);
        assert!(map.is_smart());

        config::configure(|config| config.smart_by_default = false);
        assert!(!map.is_smart());
    }

    #[test]
    fn key_format_resolution_defaults_through_configuration() {
        let _guard = crate::config::test_lock();

        config::configure(|config| config.set_default_format(KeyFormat::Str));
        let map = SmartMap::new();
        assert_eq!(map.key_format(), KeyFormat::Str);

        config::configure(|config| config.set_default_format(KeyFormat::Any));
        assert_eq!(map.key_format(), KeyFormat::Str);
    }

    #[test]
    fn frozen_container_rejects_capability_writes_but_allows_reads() {
        let _guard = crate::config::test_lock();

        let mut map = SmartMap::new();
        map.insert(MapKey::sym("foo"), "bar").unwrap();
        map.freeze();

        assert!(matches!(
            map.set_smart(true),
            Err(SmartMapError::ImmutableTarget)
        ));
        assert!(matches!(
            map.set_key_format(KeyFormat::Str),
            Err(SmartMapError::ImmutableTarget)
        ));

        // Reads still succeed and yield the configured defaults.
        assert!(!map.is_smart());
        assert_eq!(map.key_format(), KeyFormat::Sym);
    }

    #[test]
    fn frozen_container_rejects_entry_mutation() {
        let mut map = SmartMap::new();
        map.set_smart(true).unwrap();
        map.insert(MapKey::sym("foo"), "bar").unwrap();
        map.freeze();

        assert!(matches!(
            map.insert(MapKey::sym("baz"), 1),
            Err(SmartMapError::ImmutableTarget)
        ));
        assert!(matches!(
            map.remove(&MapKey::sym("foo")),
            Err(SmartMapError::ImmutableTarget)
        ));
        assert!(matches!(map.clear(), Err(SmartMapError::ImmutableTarget)));

        config::install();
        assert!(matches!(
            map.set("foo", "baz"),
            Err(SmartMapError::ImmutableTarget)
        ));
        assert_eq!(map.get_key(&MapKey::sym("foo")), Some(&json!("bar")));
    }

    #[test]
    fn into_smart_is_fluent_and_respects_freezing() {
        let map = SmartMap::new().into_smart().unwrap();
        assert!(map.is_smart());

        let mut frozen = SmartMap::new();
        frozen.freeze();
        assert!(matches!(
            frozen.into_smart(),
            Err(SmartMapError::ImmutableTarget)
        ));
    }

    #[test]
    fn cloning_a_frozen_container_yields_a_mutable_copy() {
        let mut map = SmartMap::new();
        map.insert(MapKey::sym("foo"), "bar").unwrap();
        map.freeze();

        let mut copy = map.clone();
        assert!(!copy.is_frozen());
        copy.insert(MapKey::sym("baz"), 1).unwrap();
        assert_eq!(copy.len(), 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn equality_ignores_capability_state() {
        let a: SmartMap = [(MapKey::sym("foo"), json!("bar"))].into_iter().collect();
        let b: SmartMap = [(MapKey::sym("foo"), json!("bar"))].into_iter().collect();

        a.set_smart(true).unwrap();
        b.set_smart(false).unwrap();
        a.set_key_format(KeyFormat::Str).unwrap();
        assert_eq!(a, b);

        let mut c = b.clone();
        c.freeze();
        assert_eq!(a, c);
    }

    #[test]
    fn in_place_mutation_leaves_the_flag_alone() {
        let mut map = smart(KeyFormat::Sym);
        map.insert(MapKey::sym("foo"), "bar").unwrap();
        map.insert(MapKey::sym("baz"), "bat").unwrap();
        map.remove(&MapKey::sym("foo")).unwrap();

        assert!(map.is_smart());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn from_json_object_uses_string_keys() {
        let object = match json!({"foo": "bar", "nested": {"baz": 1}}) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };

        let map = SmartMap::from(object);
        assert_eq!(map.get_key(&MapKey::str("foo")), Some(&json!("bar")));
        assert_eq!(
            map.get_key(&MapKey::str("nested")),
            Some(&json!({"baz": 1}))
        );
        assert_eq!(map.get_key(&MapKey::sym("foo")), None);
    }
}

//! Key encodings for field names.
//!
//! A conceptual field name ("foo") can live in a container under two
//! distinct key encodings: string-like ([`MapKey::Str`]) or symbol-like
//! ([`MapKey::Sym`]). [`KeyFormat`] names an encoding — or the `Any`
//! policy, which reads both encodings (preferring `Sym`) and writes `Sym`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Key encoding preference for attribute-style access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// String-like keys.
    Str,
    /// Symbol-like keys.
    #[default]
    Sym,
    /// Retrieval tries both encodings, preferring `Sym`; storage uses `Sym`.
    Any,
}

impl KeyFormat {
    /// Parse a format name, accepting the short and long spellings.
    /// Unrecognized names fall back to `Sym` rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "str" | "string" => KeyFormat::Str,
            "sym" | "symbol" => KeyFormat::Sym,
            "any" => KeyFormat::Any,
            _ => KeyFormat::Sym,
        }
    }

    /// The encoding used when writing under this format. `Any` is a
    /// retrieval policy, not an encoding, so it stores as `Sym`.
    pub fn storage(self) -> KeyFormat {
        match self {
            KeyFormat::Any => KeyFormat::Sym,
            other => other,
        }
    }
}

// Lenient by the same policy as `from_name`: unrecognized names and
// non-string values become `Sym` instead of failing deserialization.
impl<'de> Deserialize<'de> for KeyFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some(name) => KeyFormat::from_name(name),
            None => KeyFormat::Sym,
        })
    }
}

/// An actual map key: a field name tagged with its encoding.
///
/// `Str("foo")` and `Sym("foo")` are distinct keys and can coexist in the
/// same container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Str(String),
    Sym(String),
}

impl MapKey {
    pub fn str(name: impl Into<String>) -> Self {
        MapKey::Str(name.into())
    }

    pub fn sym(name: impl Into<String>) -> Self {
        MapKey::Sym(name.into())
    }

    /// Key for `name` under the storage encoding of `format`.
    pub fn for_format(name: impl Into<String>, format: KeyFormat) -> Self {
        match format.storage() {
            KeyFormat::Str => MapKey::Str(name.into()),
            _ => MapKey::Sym(name.into()),
        }
    }

    /// The field name, without its encoding.
    pub fn name(&self) -> &str {
        match self {
            MapKey::Str(name) | MapKey::Sym(name) => name,
        }
    }

    pub fn format(&self) -> KeyFormat {
        match self {
            MapKey::Str(_) => KeyFormat::Str,
            MapKey::Sym(_) => KeyFormat::Sym,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Str(name) => write!(f, "{}", name),
            MapKey::Sym(name) => write!(f, ":{}", name),
        }
    }
}
